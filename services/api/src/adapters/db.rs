//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `VocabularyStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use lingua_core::domain::{
    Category, CommitSelection, GraphRow, Language, ReviewRow, ReviewedWord, Sentence, User,
    UserCredentials, Word, WordContext, Wordbook,
};
use lingua_core::ports::{PortError, PortResult, VocabularyStore};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `VocabularyStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(
        e.as_database_error().map(|db| db.kind()),
        Some(sqlx::error::ErrorKind::UniqueViolation)
    )
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            email: Some(self.email),
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct CategoryRecord {
    id: i64,
    user_id: Uuid,
    name: String,
    language: String,
}
impl CategoryRecord {
    fn to_domain(self) -> PortResult<Category> {
        Ok(Category {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            language: parse_language(&self.language)?,
        })
    }
}

#[derive(FromRow)]
struct WordbookRecord {
    id: i64,
    user_id: Uuid,
    name: String,
    category_id: Option<i64>,
    language: String,
    input_type: String,
    created_at: DateTime<Utc>,
}
impl WordbookRecord {
    fn to_domain(self) -> PortResult<Wordbook> {
        Ok(Wordbook {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            category_id: self.category_id,
            language: parse_language(&self.language)?,
            input_type: self
                .input_type
                .parse()
                .map_err(|e: lingua_core::domain::UnknownVariant| {
                    PortError::Unexpected(e.to_string())
                })?,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct SentenceRecord {
    id: i64,
    user_id: Uuid,
    wordbook_id: i64,
    text: String,
    meaning: String,
    created_at: DateTime<Utc>,
    last_reviewed_at: DateTime<Utc>,
    review_count: i32,
    is_last_review_successful: bool,
}
impl SentenceRecord {
    fn to_domain(self) -> Sentence {
        Sentence {
            id: self.id,
            user_id: self.user_id,
            wordbook_id: self.wordbook_id,
            text: self.text,
            meaning: self.meaning,
            created_at: self.created_at,
            last_reviewed_at: self.last_reviewed_at,
            review_count: self.review_count,
            is_last_review_successful: self.is_last_review_successful,
        }
    }
}

#[derive(FromRow)]
struct WordRecord {
    id: i64,
    user_id: Uuid,
    text: String,
    others: Option<String>,
    created_at: DateTime<Utc>,
    last_reviewed_at: DateTime<Utc>,
    review_count: i32,
    is_last_review_successful: bool,
    success_count: i32,
}
impl WordRecord {
    fn to_domain(self) -> Word {
        Word {
            id: self.id,
            user_id: self.user_id,
            text: self.text,
            others: self.others,
            created_at: self.created_at,
            last_reviewed_at: self.last_reviewed_at,
            review_count: self.review_count,
            is_last_review_successful: self.is_last_review_successful,
            success_count: self.success_count,
        }
    }
}

#[derive(FromRow)]
struct ReviewRowRecord {
    sentence_word_id: i64,
    word_id: i64,
    word_text: String,
    word_others: Option<String>,
    meaning: String,
    pos: String,
    sentence_id: i64,
    sentence_text: String,
}
impl ReviewRowRecord {
    fn to_domain(self) -> ReviewRow {
        ReviewRow {
            sentence_word_id: self.sentence_word_id,
            word_id: self.word_id,
            word_text: self.word_text,
            word_others: self.word_others,
            meaning: self.meaning,
            pos: self.pos,
            sentence_id: self.sentence_id,
            sentence_text: self.sentence_text,
        }
    }
}

#[derive(FromRow)]
struct WordContextRecord {
    sentence_word_id: i64,
    word_id: i64,
    meaning: String,
    pos: String,
    memo: String,
    sentence_id: i64,
    sentence_text: String,
}
impl WordContextRecord {
    fn to_domain(self) -> WordContext {
        WordContext {
            sentence_word_id: self.sentence_word_id,
            word_id: self.word_id,
            meaning: self.meaning,
            pos: self.pos,
            memo: self.memo,
            sentence_id: self.sentence_id,
            sentence_text: self.sentence_text,
        }
    }
}

#[derive(FromRow)]
struct GraphRowRecord {
    sentence_word_id: i64,
    word_id: i64,
    word_text: String,
    word_meaning: String,
    sentence_id: i64,
    sentence_text: String,
    sentence_review_count: i32,
}
impl GraphRowRecord {
    fn to_domain(self) -> GraphRow {
        GraphRow {
            sentence_word_id: self.sentence_word_id,
            word_id: self.word_id,
            word_text: self.word_text,
            word_meaning: self.word_meaning,
            sentence_id: self.sentence_id,
            sentence_text: self.sentence_text,
            sentence_review_count: self.sentence_review_count,
        }
    }
}

fn parse_language(raw: &str) -> PortResult<Language> {
    raw.parse()
        .map_err(|e: lingua_core::domain::UnknownVariant| PortError::Unexpected(e.to_string()))
}

//=========================================================================================
// Commit Helpers
//=========================================================================================

/// Get-or-create a word by `(user, lowercase text)`. A concurrent insert that
/// wins the `(user_id, text)` unique constraint is absorbed by the trailing
/// lookup instead of failing the batch.
async fn upsert_word(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    text: &str,
    others: Option<&str>,
) -> PortResult<i64> {
    let others = others.filter(|o| !o.is_empty());

    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM words WHERE user_id = $1 AND text = $2")
            .bind(user_id)
            .bind(text)
            .fetch_optional(&mut **tx)
            .await
            .map_err(unexpected)?;
    if let Some(id) = existing {
        if let Some(others) = others {
            sqlx::query("UPDATE words SET others = $1 WHERE id = $2")
                .bind(others)
                .bind(id)
                .execute(&mut **tx)
                .await
                .map_err(unexpected)?;
        }
        return Ok(id);
    }

    let inserted: Option<i64> = sqlx::query_scalar(
        "INSERT INTO words (user_id, text, others) VALUES ($1, $2, $3) \
         ON CONFLICT (user_id, text) DO NOTHING RETURNING id",
    )
    .bind(user_id)
    .bind(text)
    .bind(others)
    .fetch_optional(&mut **tx)
    .await
    .map_err(unexpected)?;
    if let Some(id) = inserted {
        return Ok(id);
    }

    // Lost the race: the row exists now, so retry the lookup.
    let id: i64 = sqlx::query_scalar("SELECT id FROM words WHERE user_id = $1 AND text = $2")
        .bind(user_id)
        .bind(text)
        .fetch_one(&mut **tx)
        .await
        .map_err(unexpected)?;
    if let Some(others) = others {
        sqlx::query("UPDATE words SET others = $1 WHERE id = $2")
            .bind(others)
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(unexpected)?;
    }
    Ok(id)
}

/// Deletes every word of the user that no longer has any association.
async fn reap_orphan_words(pool: &PgPool, user_id: Uuid) -> PortResult<()> {
    sqlx::query(
        "DELETE FROM words w WHERE w.user_id = $1 \
         AND NOT EXISTS (SELECT 1 FROM sentence_words sw WHERE sw.word_id = w.id)",
    )
    .bind(user_id)
    .execute(pool)
    .await
    .map_err(unexpected)?;
    Ok(())
}

const REVIEWED_FILTER: &str = "($3::boolean IS NULL OR \
     (CASE WHEN $3 THEN w.review_count > 0 ELSE w.review_count = 0 END))";

//=========================================================================================
// `VocabularyStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl VocabularyStore for DbAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, email, hashed_password) VALUES ($1, $2, $3) \
             RETURNING user_id, email",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                PortError::Conflict(format!("An account for {email} already exists"))
            } else {
                unexpected(e)
            }
        })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("user {email}")),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let user_id: Option<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > now()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        user_id.ok_or(PortError::AuthenticationRequired)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn list_categories(
        &self,
        user_id: Uuid,
        language: Language,
    ) -> PortResult<Vec<Category>> {
        let records = sqlx::query_as::<_, CategoryRecord>(
            "SELECT id, user_id, name, language FROM categories \
             WHERE user_id = $1 AND language = $2 ORDER BY name",
        )
        .bind(user_id)
        .bind(language.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_category(&self, user_id: Uuid, category_id: i64) -> PortResult<Category> {
        let record = sqlx::query_as::<_, CategoryRecord>(
            "SELECT id, user_id, name, language FROM categories WHERE id = $1 AND user_id = $2",
        )
        .bind(category_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("category {category_id}")),
            _ => unexpected(e),
        })?;
        record.to_domain()
    }

    async fn commit_wordbook(
        &self,
        user_id: Uuid,
        selection: CommitSelection,
    ) -> PortResult<i64> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let category_id: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM categories WHERE user_id = $1 AND name = $2 AND language = $3",
        )
        .bind(user_id)
        .bind(&selection.category)
        .bind(selection.language.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(unexpected)?;
        let category_id: i64 = match category_id {
            Some(id) => id,
            None => sqlx::query_scalar(
                "INSERT INTO categories (user_id, name, language) VALUES ($1, $2, $3) RETURNING id",
            )
            .bind(user_id)
            .bind(&selection.category)
            .bind(selection.language.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(unexpected)?,
        };

        let wordbook_id: i64 = sqlx::query_scalar(
            "INSERT INTO wordbooks (user_id, name, category_id, language, input_type) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(user_id)
        .bind(&selection.name)
        .bind(category_id)
        .bind(selection.language.as_str())
        .bind(selection.input_type.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(unexpected)?;

        for sentence in &selection.sentences {
            let sentence_id: i64 = sqlx::query_scalar(
                "INSERT INTO sentences (user_id, wordbook_id, text, meaning) \
                 VALUES ($1, $2, $3, $4) RETURNING id",
            )
            .bind(user_id)
            .bind(wordbook_id)
            .bind(&sentence.text)
            .bind(&sentence.meaning)
            .fetch_one(&mut *tx)
            .await
            .map_err(unexpected)?;

            for word in &sentence.words {
                let normalized = word.text.to_lowercase();
                let word_id =
                    upsert_word(&mut tx, user_id, &normalized, word.others.as_deref()).await?;

                sqlx::query(
                    "INSERT INTO sentence_words (word_id, sentence_id, meaning, pos, memo) \
                     VALUES ($1, $2, $3, $4, $5)",
                )
                .bind(word_id)
                .bind(sentence_id)
                .bind(&word.meaning)
                .bind(&word.pos)
                .bind(&word.memo)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        PortError::Conflict(format!(
                            "word '{}' is already linked to this sentence",
                            word.text
                        ))
                    } else {
                        unexpected(e)
                    }
                })?;
            }
        }

        tx.commit().await.map_err(unexpected)?;
        Ok(wordbook_id)
    }

    async fn list_wordbooks(
        &self,
        user_id: Uuid,
        category_id: Option<i64>,
    ) -> PortResult<Vec<Wordbook>> {
        let records = sqlx::query_as::<_, WordbookRecord>(
            "SELECT id, user_id, name, category_id, language, input_type, created_at \
             FROM wordbooks WHERE user_id = $1 \
             AND ($2::bigint IS NULL OR category_id = $2) \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_wordbook(&self, user_id: Uuid, wordbook_id: i64) -> PortResult<Wordbook> {
        let record = sqlx::query_as::<_, WordbookRecord>(
            "SELECT id, user_id, name, category_id, language, input_type, created_at \
             FROM wordbooks WHERE id = $1 AND user_id = $2",
        )
        .bind(wordbook_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("wordbook {wordbook_id}")),
            _ => unexpected(e),
        })?;
        record.to_domain()
    }

    async fn update_wordbook(
        &self,
        user_id: Uuid,
        wordbook_id: i64,
        name: Option<String>,
        category_id: Option<i64>,
    ) -> PortResult<Wordbook> {
        if let Some(category_id) = category_id {
            // The new category must belong to the caller.
            self.get_category(user_id, category_id).await?;
        }
        let record = sqlx::query_as::<_, WordbookRecord>(
            "UPDATE wordbooks SET name = COALESCE($3, name), \
             category_id = COALESCE($4, category_id) \
             WHERE id = $1 AND user_id = $2 \
             RETURNING id, user_id, name, category_id, language, input_type, created_at",
        )
        .bind(wordbook_id)
        .bind(user_id)
        .bind(name)
        .bind(category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("wordbook {wordbook_id}")),
            _ => unexpected(e),
        })?;
        record.to_domain()
    }

    async fn delete_wordbook(&self, user_id: Uuid, wordbook_id: i64) -> PortResult<()> {
        let deleted = sqlx::query("DELETE FROM wordbooks WHERE id = $1 AND user_id = $2")
            .bind(wordbook_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if deleted.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("wordbook {wordbook_id}")));
        }
        reap_orphan_words(&self.pool, user_id).await
    }

    async fn wordbook_sentences(
        &self,
        user_id: Uuid,
        wordbook_id: i64,
    ) -> PortResult<Vec<Sentence>> {
        let records = sqlx::query_as::<_, SentenceRecord>(
            "SELECT id, user_id, wordbook_id, text, meaning, created_at, last_reviewed_at, \
             review_count, is_last_review_successful \
             FROM sentences WHERE wordbook_id = $1 AND user_id = $2 ORDER BY created_at, id",
        )
        .bind(wordbook_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn delete_sentence(&self, user_id: Uuid, sentence_id: i64) -> PortResult<()> {
        let deleted = sqlx::query("DELETE FROM sentences WHERE id = $1 AND user_id = $2")
            .bind(sentence_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if deleted.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("sentence {sentence_id}")));
        }
        reap_orphan_words(&self.pool, user_id).await
    }

    async fn get_word(&self, user_id: Uuid, word_id: i64) -> PortResult<Word> {
        let record = sqlx::query_as::<_, WordRecord>(
            "SELECT id, user_id, text, others, created_at, last_reviewed_at, review_count, \
             is_last_review_successful, success_count \
             FROM words WHERE id = $1 AND user_id = $2",
        )
        .bind(word_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("word {word_id}")),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn find_word_by_text(&self, user_id: Uuid, text: &str) -> PortResult<Option<Word>> {
        let record = sqlx::query_as::<_, WordRecord>(
            "SELECT id, user_id, text, others, created_at, last_reviewed_at, review_count, \
             is_last_review_successful, success_count \
             FROM words WHERE user_id = $1 AND text = $2",
        )
        .bind(user_id)
        .bind(text)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn delete_word(&self, user_id: Uuid, word_id: i64) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        let deleted = sqlx::query(
            "DELETE FROM sentence_words sw USING words w \
             WHERE sw.word_id = w.id AND w.id = $1 AND w.user_id = $2",
        )
        .bind(word_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;
        if deleted.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("word {word_id}")));
        }
        sqlx::query("DELETE FROM words WHERE id = $1 AND user_id = $2")
            .bind(word_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        tx.commit().await.map_err(unexpected)?;
        Ok(())
    }

    async fn word_contexts(&self, user_id: Uuid, word_id: i64) -> PortResult<Vec<WordContext>> {
        self.contexts_for_words(user_id, &[word_id]).await
    }

    async fn wordbook_review_rows(
        &self,
        user_id: Uuid,
        wordbook_id: i64,
        reviewed: Option<bool>,
    ) -> PortResult<Vec<ReviewRow>> {
        let sql = format!(
            "SELECT sw.id AS sentence_word_id, w.id AS word_id, w.text AS word_text, \
             w.others AS word_others, sw.meaning, sw.pos, \
             s.id AS sentence_id, s.text AS sentence_text \
             FROM sentence_words sw \
             JOIN sentences s ON s.id = sw.sentence_id \
             JOIN words w ON w.id = sw.word_id \
             WHERE w.user_id = $1 AND s.wordbook_id = $2 AND {REVIEWED_FILTER} \
             ORDER BY sw.id"
        );
        let records = sqlx::query_as::<_, ReviewRowRecord>(&sql)
            .bind(user_id)
            .bind(wordbook_id)
            .bind(reviewed)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn words_in_scope(
        &self,
        user_id: Uuid,
        category_id: Option<i64>,
        language: Option<Language>,
        reviewed: Option<bool>,
    ) -> PortResult<Vec<Word>> {
        let records = sqlx::query_as::<_, WordRecord>(
            "SELECT w.id, w.user_id, w.text, w.others, w.created_at, w.last_reviewed_at, \
             w.review_count, w.is_last_review_successful, w.success_count \
             FROM words w \
             WHERE w.user_id = $1 \
             AND ($2::bigint IS NULL OR EXISTS ( \
                 SELECT 1 FROM sentence_words sw \
                 JOIN sentences s ON s.id = sw.sentence_id \
                 JOIN wordbooks wb ON wb.id = s.wordbook_id \
                 WHERE sw.word_id = w.id AND wb.category_id = $2)) \
             AND ($4::text IS NULL OR EXISTS ( \
                 SELECT 1 FROM sentence_words sw \
                 JOIN sentences s ON s.id = sw.sentence_id \
                 JOIN wordbooks wb ON wb.id = s.wordbook_id \
                 WHERE sw.word_id = w.id AND wb.language = $4)) \
             AND ($3::boolean IS NULL OR \
                 (CASE WHEN $3 THEN w.review_count > 0 ELSE w.review_count = 0 END)) \
             ORDER BY w.id",
        )
        .bind(user_id)
        .bind(category_id)
        .bind(reviewed)
        .bind(language.map(|l| l.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn contexts_for_words(
        &self,
        user_id: Uuid,
        word_ids: &[i64],
    ) -> PortResult<Vec<WordContext>> {
        let records = sqlx::query_as::<_, WordContextRecord>(
            "SELECT sw.id AS sentence_word_id, sw.word_id, sw.meaning, sw.pos, sw.memo, \
             s.id AS sentence_id, s.text AS sentence_text \
             FROM sentence_words sw \
             JOIN sentences s ON s.id = sw.sentence_id \
             WHERE s.user_id = $1 AND sw.word_id = ANY($2) \
             ORDER BY sw.id",
        )
        .bind(user_id)
        .bind(word_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn record_word_review(
        &self,
        user_id: Uuid,
        wordbook_id: i64,
        sentence_word_id: i64,
        is_known: bool,
        reviewed_at: DateTime<Utc>,
    ) -> PortResult<ReviewedWord> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let word_id: Option<i64> = sqlx::query_scalar(
            "SELECT w.id FROM sentence_words sw \
             JOIN sentences s ON s.id = sw.sentence_id \
             JOIN words w ON w.id = sw.word_id \
             WHERE sw.id = $1 AND s.wordbook_id = $2 AND w.user_id = $3",
        )
        .bind(sentence_word_id)
        .bind(wordbook_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(unexpected)?;
        let Some(word_id) = word_id else {
            return Err(PortError::NotFound(format!(
                "sentence word {sentence_word_id}"
            )));
        };

        let (word_text, review_count): (String, i32) = sqlx::query_as(
            "UPDATE words SET review_count = review_count + 1, \
             is_last_review_successful = $2, last_reviewed_at = $3, \
             success_count = success_count + CASE WHEN $2 THEN 1 ELSE 0 END \
             WHERE id = $1 RETURNING text, review_count",
        )
        .bind(word_id)
        .bind(is_known)
        .bind(reviewed_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;
        Ok(ReviewedWord {
            sentence_word_id,
            word_text,
            review_count,
        })
    }

    async fn sentence_word_window(
        &self,
        user_id: Uuid,
        limit: Option<u32>,
        offset: u32,
    ) -> PortResult<Vec<GraphRow>> {
        let records = sqlx::query_as::<_, GraphRowRecord>(
            "SELECT sw.id AS sentence_word_id, w.id AS word_id, w.text AS word_text, \
             sw.meaning AS word_meaning, s.id AS sentence_id, s.text AS sentence_text, \
             s.review_count AS sentence_review_count \
             FROM sentence_words sw \
             JOIN words w ON w.id = sw.word_id \
             JOIN sentences s ON s.id = sw.sentence_id \
             WHERE w.user_id = $1 \
             ORDER BY sw.id \
             LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(limit.map(i64::from))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}
