//! crates/lingua_core/src/testsupport.rs
//!
//! An in-memory `VocabularyStore` used by the core tests. It mirrors the
//! relational contract the real store provides: unique `(user, text)` words,
//! unique `(word, sentence)` associations, cascade deletes, and orphan-word
//! reaping.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::{
    AuthSession, Category, CommitSelection, GraphRow, InputType, Language, ReviewRow,
    ReviewedWord, Sentence, SentenceWord, User, UserCredentials, Word, WordContext, Wordbook,
};
use crate::ports::{PortError, PortResult, VocabularyStore};

#[derive(Default, Clone)]
struct State {
    users: Vec<UserCredentials>,
    sessions: Vec<AuthSession>,
    categories: Vec<Category>,
    wordbooks: Vec<Wordbook>,
    sentences: Vec<Sentence>,
    words: Vec<Word>,
    associations: Vec<SentenceWord>,
    next_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn reap_orphan_words(&mut self) {
        let associations = &self.associations;
        self.words
            .retain(|word| associations.iter().any(|a| a.word_id == word.id));
    }
}

pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    pub fn seed_user(&self) -> Uuid {
        let user_id = Uuid::new_v4();
        let mut state = self.state.lock().unwrap();
        state.users.push(UserCredentials {
            user_id,
            email: format!("{user_id}@example.test"),
            hashed_password: "unused".to_string(),
        });
        user_id
    }

    pub fn seed_category(&self, user_id: Uuid, name: &str, language: Language) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.categories.push(Category {
            id,
            user_id,
            name: name.to_string(),
            language,
        });
        id
    }

    pub fn seed_wordbook(&self, user_id: Uuid, name: &str, language: Language) -> i64 {
        self.seed_wordbook_inner(user_id, name, language, None)
    }

    pub fn seed_wordbook_in_category(
        &self,
        user_id: Uuid,
        name: &str,
        language: Language,
        category_id: i64,
    ) -> i64 {
        self.seed_wordbook_inner(user_id, name, language, Some(category_id))
    }

    fn seed_wordbook_inner(
        &self,
        user_id: Uuid,
        name: &str,
        language: Language,
        category_id: Option<i64>,
    ) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.wordbooks.push(Wordbook {
            id,
            user_id,
            name: name.to_string(),
            category_id,
            language,
            input_type: InputType::Text,
            created_at: Utc::now(),
        });
        id
    }

    pub fn seed_sentence(
        &self,
        user_id: Uuid,
        wordbook_id: i64,
        text: &str,
        review_count: i32,
    ) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.sentences.push(Sentence {
            id,
            user_id,
            wordbook_id,
            text: text.to_string(),
            meaning: String::new(),
            created_at: Utc::now(),
            last_reviewed_at: Utc::now(),
            review_count,
            is_last_review_successful: false,
        });
        id
    }

    pub fn seed_word(&self, user_id: Uuid, text: &str, review_count: i32) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.words.push(Word {
            id,
            user_id,
            text: text.to_lowercase(),
            others: None,
            created_at: Utc::now(),
            last_reviewed_at: Utc::now(),
            review_count,
            is_last_review_successful: false,
            success_count: 0,
        });
        id
    }

    pub fn seed_association(&self, word_id: i64, sentence_id: i64, meaning: &str, pos: &str) -> i64 {
        {
            let state = self.state.lock().unwrap();
            assert!(
                !state
                    .associations
                    .iter()
                    .any(|a| a.word_id == word_id && a.sentence_id == sentence_id),
                "duplicate (word, sentence) pair"
            );
        }
        self.seed_association_unchecked(word_id, sentence_id, meaning, pos)
    }

    /// Inserts an association without the `(word, sentence)` uniqueness
    /// check, to model degenerate windows in graph tests.
    pub fn seed_association_unchecked(
        &self,
        word_id: i64,
        sentence_id: i64,
        meaning: &str,
        pos: &str,
    ) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.associations.push(SentenceWord {
            id,
            word_id,
            sentence_id,
            meaning: meaning.to_string(),
            pos: pos.to_string(),
            memo: String::new(),
        });
        id
    }

    pub fn word_snapshot(&self, word_id: i64) -> Word {
        self.state
            .lock()
            .unwrap()
            .words
            .iter()
            .find(|w| w.id == word_id)
            .expect("word exists")
            .clone()
    }

    pub fn word_by_text(&self, user_id: Uuid, text: &str) -> Option<Word> {
        self.state
            .lock()
            .unwrap()
            .words
            .iter()
            .find(|w| w.user_id == user_id && w.text == text)
            .cloned()
    }

    pub fn association_count(&self) -> usize {
        self.state.lock().unwrap().associations.len()
    }
}

fn reviewed_matches(review_count: i32, reviewed: Option<bool>) -> bool {
    match reviewed {
        Some(true) => review_count > 0,
        Some(false) => review_count == 0,
        None => true,
    }
}

#[async_trait]
impl VocabularyStore for MemoryStore {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let mut state = self.state.lock().unwrap();
        if state.users.iter().any(|u| u.email == email) {
            return Err(PortError::Conflict(format!("email {email} already taken")));
        }
        let user_id = Uuid::new_v4();
        state.users.push(UserCredentials {
            user_id,
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
        });
        Ok(User {
            user_id,
            email: Some(email.to_string()),
        })
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("user {email}")))
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.state.lock().unwrap().sessions.push(AuthSession {
            id: session_id.to_string(),
            user_id,
            expires_at,
        });
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let state = self.state.lock().unwrap();
        state
            .sessions
            .iter()
            .find(|s| s.id == session_id && s.expires_at > Utc::now())
            .map(|s| s.user_id)
            .ok_or(PortError::AuthenticationRequired)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.state
            .lock()
            .unwrap()
            .sessions
            .retain(|s| s.id != session_id);
        Ok(())
    }

    async fn list_categories(
        &self,
        user_id: Uuid,
        language: Language,
    ) -> PortResult<Vec<Category>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .categories
            .iter()
            .filter(|c| c.user_id == user_id && c.language == language)
            .cloned()
            .collect())
    }

    async fn get_category(&self, user_id: Uuid, category_id: i64) -> PortResult<Category> {
        self.state
            .lock()
            .unwrap()
            .categories
            .iter()
            .find(|c| c.id == category_id && c.user_id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("category {category_id}")))
    }

    async fn commit_wordbook(
        &self,
        user_id: Uuid,
        selection: CommitSelection,
    ) -> PortResult<i64> {
        let mut guard = self.state.lock().unwrap();
        // Work on a copy so a mid-batch failure leaves nothing behind, like
        // the transactional store.
        let mut state = guard.clone();
        let now = Utc::now();

        let category_id = state
            .categories
            .iter()
            .find(|c| {
                c.user_id == user_id
                    && c.name == selection.category
                    && c.language == selection.language
            })
            .map(|c| c.id);
        let category_id = match category_id {
            Some(id) => id,
            None => {
                let id = state.next_id();
                state.categories.push(Category {
                    id,
                    user_id,
                    name: selection.category.clone(),
                    language: selection.language,
                });
                id
            }
        };

        let wordbook_id = state.next_id();
        state.wordbooks.push(Wordbook {
            id: wordbook_id,
            user_id,
            name: selection.name.clone(),
            category_id: Some(category_id),
            language: selection.language,
            input_type: selection.input_type,
            created_at: now,
        });

        for sentence_selection in &selection.sentences {
            let sentence_id = state.next_id();
            state.sentences.push(Sentence {
                id: sentence_id,
                user_id,
                wordbook_id,
                text: sentence_selection.text.clone(),
                meaning: sentence_selection.meaning.clone(),
                created_at: now,
                last_reviewed_at: now,
                review_count: 0,
                is_last_review_successful: false,
            });

            for word_selection in &sentence_selection.words {
                let normalized = word_selection.text.to_lowercase();
                let existing = state
                    .words
                    .iter()
                    .position(|w| w.user_id == user_id && w.text == normalized);
                let word_id = match existing {
                    Some(slot) => {
                        if let Some(others) = &word_selection.others {
                            if !others.is_empty() {
                                state.words[slot].others = Some(others.clone());
                            }
                        }
                        state.words[slot].id
                    }
                    None => {
                        let id = state.next_id();
                        state.words.push(Word {
                            id,
                            user_id,
                            text: normalized,
                            others: word_selection.others.clone().filter(|o| !o.is_empty()),
                            created_at: now,
                            last_reviewed_at: now,
                            review_count: 0,
                            is_last_review_successful: false,
                            success_count: 0,
                        });
                        id
                    }
                };

                if state
                    .associations
                    .iter()
                    .any(|a| a.word_id == word_id && a.sentence_id == sentence_id)
                {
                    return Err(PortError::Conflict(format!(
                        "word '{}' already linked to this sentence",
                        word_selection.text
                    )));
                }
                let association_id = state.next_id();
                state.associations.push(SentenceWord {
                    id: association_id,
                    word_id,
                    sentence_id,
                    meaning: word_selection.meaning.clone(),
                    pos: word_selection.pos.clone(),
                    memo: word_selection.memo.clone(),
                });
            }
        }

        *guard = state;
        Ok(wordbook_id)
    }

    async fn list_wordbooks(
        &self,
        user_id: Uuid,
        category_id: Option<i64>,
    ) -> PortResult<Vec<Wordbook>> {
        let state = self.state.lock().unwrap();
        let mut wordbooks: Vec<Wordbook> = state
            .wordbooks
            .iter()
            .filter(|w| w.user_id == user_id)
            .filter(|w| category_id.is_none() || w.category_id == category_id)
            .cloned()
            .collect();
        wordbooks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(wordbooks)
    }

    async fn get_wordbook(&self, user_id: Uuid, wordbook_id: i64) -> PortResult<Wordbook> {
        self.state
            .lock()
            .unwrap()
            .wordbooks
            .iter()
            .find(|w| w.id == wordbook_id && w.user_id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("wordbook {wordbook_id}")))
    }

    async fn update_wordbook(
        &self,
        user_id: Uuid,
        wordbook_id: i64,
        name: Option<String>,
        category_id: Option<i64>,
    ) -> PortResult<Wordbook> {
        let mut state = self.state.lock().unwrap();
        if let Some(category_id) = category_id {
            if !state
                .categories
                .iter()
                .any(|c| c.id == category_id && c.user_id == user_id)
            {
                return Err(PortError::NotFound(format!("category {category_id}")));
            }
        }
        let wordbook = state
            .wordbooks
            .iter_mut()
            .find(|w| w.id == wordbook_id && w.user_id == user_id)
            .ok_or_else(|| PortError::NotFound(format!("wordbook {wordbook_id}")))?;
        if let Some(name) = name {
            wordbook.name = name;
        }
        if category_id.is_some() {
            wordbook.category_id = category_id;
        }
        Ok(wordbook.clone())
    }

    async fn delete_wordbook(&self, user_id: Uuid, wordbook_id: i64) -> PortResult<()> {
        let mut state = self.state.lock().unwrap();
        if !state
            .wordbooks
            .iter()
            .any(|w| w.id == wordbook_id && w.user_id == user_id)
        {
            return Err(PortError::NotFound(format!("wordbook {wordbook_id}")));
        }
        state.wordbooks.retain(|w| w.id != wordbook_id);
        let gone: Vec<i64> = state
            .sentences
            .iter()
            .filter(|s| s.wordbook_id == wordbook_id)
            .map(|s| s.id)
            .collect();
        state.sentences.retain(|s| s.wordbook_id != wordbook_id);
        state
            .associations
            .retain(|a| !gone.contains(&a.sentence_id));
        state.reap_orphan_words();
        Ok(())
    }

    async fn wordbook_sentences(
        &self,
        user_id: Uuid,
        wordbook_id: i64,
    ) -> PortResult<Vec<Sentence>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .sentences
            .iter()
            .filter(|s| s.wordbook_id == wordbook_id && s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_sentence(&self, user_id: Uuid, sentence_id: i64) -> PortResult<()> {
        let mut state = self.state.lock().unwrap();
        if !state
            .sentences
            .iter()
            .any(|s| s.id == sentence_id && s.user_id == user_id)
        {
            return Err(PortError::NotFound(format!("sentence {sentence_id}")));
        }
        state.sentences.retain(|s| s.id != sentence_id);
        state.associations.retain(|a| a.sentence_id != sentence_id);
        state.reap_orphan_words();
        Ok(())
    }

    async fn get_word(&self, user_id: Uuid, word_id: i64) -> PortResult<Word> {
        self.state
            .lock()
            .unwrap()
            .words
            .iter()
            .find(|w| w.id == word_id && w.user_id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("word {word_id}")))
    }

    async fn find_word_by_text(&self, user_id: Uuid, text: &str) -> PortResult<Option<Word>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .words
            .iter()
            .find(|w| w.user_id == user_id && w.text == text)
            .cloned())
    }

    async fn delete_word(&self, user_id: Uuid, word_id: i64) -> PortResult<()> {
        let mut state = self.state.lock().unwrap();
        let owned = state
            .words
            .iter()
            .any(|w| w.id == word_id && w.user_id == user_id);
        let had_associations = state.associations.iter().any(|a| a.word_id == word_id);
        if !owned || !had_associations {
            return Err(PortError::NotFound(format!("word {word_id}")));
        }
        state.associations.retain(|a| a.word_id != word_id);
        state.words.retain(|w| w.id != word_id);
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
        let state = self.state.lock().unwrap();
        let mut rows = Vec::new();
        for association in &state.associations {
            let Some(sentence) = state
                .sentences
                .iter()
                .find(|s| s.id == association.sentence_id && s.wordbook_id == wordbook_id)
            else {
                continue;
            };
            let Some(word) = state
                .words
                .iter()
                .find(|w| w.id == association.word_id && w.user_id == user_id)
            else {
                continue;
            };
            if !reviewed_matches(word.review_count, reviewed) {
                continue;
            }
            rows.push(ReviewRow {
                sentence_word_id: association.id,
                word_id: word.id,
                word_text: word.text.clone(),
                word_others: word.others.clone(),
                meaning: association.meaning.clone(),
                pos: association.pos.clone(),
                sentence_id: sentence.id,
                sentence_text: sentence.text.clone(),
            });
        }
        Ok(rows)
    }

    async fn words_in_scope(
        &self,
        user_id: Uuid,
        category_id: Option<i64>,
        language: Option<Language>,
        reviewed: Option<bool>,
    ) -> PortResult<Vec<Word>> {
        let state = self.state.lock().unwrap();
        let in_scope = |word: &Word| {
            if word.user_id != user_id || !reviewed_matches(word.review_count, reviewed) {
                return false;
            }
            let wordbook_of = |association: &SentenceWord| {
                state
                    .sentences
                    .iter()
                    .find(|s| s.id == association.sentence_id)
                    .and_then(|s| state.wordbooks.iter().find(|w| w.id == s.wordbook_id))
            };
            if let Some(category_id) = category_id {
                let linked = state.associations.iter().any(|a| {
                    a.word_id == word.id
                        && wordbook_of(a)
                            .map(|w| w.category_id == Some(category_id))
                            .unwrap_or(false)
                });
                if !linked {
                    return false;
                }
            }
            if let Some(language) = language {
                let linked = state.associations.iter().any(|a| {
                    a.word_id == word.id
                        && wordbook_of(a).map(|w| w.language == language).unwrap_or(false)
                });
                if !linked {
                    return false;
                }
            }
            true
        };
        Ok(state.words.iter().filter(|w| in_scope(w)).cloned().collect())
    }

    async fn contexts_for_words(
        &self,
        user_id: Uuid,
        word_ids: &[i64],
    ) -> PortResult<Vec<WordContext>> {
        let state = self.state.lock().unwrap();
        let mut contexts = Vec::new();
        for association in &state.associations {
            if !word_ids.contains(&association.word_id) {
                continue;
            }
            let Some(sentence) = state
                .sentences
                .iter()
                .find(|s| s.id == association.sentence_id && s.user_id == user_id)
            else {
                continue;
            };
            contexts.push(WordContext {
                sentence_word_id: association.id,
                word_id: association.word_id,
                meaning: association.meaning.clone(),
                pos: association.pos.clone(),
                memo: association.memo.clone(),
                sentence_id: sentence.id,
                sentence_text: sentence.text.clone(),
            });
        }
        Ok(contexts)
    }

    async fn record_word_review(
        &self,
        user_id: Uuid,
        wordbook_id: i64,
        sentence_word_id: i64,
        is_known: bool,
        reviewed_at: DateTime<Utc>,
    ) -> PortResult<ReviewedWord> {
        let mut state = self.state.lock().unwrap();
        let resolved = state
            .associations
            .iter()
            .find(|a| a.id == sentence_word_id)
            .and_then(|a| {
                let in_wordbook = state
                    .sentences
                    .iter()
                    .any(|s| s.id == a.sentence_id && s.wordbook_id == wordbook_id);
                if in_wordbook {
                    Some(a.word_id)
                } else {
                    None
                }
            });
        let Some(word_id) = resolved else {
            return Err(PortError::NotFound(format!(
                "sentence word {sentence_word_id}"
            )));
        };
        let word = state
            .words
            .iter_mut()
            .find(|w| w.id == word_id && w.user_id == user_id)
            .ok_or_else(|| PortError::NotFound(format!("sentence word {sentence_word_id}")))?;
        word.review_count += 1;
        word.is_last_review_successful = is_known;
        word.last_reviewed_at = reviewed_at;
        if is_known {
            word.success_count += 1;
        }
        Ok(ReviewedWord {
            sentence_word_id,
            word_text: word.text.clone(),
            review_count: word.review_count,
        })
    }

    async fn sentence_word_window(
        &self,
        user_id: Uuid,
        limit: Option<u32>,
        offset: u32,
    ) -> PortResult<Vec<GraphRow>> {
        let state = self.state.lock().unwrap();
        let mut associations: Vec<&SentenceWord> = state
            .associations
            .iter()
            .filter(|a| {
                state
                    .words
                    .iter()
                    .any(|w| w.id == a.word_id && w.user_id == user_id)
            })
            .collect();
        associations.sort_by_key(|a| a.id);

        let mut rows = Vec::new();
        for association in associations
            .into_iter()
            .skip(offset as usize)
            .take(limit.map(|l| l as usize).unwrap_or(usize::MAX))
        {
            let Some(word) = state.words.iter().find(|w| w.id == association.word_id) else {
                continue;
            };
            let Some(sentence) = state
                .sentences
                .iter()
                .find(|s| s.id == association.sentence_id)
            else {
                continue;
            };
            rows.push(GraphRow {
                sentence_word_id: association.id,
                word_id: word.id,
                word_text: word.text.clone(),
                word_meaning: association.meaning.clone(),
                sentence_id: sentence.id,
                sentence_text: sentence.text.clone(),
                sentence_review_count: sentence.review_count,
            });
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SentenceSelection, WordSelection};

    fn selection_with(words: Vec<(&str, Option<&str>)>) -> CommitSelection {
        CommitSelection {
            category: "default".to_string(),
            name: "batch".to_string(),
            language: Language::English,
            input_type: InputType::Text,
            sentences: words
                .into_iter()
                .enumerate()
                .map(|(i, (text, others))| SentenceSelection {
                    text: format!("sentence {i}"),
                    meaning: String::new(),
                    words: vec![WordSelection {
                        text: text.to_string(),
                        meaning: format!("meaning {i}"),
                        others: others.map(str::to_string),
                        pos: String::new(),
                        memo: String::new(),
                    }],
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn committing_the_same_word_twice_reuses_one_row() {
        let store = MemoryStore::new();
        let user = store.seed_user();

        store
            .commit_wordbook(user, selection_with(vec![("Apple", None), ("APPLE", None)]))
            .await
            .unwrap();

        let word = store.word_by_text(user, "apple").expect("word created");
        assert_eq!(word.others, None);
        assert_eq!(store.association_count(), 2);
        assert!(store.word_by_text(user, "Apple").is_none());
    }

    #[tokio::test]
    async fn others_updates_only_on_nonempty_values() {
        let store = MemoryStore::new();
        let user = store.seed_user();

        store
            .commit_wordbook(user, selection_with(vec![("ping", Some("píng"))]))
            .await
            .unwrap();
        store
            .commit_wordbook(user, selection_with(vec![("ping", Some(""))]))
            .await
            .unwrap();
        assert_eq!(
            store.word_by_text(user, "ping").unwrap().others.as_deref(),
            Some("píng")
        );

        store
            .commit_wordbook(user, selection_with(vec![("ping", Some("pīng"))]))
            .await
            .unwrap();
        assert_eq!(
            store.word_by_text(user, "ping").unwrap().others.as_deref(),
            Some("pīng")
        );
    }

    #[tokio::test]
    async fn deleting_the_last_context_reaps_the_word() {
        let store = MemoryStore::new();
        let user = store.seed_user();
        let wordbook = store.seed_wordbook(user, "wb", Language::English);
        let word = store.seed_word(user, "twice", 0);
        let s1 = store.seed_sentence(user, wordbook, "first", 0);
        let s2 = store.seed_sentence(user, wordbook, "second", 0);
        store.seed_association(word, s1, "", "");
        store.seed_association(word, s2, "", "");

        store.delete_sentence(user, s1).await.unwrap();
        assert!(store.word_by_text(user, "twice").is_some());

        store.delete_sentence(user, s2).await.unwrap();
        assert!(store.word_by_text(user, "twice").is_none());
    }

    #[tokio::test]
    async fn deleting_a_word_removes_its_associations() {
        let store = MemoryStore::new();
        let user = store.seed_user();
        let wordbook = store.seed_wordbook(user, "wb", Language::English);
        let word = store.seed_word(user, "gone", 0);
        let sentence = store.seed_sentence(user, wordbook, "soon gone", 0);
        store.seed_association(word, sentence, "", "");

        store.delete_word(user, word).await.unwrap();
        assert_eq!(store.association_count(), 0);
        assert!(store.word_by_text(user, "gone").is_none());

        let err = store.delete_word(user, word).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }
}
