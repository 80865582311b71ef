//! crates/lingua_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Category, CommitSelection, GraphRow, Language, ReviewRow, ReviewedWord, Sentence,
    SentenceAnalysis, User, UserCredentials, Word, WordContext, Wordbook,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network)
/// while keeping a stable kind for each failure class the API layer maps to a status code.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Authentication required")]
    AuthenticationRequired,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Storage conflict: {0}")]
    Conflict(String),
    #[error("Upstream service unavailable: {0}")]
    Unavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The relational store behind the vocabulary domain. Implementations must
/// provide unique constraints on `(user, word text)` and `(word, sentence)`,
/// cascade deletes from wordbook to sentence to association, and set-null
/// from category to wordbook.
#[async_trait]
pub trait VocabularyStore: Send + Sync {
    // --- Auth Methods ---
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Categories ---
    async fn list_categories(&self, user_id: Uuid, language: Language)
        -> PortResult<Vec<Category>>;

    async fn get_category(&self, user_id: Uuid, category_id: i64) -> PortResult<Category>;

    // --- Wordbooks ---
    /// Persists a whole analyzed selection (category get-or-create, wordbook,
    /// sentences, words, associations) atomically and returns the new
    /// wordbook id. A `(user, text)` unique-constraint race on word creation
    /// must be resolved by retrying the lookup, not by failing the batch.
    async fn commit_wordbook(&self, user_id: Uuid, selection: CommitSelection)
        -> PortResult<i64>;

    async fn list_wordbooks(
        &self,
        user_id: Uuid,
        category_id: Option<i64>,
    ) -> PortResult<Vec<Wordbook>>;

    async fn get_wordbook(&self, user_id: Uuid, wordbook_id: i64) -> PortResult<Wordbook>;

    async fn update_wordbook(
        &self,
        user_id: Uuid,
        wordbook_id: i64,
        name: Option<String>,
        category_id: Option<i64>,
    ) -> PortResult<Wordbook>;

    async fn delete_wordbook(&self, user_id: Uuid, wordbook_id: i64) -> PortResult<()>;

    async fn wordbook_sentences(
        &self,
        user_id: Uuid,
        wordbook_id: i64,
    ) -> PortResult<Vec<Sentence>>;

    // --- Sentences & Words ---
    async fn delete_sentence(&self, user_id: Uuid, sentence_id: i64) -> PortResult<()>;

    async fn get_word(&self, user_id: Uuid, word_id: i64) -> PortResult<Word>;

    async fn find_word_by_text(&self, user_id: Uuid, text: &str) -> PortResult<Option<Word>>;

    /// Deletes the word's associations and then the word itself. Fails with
    /// NotFound when the word has no associations left to delete.
    async fn delete_word(&self, user_id: Uuid, word_id: i64) -> PortResult<()>;

    async fn word_contexts(&self, user_id: Uuid, word_id: i64) -> PortResult<Vec<WordContext>>;

    // --- Review Queries ---
    /// Every SentenceWord row of the wordbook whose word belongs to the user,
    /// optionally filtered by the word's reviewed state.
    async fn wordbook_review_rows(
        &self,
        user_id: Uuid,
        wordbook_id: i64,
        reviewed: Option<bool>,
    ) -> PortResult<Vec<ReviewRow>>;

    /// Distinct words in a category/language scope, optionally filtered by
    /// reviewed state. `category_id = None` means every word the user owns.
    async fn words_in_scope(
        &self,
        user_id: Uuid,
        category_id: Option<i64>,
        language: Option<Language>,
        reviewed: Option<bool>,
    ) -> PortResult<Vec<Word>>;

    /// Every contextual occurrence for each of the given words, in one batch.
    async fn contexts_for_words(
        &self,
        user_id: Uuid,
        word_ids: &[i64],
    ) -> PortResult<Vec<WordContext>>;

    /// Applies one review result: resolves the SentenceWord by id scoped to
    /// the wordbook and the caller's words, then bumps the owning Word's
    /// global counters.
    async fn record_word_review(
        &self,
        user_id: Uuid,
        wordbook_id: i64,
        sentence_word_id: i64,
        is_known: bool,
        reviewed_at: DateTime<Utc>,
    ) -> PortResult<ReviewedWord>;

    // --- Graph Queries ---
    /// The user's SentenceWord associations ordered by association id
    /// ascending, sliced to `[offset, offset + limit)` (`limit = None`
    /// means unbounded).
    async fn sentence_word_window(
        &self,
        user_id: Uuid,
        limit: Option<u32>,
        offset: u32,
    ) -> PortResult<Vec<GraphRow>>;
}

/// The external text-analysis collaborator, consumed per sentence.
#[async_trait]
pub trait SentenceAnalysisService: Send + Sync {
    /// Analyzes one sentence in the given language. Implementations retry a
    /// bounded number of times internally and report `Unavailable` once
    /// retries are exhausted.
    async fn analyze_sentence(
        &self,
        sentence: &str,
        language: Language,
    ) -> PortResult<SentenceAnalysis>;
}
