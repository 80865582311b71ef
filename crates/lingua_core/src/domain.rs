//! crates/lingua_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The set of languages the analysis pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    English,
    Spanish,
    Chinese,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Spanish, Language::Chinese];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Spanish => "spanish",
            Language::Chinese => "chinese",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "english" => Ok(Language::English),
            "spanish" => Ok(Language::Spanish),
            "chinese" => Ok(Language::Chinese),
            other => Err(UnknownVariant {
                field: "language",
                value: other.to_string(),
            }),
        }
    }
}

/// The kind of source material a wordbook was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Image,
    Text,
    Youtube,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Image => "image",
            InputType::Text => "text",
            InputType::Youtube => "youtube",
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(InputType::Image),
            "text" => Ok(InputType::Text),
            "youtube" => Ok(InputType::Youtube),
            other => Err(UnknownVariant {
                field: "input_type",
                value: other.to_string(),
            }),
        }
    }
}

/// Error for parsing a closed-set string field.
#[derive(Debug, Clone, thiserror::Error)]
#[error("'{value}' is not a valid {field}")]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
}

// Represents a user - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub email: Option<String>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// A user-defined grouping of wordbooks, tagged with a language.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: i64,
    pub user_id: Uuid,
    pub name: String,
    pub language: Language,
}

/// A named, user-owned collection of sentences produced from one input batch.
#[derive(Debug, Clone)]
pub struct Wordbook {
    pub id: i64,
    pub user_id: Uuid,
    pub name: String,
    pub category_id: Option<i64>,
    pub language: Language,
    pub input_type: InputType,
    pub created_at: DateTime<Utc>,
}

/// One sentence inside a wordbook, with its own review counters.
#[derive(Debug, Clone)]
pub struct Sentence {
    pub id: i64,
    pub user_id: Uuid,
    pub wordbook_id: i64,
    pub text: String,
    pub meaning: String,
    pub created_at: DateTime<Utc>,
    pub last_reviewed_at: DateTime<Utc>,
    pub review_count: i32,
    pub is_last_review_successful: bool,
}

/// A deduplicated per-user vocabulary entry, keyed by lowercase text.
#[derive(Debug, Clone)]
pub struct Word {
    pub id: i64,
    pub user_id: Uuid,
    pub text: String,
    pub others: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_reviewed_at: DateTime<Utc>,
    pub review_count: i32,
    pub is_last_review_successful: bool,
    pub success_count: i32,
}

/// The contextual occurrence of a word inside a specific sentence.
#[derive(Debug, Clone)]
pub struct SentenceWord {
    pub id: i64,
    pub word_id: i64,
    pub sentence_id: i64,
    pub meaning: String,
    pub pos: String,
    pub memo: String,
}

//=========================================================================================
// Wordbook Commit Payloads
//=========================================================================================

/// One word the user selected for the new wordbook.
#[derive(Debug, Clone)]
pub struct WordSelection {
    pub text: String,
    pub meaning: String,
    pub others: Option<String>,
    pub pos: String,
    pub memo: String,
}

/// One sentence the user selected, with the words drawn from it.
#[derive(Debug, Clone)]
pub struct SentenceSelection {
    pub text: String,
    pub meaning: String,
    pub words: Vec<WordSelection>,
}

/// A full batch of analyzed sentences and words to persist as one wordbook.
/// The category is resolved by get-or-create; word texts are normalized to
/// lowercase before the `(user, text)` lookup.
#[derive(Debug, Clone)]
pub struct CommitSelection {
    pub category: String,
    pub name: String,
    pub language: Language,
    pub input_type: InputType,
    pub sentences: Vec<SentenceSelection>,
}

//=========================================================================================
// Sentence Analysis Output
//=========================================================================================

/// One analyzed word inside a sentence, as returned by the analysis collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct WordAnalysis {
    pub original_text: String,
    pub text: String,
    pub meaning: String,
    pub pos: Option<String>,
    pub others: Option<String>,
}

/// The analysis collaborator's verdict for one sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceAnalysis {
    pub text: String,
    pub meaning: String,
    pub words: Vec<WordAnalysis>,
}

//=========================================================================================
// Query Row Shapes
//=========================================================================================

/// One SentenceWord row joined with its word and sentence, as the review
/// selector consumes it in wordbook scope.
#[derive(Debug, Clone)]
pub struct ReviewRow {
    pub sentence_word_id: i64,
    pub word_id: i64,
    pub word_text: String,
    pub word_others: Option<String>,
    pub meaning: String,
    pub pos: String,
    pub sentence_id: i64,
    pub sentence_text: String,
}

/// One contextual occurrence of a word, joined with the sentence it came from.
#[derive(Debug, Clone)]
pub struct WordContext {
    pub sentence_word_id: i64,
    pub word_id: i64,
    pub meaning: String,
    pub pos: String,
    pub memo: String,
    pub sentence_id: i64,
    pub sentence_text: String,
}

/// One SentenceWord row joined for graph construction.
#[derive(Debug, Clone)]
pub struct GraphRow {
    pub sentence_word_id: i64,
    pub word_id: i64,
    pub word_text: String,
    pub word_meaning: String,
    pub sentence_id: i64,
    pub sentence_text: String,
    pub sentence_review_count: i32,
}

/// The word-level outcome of applying one review result.
#[derive(Debug, Clone)]
pub struct ReviewedWord {
    pub sentence_word_id: i64,
    pub word_text: String,
    pub review_count: i32,
}
