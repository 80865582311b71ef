//! crates/lingua_core/src/review.rs
//!
//! The review selector: assembles bounded, randomized batches of review
//! material from a user's vocabulary, and applies submitted review results
//! back onto word-level counters.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::Language;
use crate::ports::{PortError, PortResult, VocabularyStore};

/// Default number of items per review batch.
pub const DEFAULT_REVIEW_LIMIT: usize = 20;

/// Filters shared by both review scopes.
#[derive(Debug, Clone)]
pub struct ReviewQuery {
    /// Maximum number of items to sample. The true match count is always
    /// reported separately in [`ReviewBatch::total_count`].
    pub limit: usize,
    /// `Some(true)` keeps words with `review_count > 0`, `Some(false)` keeps
    /// words with `review_count == 0`, `None` keeps everything.
    pub reviewed: Option<bool>,
}

impl Default for ReviewQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_REVIEW_LIMIT,
            reviewed: None,
        }
    }
}

/// Category scope for a review request: one concrete category or all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryScope {
    All,
    Id(i64),
}

/// A review item in one of its two shapes. The variants are structurally
/// distinguishable on the wire (grouped items carry a `meanings` array, flat
/// items a top-level `meaning` scalar), so no discriminator field is emitted.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewItem {
    Flat(FlatReviewItem),
    Grouped(GroupedReviewItem),
}

/// One word-in-context, as produced by wordbook-scoped selection.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatReviewItem {
    pub id: i64,
    pub word: String,
    pub meaning: String,
    pub others: String,
    pub pos: String,
    pub context: String,
}

/// One word with every contextual meaning it carries, as produced by
/// category-scoped selection.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedReviewItem {
    pub word: String,
    pub meanings: Vec<ContextualMeaning>,
}

/// A single contextual meaning inside a grouped item.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextualMeaning {
    pub id: i64,
    pub meaning: String,
    pub others: String,
    pub pos: String,
    pub context: String,
}

/// A sampled batch plus the true match count before sampling.
#[derive(Debug, Clone)]
pub struct ReviewBatch {
    pub words: Vec<ReviewItem>,
    pub total_count: usize,
}

/// One entry of a submitted review: the SentenceWord that was shown and
/// whether the user knew it.
#[derive(Debug, Clone)]
pub struct ReviewResultEntry {
    pub sentence_word_id: i64,
    pub is_known: bool,
}

/// A successfully applied review result.
#[derive(Debug, Clone)]
pub struct UpdatedWord {
    pub sentence_word_id: i64,
    pub word: String,
    pub review_count: i32,
    pub is_known: bool,
}

/// A review result that referenced an unresolvable SentenceWord.
#[derive(Debug, Clone)]
pub struct FailedWord {
    pub sentence_word_id: i64,
    pub error: String,
}

/// The outcome of a review submission. Unresolvable entries never abort the
/// rest of the batch; they are collected here instead.
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub updated: Vec<UpdatedWord>,
    pub failed: Vec<FailedWord>,
}

//=========================================================================================
// ReviewSelector
//=========================================================================================

/// Produces review batches and applies review submissions against the store.
#[derive(Clone)]
pub struct ReviewSelector {
    store: Arc<dyn VocabularyStore>,
}

impl ReviewSelector {
    pub fn new(store: Arc<dyn VocabularyStore>) -> Self {
        Self { store }
    }

    /// Wordbook-scoped selection: every word-in-context of the wordbook,
    /// filtered, counted, then sampled into flat items.
    pub async fn for_wordbook(
        &self,
        user_id: Uuid,
        wordbook_id: i64,
        query: &ReviewQuery,
    ) -> PortResult<ReviewBatch> {
        // Ownership check first so a foreign wordbook is a NotFound, not an
        // empty batch.
        self.store.get_wordbook(user_id, wordbook_id).await?;

        let rows = self
            .store
            .wordbook_review_rows(user_id, wordbook_id, query.reviewed)
            .await?;
        let total_count = rows.len();
        let sampled = sample_without_replacement(rows, query.limit);

        let words = sampled
            .into_iter()
            .map(|row| {
                ReviewItem::Flat(FlatReviewItem {
                    id: row.sentence_word_id,
                    word: row.word_text,
                    meaning: row.meaning,
                    others: row.word_others.unwrap_or_default(),
                    pos: row.pos,
                    context: row.sentence_text,
                })
            })
            .collect();

        Ok(ReviewBatch { words, total_count })
    }

    /// Category-scoped selection: distinct words in scope, filtered, counted,
    /// sampled, then expanded into grouped items carrying every contextual
    /// meaning of each sampled word.
    pub async fn for_category(
        &self,
        user_id: Uuid,
        scope: CategoryScope,
        language: Option<Language>,
        query: &ReviewQuery,
    ) -> PortResult<ReviewBatch> {
        let category_id = match scope {
            CategoryScope::Id(id) => {
                let category = self.store.get_category(user_id, id).await?;
                if let Some(requested) = language {
                    if requested != category.language {
                        return Err(PortError::Validation(format!(
                            "Category language ({}) does not match requested language ({})",
                            category.language, requested
                        )));
                    }
                }
                Some(id)
            }
            CategoryScope::All => None,
        };

        let candidates = self
            .store
            .words_in_scope(user_id, category_id, language, query.reviewed)
            .await?;
        let total_count = candidates.len();
        let sampled = sample_without_replacement(candidates, query.limit);

        let word_ids: Vec<i64> = sampled.iter().map(|w| w.id).collect();
        let contexts = self.store.contexts_for_words(user_id, &word_ids).await?;

        let mut by_word: HashMap<i64, Vec<ContextualMeaning>> = HashMap::new();
        for context in contexts {
            let word_id = context.word_id;
            by_word.entry(word_id).or_default().push(ContextualMeaning {
                id: context.sentence_word_id,
                meaning: context.meaning,
                others: String::new(),
                pos: context.pos,
                context: context.sentence_text,
            });
        }

        let words = sampled
            .into_iter()
            .map(|word| {
                let others = word.others.clone().unwrap_or_default();
                let mut meanings = by_word.remove(&word.id).unwrap_or_default();
                for meaning in &mut meanings {
                    meaning.others = others.clone();
                }
                ReviewItem::Grouped(GroupedReviewItem {
                    word: word.text,
                    meanings,
                })
            })
            .collect();

        Ok(ReviewBatch { words, total_count })
    }

    /// Applies a batch of review results against one wordbook. Entries whose
    /// SentenceWord cannot be resolved within the wordbook and the caller's
    /// words are reported in [`ReviewOutcome::failed`]; every other entry is
    /// applied and echoed with the word's new review count.
    pub async fn submit(
        &self,
        user_id: Uuid,
        wordbook_id: i64,
        results: &[ReviewResultEntry],
        reviewed_at: DateTime<Utc>,
    ) -> PortResult<ReviewOutcome> {
        self.store.get_wordbook(user_id, wordbook_id).await?;

        let mut updated = Vec::new();
        let mut failed = Vec::new();

        for entry in results {
            match self
                .store
                .record_word_review(
                    user_id,
                    wordbook_id,
                    entry.sentence_word_id,
                    entry.is_known,
                    reviewed_at,
                )
                .await
            {
                Ok(reviewed) => updated.push(UpdatedWord {
                    sentence_word_id: reviewed.sentence_word_id,
                    word: reviewed.word_text,
                    review_count: reviewed.review_count,
                    is_known: entry.is_known,
                }),
                Err(PortError::NotFound(message)) => failed.push(FailedWord {
                    sentence_word_id: entry.sentence_word_id,
                    error: message,
                }),
                Err(other) => return Err(other),
            }
        }

        Ok(ReviewOutcome { updated, failed })
    }
}

/// Uniform sample without replacement of size `k` from `items`. Returns the
/// whole set when it is not larger than `k`.
fn sample_without_replacement<T>(items: Vec<T>, k: usize) -> Vec<T> {
    if items.len() <= k {
        return items;
    }
    let mut rng = rand::thread_rng();
    let picked = rand::seq::index::sample(&mut rng, items.len(), k);
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    picked
        .into_iter()
        .filter_map(|index| slots[index].take())
        .collect()
}
