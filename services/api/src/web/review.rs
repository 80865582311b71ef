//! services/api/src/web/review.rs
//!
//! Axum handlers for the review endpoints (wordbook-scoped, category-scoped,
//! submission) and the word-sentence graph endpoint.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    Extension,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::web::middleware::CurrentUser;
use crate::web::state::AppState;
use lingua_core::graph::{GraphWindow, WordGraph, DEFAULT_GRAPH_LIMIT};
use lingua_core::ports::PortError;
use lingua_core::review::{
    CategoryScope, ReviewBatch, ReviewItem, ReviewQuery, ReviewResultEntry, DEFAULT_REVIEW_LIMIT,
};

//=========================================================================================
// Parameter Parsing
//=========================================================================================

fn validation(message: impl Into<String>) -> ApiError {
    ApiError::Port(PortError::Validation(message.into()))
}

/// Parses an optional non-negative integer query parameter, rejecting
/// non-integer and negative values.
fn parse_non_negative(name: &str, raw: Option<&str>, default: u64) -> Result<u64, ApiError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse::<i64>()
            .ok()
            .filter(|v| *v >= 0)
            .map(|v| v as u64)
            .ok_or_else(|| validation(format!("{name} must be a non-negative integer"))),
    }
}

/// Only the exact strings 'true' and 'false' select a reviewed state; any
/// other value leaves the filter off.
fn parse_reviewed(raw: Option<&str>) -> Option<bool> {
    match raw {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

/// `None` and `"all"` mean the whole vocabulary; anything else must be a
/// category id.
fn parse_category_scope(raw: Option<&str>) -> Result<CategoryScope, ApiError> {
    match raw {
        None | Some("all") => Ok(CategoryScope::All),
        Some(value) => value
            .parse::<i64>()
            .map(CategoryScope::Id)
            .map_err(|_| validation("Invalid category_id format")),
    }
}

//=========================================================================================
// Review DTOs
//=========================================================================================

/// A review item in either of its two shapes. Serialized untagged: flat items
/// carry a top-level `meaning`, grouped items a `meanings` array.
#[derive(Serialize, ToSchema)]
#[serde(untagged)]
pub enum ReviewItemDto {
    Flat(FlatItemDto),
    Grouped(GroupedItemDto),
}

#[derive(Serialize, ToSchema)]
pub struct FlatItemDto {
    pub id: String,
    pub word: String,
    pub meaning: String,
    pub others: String,
    pub pos: String,
    pub context: String,
}

#[derive(Serialize, ToSchema)]
pub struct GroupedItemDto {
    pub word: String,
    pub meanings: Vec<MeaningDto>,
}

#[derive(Serialize, ToSchema)]
pub struct MeaningDto {
    pub id: String,
    pub meaning: String,
    pub others: String,
    pub pos: String,
    pub context: String,
}

#[derive(Serialize, ToSchema)]
pub struct ReviewDataResponse {
    pub words: Vec<ReviewItemDto>,
    pub total_count: usize,
}

impl ReviewDataResponse {
    fn from_batch(batch: ReviewBatch) -> Self {
        let words = batch
            .words
            .into_iter()
            .map(|item| match item {
                ReviewItem::Flat(flat) => ReviewItemDto::Flat(FlatItemDto {
                    id: flat.id.to_string(),
                    word: flat.word,
                    meaning: flat.meaning,
                    others: flat.others,
                    pos: flat.pos,
                    context: flat.context,
                }),
                ReviewItem::Grouped(grouped) => ReviewItemDto::Grouped(GroupedItemDto {
                    word: grouped.word,
                    meanings: grouped
                        .meanings
                        .into_iter()
                        .map(|meaning| MeaningDto {
                            id: meaning.id.to_string(),
                            meaning: meaning.meaning,
                            others: meaning.others,
                            pos: meaning.pos,
                            context: meaning.context,
                        })
                        .collect(),
                }),
            })
            .collect();
        Self {
            words,
            total_count: batch.total_count,
        }
    }
}

#[derive(Deserialize)]
pub struct WordbookReviewParams {
    pub limit: Option<String>,
    pub reviewed: Option<String>,
}

#[derive(Deserialize)]
pub struct CategoryReviewParams {
    pub category: Option<String>,
    pub language: Option<String>,
    pub limit: Option<String>,
    pub reviewed: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ReviewResultRequest {
    pub word_id: String,
    pub is_known: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct ReviewSubmissionRequest {
    pub wordbook_id: i64,
    pub results: Vec<ReviewResultRequest>,
}

#[derive(Serialize, ToSchema)]
pub struct UpdatedWordDto {
    pub word_id: String,
    pub word: String,
    pub review_count: i32,
    pub is_known: bool,
}

#[derive(Serialize, ToSchema)]
pub struct FailedWordDto {
    pub word_id: String,
    pub error: String,
}

#[derive(Serialize, ToSchema)]
pub struct SubmissionResponse {
    pub message: String,
    pub updated_words: Vec<UpdatedWordDto>,
    pub total_updated: usize,
    pub wordbook_id: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_words: Vec<FailedWordDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_failed: Option<usize>,
}

//=========================================================================================
// Review Handlers
//=========================================================================================

/// Review batch for one wordbook: flat word-in-context items.
#[utoipa::path(
    get,
    path = "/wordbooks/review/{wordbook_id}",
    params(
        ("wordbook_id" = i64, Path, description = "Wordbook id"),
        ("limit" = Option<i64>, Query, description = "Maximum items to return (default 20)"),
        ("reviewed" = Option<String>, Query, description = "'true' keeps reviewed words, 'false' unreviewed")
    ),
    responses(
        (status = 200, description = "Sampled review items", body = ReviewDataResponse),
        (status = 400, description = "Malformed parameters", body = crate::error::ErrorBody),
        (status = 404, description = "Wordbook not found", body = crate::error::ErrorBody)
    )
)]
pub async fn wordbook_review_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(wordbook_id): Path<i64>,
    Query(params): Query<WordbookReviewParams>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = parse_non_negative("limit", params.limit.as_deref(), DEFAULT_REVIEW_LIMIT as u64)?;
    let query = ReviewQuery {
        limit: limit as usize,
        reviewed: parse_reviewed(params.reviewed.as_deref()),
    };
    info!(wordbook_id, limit, "selecting wordbook review batch");

    let batch = state
        .review_selector
        .for_wordbook(user_id, wordbook_id, &query)
        .await?;
    Ok(Json(ReviewDataResponse::from_batch(batch)))
}

/// Review batch for a category (or the whole vocabulary): words grouped with
/// every contextual meaning.
#[utoipa::path(
    get,
    path = "/wordbooks/review",
    params(
        ("category" = Option<String>, Query, description = "Category id, or 'all' for everything"),
        ("language" = Option<String>, Query, description = "Language filter"),
        ("limit" = Option<i64>, Query, description = "Maximum words to return (default 20)"),
        ("reviewed" = Option<String>, Query, description = "'true' keeps reviewed words, 'false' unreviewed")
    ),
    responses(
        (status = 200, description = "Sampled review items", body = ReviewDataResponse),
        (status = 400, description = "Malformed parameters or language mismatch", body = crate::error::ErrorBody),
        (status = 404, description = "Category not found", body = crate::error::ErrorBody)
    )
)]
pub async fn category_review_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Query(params): Query<CategoryReviewParams>,
) -> Result<impl IntoResponse, ApiError> {
    let scope = parse_category_scope(params.category.as_deref())?;
    let language = params
        .language
        .as_deref()
        .map(|raw| {
            raw.parse::<lingua_core::domain::Language>()
                .map_err(|e| validation(e.to_string()))
        })
        .transpose()?;
    let limit = parse_non_negative("limit", params.limit.as_deref(), DEFAULT_REVIEW_LIMIT as u64)?;
    let query = ReviewQuery {
        limit: limit as usize,
        reviewed: parse_reviewed(params.reviewed.as_deref()),
    };
    info!(?scope, ?language, limit, "selecting category review batch");

    let batch = state
        .review_selector
        .for_category(user_id, scope, language, &query)
        .await?;
    Ok(Json(ReviewDataResponse::from_batch(batch)))
}

/// Apply a batch of review results for one wordbook.
#[utoipa::path(
    post,
    path = "/wordbooks/{wordbook_id}/review/submit",
    params(("wordbook_id" = i64, Path, description = "Wordbook id")),
    request_body = ReviewSubmissionRequest,
    responses(
        (status = 200, description = "Submission processed, possibly with per-item failures", body = SubmissionResponse),
        (status = 400, description = "Body and path wordbook ids disagree", body = crate::error::ErrorBody),
        (status = 404, description = "Wordbook not found", body = crate::error::ErrorBody)
    )
)]
pub async fn submit_review_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(wordbook_id): Path<i64>,
    Json(req): Json<ReviewSubmissionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.wordbook_id != wordbook_id {
        return Err(validation(
            "wordbook_id in the body does not match the URL",
        ));
    }

    // Entries whose id is not even numeric are unresolvable by definition;
    // they join the failed list without touching the store.
    let mut entries = Vec::new();
    let mut failed = Vec::new();
    for result in &req.results {
        match result.word_id.parse::<i64>() {
            Ok(sentence_word_id) => entries.push(ReviewResultEntry {
                sentence_word_id,
                is_known: result.is_known,
            }),
            Err(_) => failed.push(FailedWordDto {
                word_id: result.word_id.clone(),
                error: "Invalid word id".to_string(),
            }),
        }
    }

    let outcome = state
        .review_selector
        .submit(user_id, wordbook_id, &entries, Utc::now())
        .await?;

    let updated_words: Vec<UpdatedWordDto> = outcome
        .updated
        .into_iter()
        .map(|u| UpdatedWordDto {
            word_id: u.sentence_word_id.to_string(),
            word: u.word,
            review_count: u.review_count,
            is_known: u.is_known,
        })
        .collect();
    failed.extend(outcome.failed.into_iter().map(|f| FailedWordDto {
        word_id: f.sentence_word_id.to_string(),
        error: f.error,
    }));

    info!(
        wordbook_id,
        applied = updated_words.len(),
        failed = failed.len(),
        "review submission processed"
    );

    let total_failed = if failed.is_empty() {
        None
    } else {
        Some(failed.len())
    };
    Ok(Json(SubmissionResponse {
        message: format!("Applied {} review result(s).", updated_words.len()),
        total_updated: updated_words.len(),
        updated_words,
        wordbook_id,
        failed_words: failed,
        total_failed,
    }))
}

//=========================================================================================
// Graph DTOs and Handler
//=========================================================================================

#[derive(Deserialize)]
pub struct GraphParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct WordNodeDto {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub meaning: String,
    pub color: String,
}

#[derive(Serialize, ToSchema)]
pub struct SentenceNodeDto {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub review_count: i32,
    pub color: String,
}

/// A graph node. Word and sentence nodes differ structurally; the `type`
/// field carries the discriminator the renderer keys on.
#[derive(Serialize, ToSchema)]
#[serde(untagged)]
pub enum GraphNodeDto {
    Word(WordNodeDto),
    Sentence(SentenceNodeDto),
}

#[derive(Serialize, ToSchema)]
pub struct GraphEdgeDto {
    pub from: String,
    pub to: String,
}

#[derive(Serialize, ToSchema)]
pub struct GraphResponse {
    pub nodes: Vec<GraphNodeDto>,
    pub edges: Vec<GraphEdgeDto>,
}

impl GraphResponse {
    fn from_graph(graph: WordGraph) -> Self {
        let mut nodes = Vec::with_capacity(graph.word_nodes.len() + graph.sentence_nodes.len());
        nodes.extend(graph.word_nodes.into_iter().map(|node| {
            GraphNodeDto::Word(WordNodeDto {
                id: node.id,
                label: node.label,
                kind: "word",
                meaning: node.meaning,
                color: node.color,
            })
        }));
        nodes.extend(graph.sentence_nodes.into_iter().map(|node| {
            GraphNodeDto::Sentence(SentenceNodeDto {
                id: node.id,
                label: node.label,
                kind: "sentence",
                review_count: node.review_count,
                color: node.color,
            })
        }));
        let edges = graph
            .edges
            .into_iter()
            .map(|edge| GraphEdgeDto {
                from: edge.from,
                to: edge.to,
            })
            .collect();
        Self { nodes, edges }
    }
}

/// The word-sentence graph for the caller, windowed for pagination.
#[utoipa::path(
    get,
    path = "/graph",
    params(
        ("limit" = Option<i64>, Query, description = "Window size (default 200, 0 yields an empty graph)"),
        ("offset" = Option<i64>, Query, description = "Window start (default 0)")
    ),
    responses(
        (status = 200, description = "Graph nodes and edges", body = GraphResponse),
        (status = 400, description = "Malformed limit or offset", body = crate::error::ErrorBody)
    )
)]
pub async fn graph_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Query(params): Query<GraphParams>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = parse_non_negative("limit", params.limit.as_deref(), DEFAULT_GRAPH_LIMIT as u64)?;
    let offset = parse_non_negative("offset", params.offset.as_deref(), 0)?;
    let window = GraphWindow {
        limit: Some(limit.min(u32::MAX as u64) as u32),
        offset: offset.min(u32::MAX as u64) as u32,
    };

    let graph = state.graph_builder.build(user_id, window).await?;
    Ok(Json(GraphResponse::from_graph(graph)))
}
