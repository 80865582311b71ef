//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the management REST endpoints (wordbooks,
//! words, sentences, categories, sentence analysis) and the master definition
//! for the OpenAPI specification.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::{OpenApi, ToSchema};

use crate::error::ApiError;
use crate::web::middleware::CurrentUser;
use crate::web::state::AppState;
use lingua_core::domain::{
    CommitSelection, InputType, Language, SentenceSelection, Word, WordSelection, Wordbook,
};
use lingua_core::ports::PortError;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::signup_handler,
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
        list_wordbooks_handler,
        create_wordbook_handler,
        get_wordbook_handler,
        update_wordbook_handler,
        delete_wordbook_handler,
        get_word_handler,
        delete_word_handler,
        word_context_handler,
        delete_sentence_handler,
        list_categories_handler,
        analyze_handler,
        crate::web::review::wordbook_review_handler,
        crate::web::review::category_review_handler,
        crate::web::review::submit_review_handler,
        crate::web::review::graph_handler,
    ),
    components(
        schemas(
            crate::web::auth::SignupRequest,
            crate::web::auth::LoginRequest,
            crate::web::auth::AuthResponse,
            crate::error::ErrorBody,
            crate::error::ErrorDetail,
            WordbookDto,
            CategoryInfo,
            WordbookListResponse,
            CommitSelectionRequest,
            SentenceSelectionRequest,
            WordSelectionRequest,
            CommitResponse,
            WordbookDetailResponse,
            SentenceDto,
            SentenceWordDto,
            WordbookUpdateRequest,
            WordbookUpdateResponse,
            WordDto,
            WordContextDto,
            WordDetailResponse,
            WordContextListResponse,
            CategoryDto,
            AnalyzeRequest,
            AnalyzeResponse,
            SentenceAnalysisDto,
            WordAnalysisDto,
            crate::web::review::ReviewDataResponse,
            crate::web::review::ReviewItemDto,
            crate::web::review::FlatItemDto,
            crate::web::review::GroupedItemDto,
            crate::web::review::MeaningDto,
            crate::web::review::ReviewSubmissionRequest,
            crate::web::review::ReviewResultRequest,
            crate::web::review::SubmissionResponse,
            crate::web::review::UpdatedWordDto,
            crate::web::review::FailedWordDto,
            crate::web::review::GraphResponse,
            crate::web::review::GraphNodeDto,
            crate::web::review::WordNodeDto,
            crate::web::review::SentenceNodeDto,
            crate::web::review::GraphEdgeDto,
        )
    ),
    tags(
        (name = "Lingua API", description = "Vocabulary, review, and graph endpoints for the language-learning backend.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct WordbookDto {
    pub id: i64,
    pub name: String,
    pub category_id: Option<i64>,
    pub language: String,
    pub input_type: String,
    pub created_at: DateTime<Utc>,
}

impl WordbookDto {
    fn from_domain(wordbook: Wordbook) -> Self {
        Self {
            id: wordbook.id,
            name: wordbook.name,
            category_id: wordbook.category_id,
            language: wordbook.language.to_string(),
            input_type: wordbook.input_type.to_string(),
            created_at: wordbook.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct CategoryInfo {
    pub id: i64,
    pub name: String,
}

#[derive(Serialize, ToSchema)]
pub struct WordbookListResponse {
    pub wordbooks: Vec<WordbookDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryInfo>,
    pub total_count: usize,
}

#[derive(Deserialize, ToSchema)]
pub struct WordSelectionRequest {
    pub text: String,
    #[serde(default)]
    pub meaning: String,
    #[serde(default)]
    pub others: Option<String>,
    #[serde(default)]
    pub pos: String,
    #[serde(default)]
    pub memo: String,
}

#[derive(Deserialize, ToSchema)]
pub struct SentenceSelectionRequest {
    pub text: String,
    #[serde(default)]
    pub meaning: String,
    pub words: Vec<WordSelectionRequest>,
}

#[derive(Deserialize, ToSchema)]
pub struct CommitSelectionRequest {
    pub category: String,
    pub name: String,
    pub language: String,
    pub input_type: String,
    pub sentences: Vec<SentenceSelectionRequest>,
}

#[derive(Serialize, ToSchema)]
pub struct CommitResponse {
    pub success: bool,
    pub wordbook_id: i64,
}

#[derive(Serialize, ToSchema)]
pub struct SentenceWordDto {
    /// The SentenceWord association id.
    pub id: i64,
    pub text: String,
    pub meaning: String,
    pub pos: String,
}

#[derive(Serialize, ToSchema)]
pub struct SentenceDto {
    pub id: i64,
    pub text: String,
    pub meaning: String,
    pub created_at: DateTime<Utc>,
    pub last_reviewed_at: DateTime<Utc>,
    pub review_count: i32,
    pub is_last_review_successful: bool,
    pub words: Vec<SentenceWordDto>,
}

#[derive(Serialize, ToSchema)]
pub struct WordbookDetailResponse {
    #[serde(flatten)]
    pub wordbook: WordbookDto,
    pub sentences: Vec<SentenceDto>,
}

#[derive(Deserialize, ToSchema)]
pub struct WordbookUpdateRequest {
    pub name: Option<String>,
    pub category: Option<i64>,
}

#[derive(Serialize, ToSchema)]
pub struct WordbookUpdateResponse {
    pub success: bool,
    pub wordbook: WordbookDto,
}

#[derive(Serialize, ToSchema)]
pub struct WordDto {
    pub id: i64,
    pub text: String,
    pub others: Option<String>,
    pub last_reviewed_at: DateTime<Utc>,
    pub review_count: i32,
    pub is_last_review_successful: bool,
    pub success_count: i32,
}

impl WordDto {
    fn from_domain(word: Word) -> Self {
        Self {
            id: word.id,
            text: word.text,
            others: word.others,
            last_reviewed_at: word.last_reviewed_at,
            review_count: word.review_count,
            is_last_review_successful: word.is_last_review_successful,
            success_count: word.success_count,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct WordContextDto {
    /// The SentenceWord association id.
    pub id: i64,
    pub meaning: String,
    pub pos: String,
    pub memo: String,
    pub sentence_id: i64,
    pub sentence_text: String,
}

#[derive(Serialize, ToSchema)]
pub struct WordDetailResponse {
    pub word: WordDto,
    pub sentences: Vec<WordContextDto>,
}

#[derive(Serialize, ToSchema)]
pub struct WordContextListResponse {
    pub success: bool,
    pub sentences: Vec<WordContextDto>,
}

#[derive(Serialize, ToSchema)]
pub struct CategoryDto {
    pub id: i64,
    pub name: String,
    pub language: String,
}

#[derive(Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    pub sentences: Vec<String>,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    Language::English.to_string()
}

#[derive(Serialize, ToSchema)]
pub struct WordAnalysisDto {
    pub original_text: String,
    pub text: String,
    pub meaning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub others: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SentenceAnalysisDto {
    pub text: String,
    pub meaning: String,
    pub words: Vec<WordAnalysisDto>,
}

#[derive(Serialize, ToSchema)]
pub struct AnalyzeResponse {
    pub selected: Vec<SentenceAnalysisDto>,
}

//=========================================================================================
// Query Parameter Structs
//=========================================================================================

#[derive(Deserialize)]
pub struct WordbookListParams {
    pub category_id: Option<String>,
}

#[derive(Deserialize)]
pub struct WordContextParams {
    pub word: Option<String>,
}

#[derive(Deserialize)]
pub struct CategoryListParams {
    pub language: Option<String>,
}

fn parse_language(raw: &str) -> Result<Language, ApiError> {
    raw.parse::<Language>()
        .map_err(|e| ApiError::Port(PortError::Validation(e.to_string())))
}

//=========================================================================================
// Wordbook Handlers
//=========================================================================================

/// List the caller's wordbooks, newest first, optionally narrowed to one category.
#[utoipa::path(
    get,
    path = "/wordbooks",
    params(
        ("category_id" = Option<i64>, Query, description = "Only list wordbooks in this category")
    ),
    responses(
        (status = 200, description = "Wordbook list", body = WordbookListResponse),
        (status = 400, description = "Malformed category id", body = crate::error::ErrorBody),
        (status = 404, description = "Category not found", body = crate::error::ErrorBody)
    )
)]
pub async fn list_wordbooks_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Query(params): Query<WordbookListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let category = match params.category_id {
        Some(raw) => {
            let category_id = raw.parse::<i64>().map_err(|_| {
                ApiError::Port(PortError::Validation(
                    "category_id must be an integer".to_string(),
                ))
            })?;
            Some(state.store.get_category(user_id, category_id).await?)
        }
        None => None,
    };

    let wordbooks = state
        .store
        .list_wordbooks(user_id, category.as_ref().map(|c| c.id))
        .await?;
    let total_count = wordbooks.len();

    Ok(Json(WordbookListResponse {
        wordbooks: wordbooks.into_iter().map(WordbookDto::from_domain).collect(),
        category: category.map(|c| CategoryInfo {
            id: c.id,
            name: c.name,
        }),
        total_count,
    }))
}

/// Persist an analyzed selection of sentences and words as a new wordbook.
#[utoipa::path(
    post,
    path = "/wordbooks",
    request_body = CommitSelectionRequest,
    responses(
        (status = 201, description = "Wordbook created", body = CommitResponse),
        (status = 400, description = "Malformed selection", body = crate::error::ErrorBody),
        (status = 409, description = "Constraint violation, nothing was saved", body = crate::error::ErrorBody)
    )
)]
pub async fn create_wordbook_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(req): Json<CommitSelectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let language = parse_language(&req.language)?;
    let input_type = req
        .input_type
        .parse::<InputType>()
        .map_err(|e| ApiError::Port(PortError::Validation(e.to_string())))?;

    let selection = CommitSelection {
        category: req.category,
        name: req.name,
        language,
        input_type,
        sentences: req
            .sentences
            .into_iter()
            .map(|sentence| SentenceSelection {
                text: sentence.text,
                meaning: sentence.meaning,
                words: sentence
                    .words
                    .into_iter()
                    .map(|word| WordSelection {
                        text: word.text,
                        meaning: word.meaning,
                        others: word.others,
                        pos: word.pos,
                        memo: word.memo,
                    })
                    .collect(),
            })
            .collect(),
    };

    info!(
        sentence_count = selection.sentences.len(),
        "committing wordbook '{}'", selection.name
    );
    let wordbook_id = state.store.commit_wordbook(user_id, selection).await?;

    Ok((
        StatusCode::CREATED,
        Json(CommitResponse {
            success: true,
            wordbook_id,
        }),
    ))
}

/// Fetch one wordbook with its sentences and the words drawn from each.
#[utoipa::path(
    get,
    path = "/wordbooks/{wordbook_id}",
    params(("wordbook_id" = i64, Path, description = "Wordbook id")),
    responses(
        (status = 200, description = "Wordbook detail", body = WordbookDetailResponse),
        (status = 404, description = "Wordbook not found", body = crate::error::ErrorBody)
    )
)]
pub async fn get_wordbook_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(wordbook_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let wordbook = state.store.get_wordbook(user_id, wordbook_id).await?;
    let sentences = state.store.wordbook_sentences(user_id, wordbook_id).await?;
    let rows = state
        .store
        .wordbook_review_rows(user_id, wordbook_id, None)
        .await?;

    let mut words_by_sentence: HashMap<i64, Vec<SentenceWordDto>> = HashMap::new();
    for row in rows {
        words_by_sentence
            .entry(row.sentence_id)
            .or_default()
            .push(SentenceWordDto {
                id: row.sentence_word_id,
                text: row.word_text,
                meaning: row.meaning,
                pos: row.pos,
            });
    }

    let sentences = sentences
        .into_iter()
        .map(|sentence| SentenceDto {
            id: sentence.id,
            text: sentence.text,
            meaning: sentence.meaning,
            created_at: sentence.created_at,
            last_reviewed_at: sentence.last_reviewed_at,
            review_count: sentence.review_count,
            is_last_review_successful: sentence.is_last_review_successful,
            words: words_by_sentence.remove(&sentence.id).unwrap_or_default(),
        })
        .collect();

    Ok(Json(WordbookDetailResponse {
        wordbook: WordbookDto::from_domain(wordbook),
        sentences,
    }))
}

/// Rename or recategorize a wordbook.
#[utoipa::path(
    patch,
    path = "/wordbooks/{wordbook_id}",
    params(("wordbook_id" = i64, Path, description = "Wordbook id")),
    request_body = WordbookUpdateRequest,
    responses(
        (status = 200, description = "Wordbook updated", body = WordbookUpdateResponse),
        (status = 404, description = "Wordbook or category not found", body = crate::error::ErrorBody)
    )
)]
pub async fn update_wordbook_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(wordbook_id): Path<i64>,
    Json(req): Json<WordbookUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let wordbook = state
        .store
        .update_wordbook(user_id, wordbook_id, req.name, req.category)
        .await?;
    Ok(Json(WordbookUpdateResponse {
        success: true,
        wordbook: WordbookDto::from_domain(wordbook),
    }))
}

/// Delete a wordbook and everything that hangs off it.
#[utoipa::path(
    delete,
    path = "/wordbooks/{wordbook_id}",
    params(("wordbook_id" = i64, Path, description = "Wordbook id")),
    responses(
        (status = 204, description = "Wordbook deleted"),
        (status = 404, description = "Wordbook not found", body = crate::error::ErrorBody)
    )
)]
pub async fn delete_wordbook_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(wordbook_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.delete_wordbook(user_id, wordbook_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Word and Sentence Handlers
//=========================================================================================

/// Fetch one word and every sentence it occurs in.
#[utoipa::path(
    get,
    path = "/words/{word_id}",
    params(("word_id" = i64, Path, description = "Word id")),
    responses(
        (status = 200, description = "Word detail", body = WordDetailResponse),
        (status = 404, description = "Word not found", body = crate::error::ErrorBody)
    )
)]
pub async fn get_word_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(word_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let word = state.store.get_word(user_id, word_id).await?;
    let contexts = state.store.word_contexts(user_id, word_id).await?;
    Ok(Json(WordDetailResponse {
        word: WordDto::from_domain(word),
        sentences: contexts.into_iter().map(context_dto).collect(),
    }))
}

fn context_dto(context: lingua_core::domain::WordContext) -> WordContextDto {
    WordContextDto {
        id: context.sentence_word_id,
        meaning: context.meaning,
        pos: context.pos,
        memo: context.memo,
        sentence_id: context.sentence_id,
        sentence_text: context.sentence_text,
    }
}

/// Delete a word together with its associations.
#[utoipa::path(
    delete,
    path = "/words/{word_id}",
    params(("word_id" = i64, Path, description = "Word id")),
    responses(
        (status = 204, description = "Word deleted"),
        (status = 404, description = "Word not found", body = crate::error::ErrorBody)
    )
)]
pub async fn delete_word_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(word_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.delete_word(user_id, word_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Look up a word's contexts by its text. Unknown text yields an empty list.
#[utoipa::path(
    get,
    path = "/words/context",
    params(("word" = String, Query, description = "Word text to look up")),
    responses(
        (status = 200, description = "Sentences containing the word", body = WordContextListResponse),
        (status = 400, description = "Missing word parameter", body = crate::error::ErrorBody)
    )
)]
pub async fn word_context_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Query(params): Query<WordContextParams>,
) -> Result<impl IntoResponse, ApiError> {
    let word_text = params.word.ok_or_else(|| {
        ApiError::Port(PortError::Validation("word parameter is required".to_string()))
    })?;

    let sentences = match state.store.find_word_by_text(user_id, &word_text).await? {
        Some(word) => state
            .store
            .word_contexts(user_id, word.id)
            .await?
            .into_iter()
            .map(context_dto)
            .collect(),
        None => Vec::new(),
    };
    Ok(Json(WordContextListResponse {
        success: true,
        sentences,
    }))
}

/// Delete one sentence; its word links go with it.
#[utoipa::path(
    delete,
    path = "/sentences/{sentence_id}",
    params(("sentence_id" = i64, Path, description = "Sentence id")),
    responses(
        (status = 204, description = "Sentence deleted"),
        (status = 404, description = "Sentence not found", body = crate::error::ErrorBody)
    )
)]
pub async fn delete_sentence_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(sentence_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.delete_sentence(user_id, sentence_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Category and Analysis Handlers
//=========================================================================================

/// List the caller's categories for one language.
#[utoipa::path(
    get,
    path = "/categories",
    params(("language" = Option<String>, Query, description = "Language filter, defaults to english")),
    responses(
        (status = 200, description = "Category list", body = [CategoryDto]),
        (status = 400, description = "Unknown language", body = crate::error::ErrorBody)
    )
)]
pub async fn list_categories_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Query(params): Query<CategoryListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let language = match params.language {
        Some(raw) => parse_language(&raw)?,
        None => Language::English,
    };
    let categories = state.store.list_categories(user_id, language).await?;
    let categories: Vec<CategoryDto> = categories
        .into_iter()
        .map(|c| CategoryDto {
            id: c.id,
            name: c.name,
            language: c.language.to_string(),
        })
        .collect();
    Ok(Json(categories))
}

/// Analyze a batch of sentences with the external text-analysis collaborator.
///
/// Sentences whose analysis exhausts its retries are skipped rather than
/// failing the whole batch.
#[utoipa::path(
    post,
    path = "/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Analyzed sentences", body = AnalyzeResponse),
        (status = 400, description = "Unknown language", body = crate::error::ErrorBody)
    )
)]
pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(_user_id)): Extension<CurrentUser>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let language = parse_language(&req.language)?;
    info!(
        sentence_count = req.sentences.len(),
        language = %language,
        "analyzing sentence batch"
    );

    let mut selected = Vec::new();
    for sentence in &req.sentences {
        match state
            .analysis_adapter
            .analyze_sentence(sentence, language)
            .await
        {
            Ok(analysis) => selected.push(SentenceAnalysisDto {
                text: analysis.text,
                meaning: analysis.meaning,
                words: analysis
                    .words
                    .into_iter()
                    .map(|w| WordAnalysisDto {
                        original_text: w.original_text,
                        text: w.text,
                        meaning: w.meaning,
                        pos: w.pos,
                        others: w.others,
                    })
                    .collect(),
            }),
            Err(e) => {
                warn!("skipping sentence after failed analysis: {e}");
            }
        }
    }

    Ok(Json(AnalyzeResponse { selected }))
}
