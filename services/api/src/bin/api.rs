//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{db::DbAdapter, analysis_llm::OpenAiAnalysisAdapter},
    config::Config,
    error::ApiError,
    prompts::PromptLibrary,
    web::{
        auth::{login_handler, logout_handler, signup_handler},
        middleware::require_auth,
        rest::{
            analyze_handler, create_wordbook_handler, delete_sentence_handler,
            delete_word_handler, delete_wordbook_handler, get_word_handler,
            get_wordbook_handler, list_categories_handler, list_wordbooks_handler,
            update_wordbook_handler, word_context_handler, ApiDoc,
        },
        review::{
            category_review_handler, graph_handler, submit_review_handler,
            wordbook_review_handler,
        },
        state::AppState,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool.clone()));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Load Prompt Templates ---
    let prompts = Arc::new(
        PromptLibrary::load(&config.prompts_path)
            .map_err(|e| ApiError::Internal(e.to_string()))?,
    );

    // --- 4. Initialize Service Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    let openai_client = Client::with_config(openai_config);
    let analysis_adapter = Arc::new(OpenAiAnalysisAdapter::new(
        openai_client,
        config.analysis_model.clone(),
        prompts,
    ));

    // --- 5. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(db_adapter, config.clone(), analysis_adapter));

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .cors_origin
                .parse::<HeaderValue>()
                .map_err(|e| ApiError::Internal(format!("Invalid CORS_ORIGIN: {e}")))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 6. Create the Web Router ---
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/wordbooks",
            get(list_wordbooks_handler).post(create_wordbook_handler),
        )
        .route("/wordbooks/review", get(category_review_handler))
        .route(
            "/wordbooks/review/{wordbook_id}",
            get(wordbook_review_handler),
        )
        .route(
            "/wordbooks/{wordbook_id}",
            get(get_wordbook_handler)
                .patch(update_wordbook_handler)
                .delete(delete_wordbook_handler),
        )
        .route(
            "/wordbooks/{wordbook_id}/review/submit",
            post(submit_review_handler),
        )
        .route("/words/context", get(word_context_handler))
        .route(
            "/words/{word_id}",
            get(get_word_handler).delete(delete_word_handler),
        )
        .route("/sentences/{sentence_id}", delete(delete_sentence_handler))
        .route("/categories", get(list_categories_handler))
        .route("/analyze", post(analyze_handler))
        .route("/graph", get(graph_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 7. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
