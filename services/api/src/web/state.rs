//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use lingua_core::graph::GraphBuilder;
use lingua_core::ports::{SentenceAnalysisService, VocabularyStore};
use lingua_core::review::ReviewSelector;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn VocabularyStore>,
    pub config: Arc<Config>,
    pub analysis_adapter: Arc<dyn SentenceAnalysisService>,
    pub review_selector: ReviewSelector,
    pub graph_builder: GraphBuilder,
}

impl AppState {
    pub fn new(
        store: Arc<dyn VocabularyStore>,
        config: Arc<Config>,
        analysis_adapter: Arc<dyn SentenceAnalysisService>,
    ) -> Self {
        let review_selector = ReviewSelector::new(store.clone());
        let graph_builder = GraphBuilder::new(store.clone());
        Self {
            store,
            config,
            analysis_adapter,
            review_selector,
            graph_builder,
        }
    }
}
