//! services/api/src/adapters/analysis_llm.rs
//!
//! This module contains the adapter for the sentence-analysis LLM.
//! It implements the `SentenceAnalysisService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat},
    Client,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use crate::prompts::PromptLibrary;
use lingua_core::domain::{Language, SentenceAnalysis, WordAnalysis};
use lingua_core::ports::{PortError, PortResult, SentenceAnalysisService};

const MAX_ATTEMPTS: usize = 3;

//=========================================================================================
// Response Payload Structs
//=========================================================================================

/// The JSON shape the model is instructed to return. Deserialization doubles
/// as structural validation; a malformed payload triggers a retry.
#[derive(Deserialize)]
struct WordPayload {
    original_text: String,
    text: String,
    meaning: String,
    pos: Option<String>,
    others: Option<String>,
}

#[derive(Deserialize)]
struct SentencePayload {
    text: String,
    meaning: String,
    words: Vec<WordPayload>,
}

impl SentencePayload {
    fn to_domain(self) -> SentenceAnalysis {
        SentenceAnalysis {
            text: self.text,
            meaning: self.meaning,
            words: self
                .words
                .into_iter()
                .map(|w| WordAnalysis {
                    original_text: w.original_text,
                    text: w.text,
                    meaning: w.meaning,
                    pos: w.pos,
                    others: w.others,
                })
                .collect(),
        }
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `SentenceAnalysisService` using an
/// OpenAI-compatible LLM with per-language prompt templates.
#[derive(Clone)]
pub struct OpenAiAnalysisAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    prompts: Arc<PromptLibrary>,
}

impl OpenAiAnalysisAdapter {
    /// Creates a new `OpenAiAnalysisAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, prompts: Arc<PromptLibrary>) -> Self {
        Self {
            client,
            model,
            prompts,
        }
    }

    async fn attempt(&self, prompt: &str) -> Result<SentenceAnalysis, String> {
        let messages = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| e.to_string())?
            .into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.1)
            .max_tokens(5000u32)
            .response_format(ResponseFormat::JsonObject)
            .build()
            .map_err(|e| e.to_string())?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| e.to_string())?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| "analysis response contained no text content".to_string())?;

        let payload: SentencePayload =
            serde_json::from_str(&content).map_err(|e| format!("malformed analysis JSON: {e}"))?;
        Ok(payload.to_domain())
    }
}

//=========================================================================================
// `SentenceAnalysisService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SentenceAnalysisService for OpenAiAnalysisAdapter {
    /// Analyzes one sentence, retrying on API failures and malformed output
    /// before giving up.
    async fn analyze_sentence(
        &self,
        sentence: &str,
        language: Language,
    ) -> PortResult<SentenceAnalysis> {
        // Quotes inside the sentence would break the prompt's own quoting.
        let escaped = sentence.replace('"', "\\\"").replace('\'', "\\'");
        let prompt = self.prompts.render(language, &escaped);

        let mut last_error = String::new();
        for attempt in 1..=MAX_ATTEMPTS {
            match self.attempt(&prompt).await {
                Ok(analysis) => return Ok(analysis),
                Err(message) => {
                    warn!(attempt, language = %language, "sentence analysis failed: {message}");
                    last_error = message;
                }
            }
        }
        Err(PortError::Unavailable(format!(
            "sentence analysis failed after {MAX_ATTEMPTS} attempts: {last_error}"
        )))
    }
}
