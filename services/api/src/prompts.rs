//! services/api/src/prompts.rs
//!
//! Loads the per-language analysis prompt templates from disk at startup.
//! The library is constructed explicitly and handed to whoever needs it
//! through `AppState`; there is no process-wide singleton.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lingua_core::domain::Language;

/// A failure while loading the prompt templates.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("Missing prompt template for {language}: {path}")]
    MissingTemplate { language: Language, path: PathBuf },
    #[error("Failed to read prompt template {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The per-language prompt templates, loaded once at startup.
pub struct PromptLibrary {
    templates: HashMap<Language, String>,
}

impl PromptLibrary {
    /// Reads `<language>_prompt.txt` for every supported language from
    /// `dir`. A missing file fails the whole load so the gap is caught at
    /// startup rather than on the first analysis request.
    pub fn load(dir: &Path) -> Result<Self, PromptError> {
        let mut templates = HashMap::new();
        for language in Language::ALL {
            let path = dir.join(format!("{language}_prompt.txt"));
            if !path.exists() {
                return Err(PromptError::MissingTemplate { language, path });
            }
            let template = std::fs::read_to_string(&path)
                .map_err(|source| PromptError::Unreadable { path, source })?;
            templates.insert(language, template);
        }
        Ok(Self { templates })
    }

    /// Substitutes the sentence into the template for `language`.
    pub fn render(&self, language: Language, sentence: &str) -> String {
        self.templates[&language].replace("{sentence}", sentence)
    }
}
