//! Meeting-notes structuring and rendering
//!
//! `NotesBackend` turns a serialized transcript into the four-part
//! structured document (header/topics/action_items/metanotes);
//! `render_markdown` turns that document into the final Markdown notes.

mod document;
mod ollama;
mod render;

pub use document::{ActionItem, ActionItemGroup, NotesDocument, NotesHeader, Topic};
pub use ollama::{extract_json, OllamaNotes};
pub use render::render_markdown;

use anyhow::{bail, Result};

use crate::config::NotesConfig;

/// Structured notes plus the model's thinking text, when it returned one.
#[derive(Debug, Clone)]
pub struct StructuredNotes {
    pub document: NotesDocument,
    pub thinking: Option<String>,
}

/// Note structuring capability: serialized transcript text in, structured
/// document out. `release` frees whatever model the backend holds and is
/// called on every exit path of the notes phase.
#[async_trait::async_trait]
pub trait NotesBackend: Send + Sync {
    async fn structure(&self, transcript: &str) -> Result<StructuredNotes>;

    async fn release(&self) -> Result<()> {
        Ok(())
    }

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Creates a notes backend from configuration.
pub struct NotesBackendFactory;

impl NotesBackendFactory {
    pub fn create(config: &NotesConfig) -> Result<Box<dyn NotesBackend>> {
        match config.backend.as_str() {
            "ollama" => Ok(Box::new(OllamaNotes::new(config)?)),
            other => bail!("unknown notes backend: {}", other),
        }
    }
}
