/*!
 * Translator seam for the external translation operation.
 *
 * The concrete translation backends (LLM or MT HTTP clients) live outside
 * this crate; the pipeline only depends on the `Translator` trait. Backends
 * are expected to accept UTF-8 text, best-effort preserve a single literal
 * pipe used as batch separator, and fail by rejection. Retry and backoff are
 * the backend's own concern.
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::errors::TranslatorError;

/// Translation direction as a source/target language pair
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Direction {
    /// Source language code
    pub source: String,

    /// Target language code
    pub target: String,
}

impl Direction {
    /// Create a new direction from language codes
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.source, self.target)
    }
}

/// Common trait for all translation backends
///
/// This trait defines the interface that all backend implementations must
/// follow, allowing them to be used interchangeably in the pipeline.
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Translate a piece of text in the given direction
    ///
    /// # Arguments
    /// * `text` - The text to translate, possibly several units joined by the batch separator
    /// * `direction` - Source and target languages
    ///
    /// # Returns
    /// * `Result<String, TranslatorError>` - The translated text or a transport error
    async fn translate(&self, text: &str, direction: &Direction) -> Result<String, TranslatorError>;
}

pub mod mock;
