/*!
 * Error types for the marktrans pipeline.
 *
 * This module contains custom error types for different parts of the pipeline,
 * using the thiserror crate for ergonomic error definitions.
 *
 * Propagation policy: structural parsing is total and never fails, batch
 * misalignment is recovered in place, and transport failures degrade a
 * sub-batch to its source text. The aggregator's flush timeout is the only
 * error surfaced to callers.
 */

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling the external translate operation
#[derive(Error, Debug)]
pub enum TranslatorError {
    /// Error when the translation request fails
    #[error("Translation request failed: {0}")]
    RequestFailed(String),

    /// Error when the backend returns a response that cannot be used
    #[error("Invalid translation response: {0}")]
    InvalidResponse(String),

    /// Error when the backend does not answer in time
    #[error("Translation request timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors that can occur in the streaming aggregator
#[derive(Error, Debug)]
pub enum AggregatorError {
    /// The flush barrier could not drain the queue within the allowed budget
    #[error("Flush did not drain within {0:?}")]
    FlushTimeout(Duration),
}

/// Main pipeline error type that wraps all other errors
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Error from the external translator
    #[error("Translator error: {0}")]
    Translator(#[from] TranslatorError),

    /// Error from the streaming aggregator
    #[error("Aggregator error: {0}")]
    Aggregator(#[from] AggregatorError),

    /// Error in pipeline configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<anyhow::Error> for PipelineError {
    fn from(error: anyhow::Error) -> Self {
        Self::Config(error.to_string())
    }
}
