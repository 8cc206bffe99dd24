/*!
 * Mock translator implementations for testing.
 *
 * This module provides mock backends that simulate the external vendor's
 * behaviors, including its known failure modes:
 * - `MockTranslator::identity()` - returns the input unchanged
 * - `MockTranslator::tagging()` - tags every pipe-part with `[T]`
 * - `MockTranslator::merging()` - loses the pipe separators (under-split)
 * - `MockTranslator::failing()` - always fails with an error
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::aggregator::ChunkSink;
use crate::errors::TranslatorError;
use crate::providers::{Direction, Translator};

/// Behavior mode for the mock translator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Returns the input unchanged
    Identity,
    /// Prefixes every pipe-separated part with `[T]`
    Tagging,
    /// Replaces every pipe with a space, merging all parts into one
    Merging,
    /// Always fails with an error
    Failing,
}

/// Mock translator for exercising batch alignment and recovery
#[derive(Debug)]
pub struct MockTranslator {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of translate calls made so far
    request_count: Arc<AtomicUsize>,
    /// Custom response generator (overrides the behavior mode)
    custom_response: Option<fn(&str) -> String>,
}

impl MockTranslator {
    /// Create a new mock translator with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            custom_response: None,
        }
    }

    /// Create a mock that returns its input unchanged
    pub fn identity() -> Self {
        Self::new(MockBehavior::Identity)
    }

    /// Create a mock that tags every pipe-part with `[T]`
    pub fn tagging() -> Self {
        Self::new(MockBehavior::Tagging)
    }

    /// Create a mock that merges all parts into one (loses separators)
    pub fn merging() -> Self {
        Self::new(MockBehavior::Merging)
    }

    /// Create a mock that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock driven by a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of translate calls received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }
}

impl Clone for MockTranslator {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, _direction: &Direction) -> Result<String, TranslatorError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);

        if let Some(generator) = self.custom_response {
            return Ok(generator(text));
        }

        match self.behavior {
            MockBehavior::Identity => Ok(text.to_string()),

            MockBehavior::Tagging => Ok(text
                .split('|')
                .map(|part| format!("[T]{}", part))
                .collect::<Vec<_>>()
                .join("|")),

            MockBehavior::Merging => Ok(text.replace('|', " ")),

            MockBehavior::Failing => Err(TranslatorError::RequestFailed(
                "Simulated backend failure".to_string(),
            )),
        }
    }
}

/// Chunk sink that records every chunk it receives, for aggregator tests
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    chunks: Arc<Mutex<Vec<String>>>,
}

impl CollectingSink {
    /// Create an empty collecting sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Chunks received so far, in dispatch order
    pub fn chunks(&self) -> Vec<String> {
        self.chunks.lock().clone()
    }
}

#[async_trait]
impl ChunkSink for CollectingSink {
    async fn process(&self, chunk: String) {
        self.chunks.lock().push(chunk);
    }
}
