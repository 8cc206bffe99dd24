/*!
 * The markdown translation pipeline.
 *
 * `MarkdownTranslator` ties the stages together: segment, tokenize, extract
 * units, batch-translate, reconstruct, repair. The whole call is total: a
 * failing backend degrades to untranslated fragments, never to an error or
 * lost content.
 */

use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

use crate::aggregator::ChunkSink;
use crate::batch::BatchTranslator;
use crate::config::PipelineConfig;
use crate::providers::{Direction, Translator};
use crate::reconstructor::{normalize_inline_bullets, reconstruct, strip_legacy_placeholders};
use crate::segmenter::segment;
use crate::units::extract_units;

/// Markdown-preserving translation service
#[derive(Debug)]
pub struct MarkdownTranslator<T: Translator + ?Sized> {
    /// The external translation backend
    translator: Arc<T>,

    /// Pipeline configuration
    config: PipelineConfig,
}

impl<T: Translator + ?Sized> Clone for MarkdownTranslator<T> {
    fn clone(&self) -> Self {
        Self {
            translator: Arc::clone(&self.translator),
            config: self.config.clone(),
        }
    }
}

impl<T: Translator + ?Sized> MarkdownTranslator<T> {
    /// Create a new pipeline around a translation backend
    pub fn new(translator: Arc<T>, config: PipelineConfig) -> Self {
        Self { translator, config }
    }

    /// Translate markdown text, preserving syntax, whitespace, and
    /// structure. All pipeline state is scoped to this call.
    pub async fn translate(&self, text: &str, direction: &Direction) -> String {
        let segments = segment(text);
        let units = extract_units(&segments);
        debug!(
            "Translating {} units across {} segments ({})",
            units.len(),
            segments.len(),
            direction
        );

        let batch = BatchTranslator::new(Arc::clone(&self.translator), self.config.batch.clone());
        let translated = batch.translate_units(&units, direction).await;

        let rebuilt = reconstruct(&segments, &translated);
        strip_legacy_placeholders(&normalize_inline_bullets(&rebuilt))
    }
}

/// Chunk sink that runs every streamed chunk through the pipeline and hands
/// the translated text to a caller-supplied emit callback
pub struct PipelineSink<T, F>
where
    T: Translator + ?Sized,
    F: Fn(String) + Send + Sync,
{
    pipeline: MarkdownTranslator<T>,
    direction: Direction,
    emit: F,
}

impl<T, F> PipelineSink<T, F>
where
    T: Translator + ?Sized,
    F: Fn(String) + Send + Sync,
{
    /// Create a sink that translates chunks in `direction` and emits results
    pub fn new(pipeline: MarkdownTranslator<T>, direction: Direction, emit: F) -> Self {
        Self { pipeline, direction, emit }
    }
}

#[async_trait]
impl<T, F> ChunkSink for PipelineSink<T, F>
where
    T: Translator + ?Sized,
    F: Fn(String) + Send + Sync,
{
    async fn process(&self, chunk: String) {
        let translated = self.pipeline.translate(&chunk, &self.direction).await;
        (self.emit)(translated);
    }
}
