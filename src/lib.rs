/*!
 * # marktrans - Markdown-preserving round-trip translation
 *
 * A Rust library for translating markdown-formatted text through an opaque
 * external translation backend while preserving syntax, whitespace, and
 * document structure exactly.
 *
 * ## Features
 *
 * - Structural segmentation (paragraphs, code fences, tables, lists, headings)
 * - Inline tokenization (text, bold, italic, links, inline code)
 * - Addressable translation units; inline code is never sent to translation
 * - Pipe-separated batching with misalignment recovery that never loses content
 * - Exact reconstruction: identity translation returns the input unchanged
 * - Streaming natural-break aggregation with ordered, single-flight draining
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `config`: Pipeline, batching, and aggregator configuration
 * - `segmenter`: Structural decomposition of raw text into segments
 * - `tokenizer`: Inline tokenization of segment content
 * - `units`: Translation unit extraction and addressing
 * - `batch`: Batched translation and misalignment recovery
 * - `reconstructor`: Reassembly of translated units into final text
 * - `pipeline`: The end-to-end translation service
 * - `aggregator`: Streaming natural-break aggregation
 * - `providers`: The `Translator` seam and mock backends for testing
 * - `errors`: Custom error types for the pipeline
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod aggregator;
pub mod batch;
pub mod config;
pub mod errors;
pub mod pipeline;
pub mod providers;
pub mod reconstructor;
pub mod segmenter;
pub mod tokenizer;
pub mod units;

// Re-export main types for easier usage
pub use aggregator::{has_natural_break, split_at_last_break, ChunkSink, StreamAggregator};
pub use batch::BatchTranslator;
pub use config::{AggregatorConfig, BatchPolicy, PipelineConfig};
pub use errors::{AggregatorError, PipelineError, TranslatorError};
pub use pipeline::{MarkdownTranslator, PipelineSink};
pub use providers::{Direction, Translator};
pub use segmenter::{segment, Segment, SegmentKind};
pub use tokenizer::{tokenize, Token, TokenKind};
pub use units::{extract_units, TranslatedUnits, TranslationUnit, UnitAddress};
