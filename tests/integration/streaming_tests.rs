/*!
 * End-to-end tests for streaming aggregation into the pipeline
 *
 * A `StreamAggregator` drains into a `PipelineSink`, so these cover the full
 * streamed path: fragment accumulation, natural-break cutting, sequential
 * draining, translation, and ordered emission.
 */

use std::sync::Arc;

use parking_lot::Mutex;

use marktrans::providers::mock::MockTranslator;
use marktrans::{
    AggregatorConfig, Direction, MarkdownTranslator, PipelineConfig, PipelineSink,
    StreamAggregator,
};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn collecting_sink(
    mock: MockTranslator,
) -> (
    PipelineSink<MockTranslator, impl Fn(String) + Send + Sync>,
    Arc<Mutex<Vec<String>>>,
) {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let collected = Arc::clone(&emitted);
    let pipeline = MarkdownTranslator::new(Arc::new(mock), PipelineConfig::default());
    let sink = PipelineSink::new(pipeline, Direction::new("en", "ko"), move |text| {
        collected.lock().push(text);
    });
    (sink, emitted)
}

fn eager_config() -> AggregatorConfig {
    AggregatorConfig {
        min_chunk_len: 1,
        ..AggregatorConfig::default()
    }
}

#[tokio::test]
async fn test_streaming_withIdentityBackend_shouldEmitInputExactly() {
    init_logs();
    let (sink, emitted) = collecting_sink(MockTranslator::identity());
    let mut aggregator = StreamAggregator::new(sink, eager_config());

    let fragments = [
        "# Release no",
        "tes\n\nThe new ver",
        "sion ships **faster** parsing. ",
        "Install it with `cargo install`. ",
        "A closing remark",
    ];
    for fragment in &fragments {
        aggregator.add_chunk(fragment);
    }
    aggregator.flush().await.unwrap();

    assert_eq!(emitted.lock().concat(), fragments.concat());
}

#[tokio::test]
async fn test_streaming_withTaggingBackend_shouldKeepSourceOrder() {
    init_logs();
    let (sink, emitted) = collecting_sink(MockTranslator::tagging());
    let mut aggregator = StreamAggregator::new(sink, eager_config());

    aggregator.add_chunk("First part. ");
    aggregator.add_chunk("Second part. ");
    aggregator.add_chunk("Third part. ");
    aggregator.flush().await.unwrap();

    let chunks = emitted.lock().clone();
    assert_eq!(chunks.len(), 3);
    assert!(chunks[0].contains("First part."), "chunks: {:?}", chunks);
    assert!(chunks[1].contains("Second part."), "chunks: {:?}", chunks);
    assert!(chunks[2].contains("Third part."), "chunks: {:?}", chunks);
}

#[tokio::test]
async fn test_streaming_withOpenBoldSpan_shouldNotCutInsideIt() {
    init_logs();
    let (sink, emitted) = collecting_sink(MockTranslator::tagging());
    let mut aggregator = StreamAggregator::new(sink, eager_config());

    // The first fragment ends with sentence punctuation but an open bold
    // span; nothing may be emitted until the span closes.
    aggregator.add_chunk("Call **methodOne().");
    assert!(emitted.lock().is_empty());
    aggregator.add_chunk("** afterwards. ");
    aggregator.flush().await.unwrap();

    let output = emitted.lock().concat();
    assert!(output.contains("**[T]methodOne().**"), "output: {}", output);
    assert!(!output.contains("****"), "output: {}", output);
}

#[tokio::test]
async fn test_streaming_withDefaultMinSize_shouldHoldShortTextUntilFlush() {
    init_logs();
    let (sink, emitted) = collecting_sink(MockTranslator::identity());
    let mut aggregator = StreamAggregator::new(sink, AggregatorConfig::default());

    aggregator.add_chunk("Too short to dispatch. ");
    assert!(emitted.lock().is_empty());
    aggregator.flush().await.unwrap();

    assert_eq!(emitted.lock().clone(), vec!["Too short to dispatch. ".to_string()]);
}

#[tokio::test]
async fn test_streaming_withCodeFence_shouldTranslateProseOnly() {
    init_logs();
    let (sink, emitted) = collecting_sink(MockTranslator::tagging());
    let mut aggregator = StreamAggregator::new(sink, eager_config());

    aggregator.add_chunk("Build the project. \n\n```sh\ncargo build --release\n```\n");
    aggregator.flush().await.unwrap();

    let output = emitted.lock().concat();
    assert!(output.contains("[T]Build the project."), "output: {}", output);
    assert!(
        output.contains("```sh\ncargo build --release\n```"),
        "output: {}",
        output
    );
}
