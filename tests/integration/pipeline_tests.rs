/*!
 * End-to-end tests for the translation pipeline
 *
 * These exercise the full chain: segmenter, tokenizer, unit extraction,
 * batch translation with recovery, and reconstruction.
 */

use std::sync::Arc;

use marktrans::providers::mock::MockTranslator;
use marktrans::units::extract_units;
use marktrans::{segment, Direction, MarkdownTranslator, PipelineConfig, TokenKind};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn pipeline(mock: MockTranslator) -> MarkdownTranslator<MockTranslator> {
    MarkdownTranslator::new(Arc::new(mock), PipelineConfig::default())
}

#[tokio::test]
async fn test_pipeline_withIdentityBackend_shouldReturnInputUnchanged() {
    init_logs();
    let translator = pipeline(MockTranslator::identity());
    let direction = Direction::new("en", "ko");

    for input in [
        "Hello **world** and **universe**",
        "# Heading\n\nA paragraph with *emphasis*, `code`, and a [link](https://example.com).\n\n- alpha\n- beta\n\n| col1 | col2 |\n| ---- | ---- |\n\n```sh\nls -la\n```\n",
        "> a quote stays untouched\n\nplain closing line",
    ] {
        let output = translator.translate(input, &direction).await;
        assert_eq!(output, input);
    }
}

#[tokio::test]
async fn test_pipeline_withTaggingBackend_shouldIsolateBoldSpans() {
    init_logs();
    let translator = pipeline(MockTranslator::tagging());
    let direction = Direction::new("en", "ko");

    let output = translator
        .translate("Use **method1()** and **method2()** functions", &direction)
        .await;

    assert!(output.contains("**[T]method1()**"), "output: {}", output);
    assert!(output.contains("**[T]method2()**"), "output: {}", output);
    assert!(!output.contains("****"), "output: {}", output);
}

#[tokio::test]
async fn test_pipeline_withInlineCode_shouldPassCodeThroughVerbatim() {
    init_logs();
    let input = "Use `console.log()` to **debug** your code";

    let units = extract_units(&segment(input));
    assert!(units.iter().all(|u| u.kind != TokenKind::InlineCode));

    let translator = pipeline(MockTranslator::tagging());
    let output = translator.translate(input, &Direction::new("en", "ko")).await;

    assert!(output.contains("`console.log()`"), "output: {}", output);
    assert!(output.contains("**[T]debug**"), "output: {}", output);
}

#[tokio::test]
async fn test_pipeline_withPipeDroppingBackend_shouldDegradeGracefully() {
    init_logs();
    let translator = pipeline(MockTranslator::merging());
    let direction = Direction::new("en", "ko");

    // Three units in one paragraph; the backend loses both separators.
    let input = "start **middle** end";
    let output = translator.translate(input, &direction).await;

    // Content is never lost: the merged result lands on the first unit and
    // the rest fall back to source text.
    assert!(output.contains("start"));
    assert!(output.contains("**middle**"));
    assert!(output.contains("end"));
}

#[tokio::test]
async fn test_pipeline_withTaggingBackend_shouldPreserveStructure() {
    init_logs();
    let translator = pipeline(MockTranslator::tagging());
    let direction = Direction::new("en", "ko");

    let input = "## Setup\n\nInstall the tool.\n\n- first step\n- second step\n\n```sh\ncargo build\n```\n";
    let output = translator.translate(input, &direction).await;

    assert!(output.starts_with("## "), "heading marker kept: {}", output);
    assert!(output.contains("\n- "), "list markers kept: {}", output);
    assert!(output.contains("```sh\ncargo build\n```"), "code kept: {}", output);
    assert!(output.ends_with('\n'), "trailing newline kept");
    assert!(output.contains("[T]Install the tool."));
}

#[tokio::test]
async fn test_pipeline_withLinks_shouldKeepOriginalUrls() {
    init_logs();
    let translator = pipeline(MockTranslator::tagging());
    let direction = Direction::new("en", "ko");

    let output = translator
        .translate("read the [manual](https://example.com/manual) first", &direction)
        .await;

    assert!(output.contains("[[T]manual](https://example.com/manual)"), "output: {}", output);
}

#[tokio::test]
async fn test_pipeline_withLiteralPipes_shouldRoundTrip() {
    init_logs();
    let translator = pipeline(MockTranslator::identity());
    let direction = Direction::new("en", "ko");

    // A pipe in prose and an escaped pipe inside a table cell are content,
    // not batch separators.
    for input in ["choose either | or neither", r"| a \| b | c |"] {
        let output = translator.translate(input, &direction).await;
        assert_eq!(output, input);
    }
}

#[tokio::test]
async fn test_pipeline_withTable_shouldTranslateCellsInPlace() {
    init_logs();
    let translator = pipeline(MockTranslator::identity());
    let direction = Direction::new("en", "ko");

    let input = "| name | role |\n| alice | admin |";
    let output = translator.translate(input, &direction).await;
    assert_eq!(output, input);
}
