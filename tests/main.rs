/*!
 * Main test entry point for the marktrans test suite
 */

// Import integration tests
mod integration {
    // End-to-end pipeline round-trip and recovery tests
    pub mod pipeline_tests;

    // Streaming aggregation into the pipeline
    pub mod streaming_tests;
}
