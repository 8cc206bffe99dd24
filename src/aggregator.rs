/*!
 * Streaming natural-break aggregation.
 *
 * As text arrives in fragments, the aggregator accumulates a buffer and cuts
 * it at natural breaks: points where translating the prefix independently
 * cannot split a word, a sentence, or an open markdown span. Among all break
 * candidates the rightmost balanced one wins, and a cut is only taken once
 * the chunk meets a minimum size, trading latency for fewer translation
 * calls.
 *
 * Finalized chunks go through a FIFO queue drained by a single sequential
 * worker at concurrency 1; that single-in-flight discipline is what keeps
 * emitted output in source order despite variable per-chunk translation
 * latency. `flush()` enqueues whatever remains, then blocks until the queue
 * and worker are idle or the timeout elapses. State lives for one streamed
 * response and is discarded after flush.
 */

use async_trait::async_trait;
use log::{debug, error};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::config::AggregatorConfig;
use crate::errors::AggregatorError;

/// List-item start inside the buffer: bullet, plus, or numbered marker right
/// after a newline
static LIST_START_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n([-*+]|\d+\.) ").unwrap());

/// Consumer of finalized chunks, typically translate-and-emit
#[async_trait]
pub trait ChunkSink: Send + Sync {
    /// Process one finalized chunk. Called sequentially, in source order.
    async fn process(&self, chunk: String);
}

/// Count markdown markers over `text` and report whether every span is
/// closed: paired `**` and `__` markers, paired single stars and emphasis
/// underscores outside them, paired backticks, and matching bracket counts.
/// A word-internal underscore (alphanumeric on both sides) is identifier
/// punctuation, not an emphasis marker.
pub fn is_markdown_balanced(text: &str) -> bool {
    let mut bold_markers = 0usize;
    let mut single_stars = 0usize;
    let mut bold_underscores = 0usize;
    let mut single_underscores = 0usize;
    let mut backticks = 0usize;
    let mut open_brackets = 0usize;
    let mut close_brackets = 0usize;

    let mut prev: Option<char> = None;
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    bold_markers += 1;
                } else {
                    single_stars += 1;
                }
            }
            '_' => {
                if chars.peek() == Some(&'_') {
                    chars.next();
                    bold_underscores += 1;
                } else {
                    let word_internal = prev.is_some_and(char::is_alphanumeric)
                        && chars.peek().copied().is_some_and(char::is_alphanumeric);
                    if !word_internal {
                        single_underscores += 1;
                    }
                }
            }
            '`' => backticks += 1,
            '[' => open_brackets += 1,
            ']' => close_brackets += 1,
            _ => {}
        }
        prev = Some(ch);
    }

    bold_markers % 2 == 0
        && single_stars % 2 == 0
        && bold_underscores % 2 == 0
        && single_underscores % 2 == 0
        && backticks % 2 == 0
        && open_brackets == close_brackets
}

/// Trailing sentence punctuation, allowing markdown closing markers after it
fn ends_with_sentence_close(trimmed: &str) -> bool {
    let mut rest = trimmed;
    loop {
        if rest.ends_with("**") {
            rest = &rest[..rest.len() - 2];
        } else if rest.ends_with('*') || rest.ends_with('`') || rest.ends_with('_') {
            rest = &rest[..rest.len() - 1];
        } else {
            break;
        }
    }
    rest.ends_with(['.', '!', '?'])
}

fn ends_with_closed_fence(trimmed: &str) -> bool {
    (trimmed.ends_with("```") && trimmed.matches("```").count() % 2 == 0)
        || (trimmed.ends_with("~~~") && trimmed.matches("~~~").count() % 2 == 0)
}

/// Whether the buffer currently ends at a natural break
pub fn has_natural_break(text: &str) -> bool {
    let trimmed = text.trim_end();
    if trimmed.is_empty() {
        return false;
    }
    if ends_with_sentence_close(trimmed) && is_markdown_balanced(text) {
        return true;
    }
    if text.ends_with("\n\n") {
        return true;
    }
    if trimmed.ends_with('|') && trimmed.contains('|') {
        return true;
    }
    if LIST_START_REGEX.is_match(text) {
        return true;
    }
    ends_with_closed_fence(trimmed)
}

/// Split the buffer at the rightmost balanced break candidate. Returns the
/// finalized chunk and the remaining buffer; the chunk is empty when no
/// balanced candidate exists.
pub fn split_at_last_break(text: &str) -> (String, String) {
    let mut best = 0usize;

    let consider = |end: usize, best: &mut usize| {
        if end > *best && is_markdown_balanced(&text[..end]) {
            *best = end;
        }
    };

    // Sentence punctuation, extended over closing markers and whitespace.
    for (i, ch) in text.char_indices() {
        if matches!(ch, '.' | '!' | '?') {
            let mut j = i + ch.len_utf8();
            loop {
                let rest = &text[j..];
                if rest.starts_with("**") {
                    j += 2;
                } else if rest.starts_with('*') || rest.starts_with('`') || rest.starts_with('_') {
                    j += 1;
                } else {
                    break;
                }
            }
            while text[j..].starts_with([' ', '\t', '\n']) {
                j += text[j..].chars().next().map_or(0, char::len_utf8);
            }
            consider(j, &mut best);
        }
    }

    // Paragraph breaks.
    let mut search = 0;
    while let Some(pos) = text[search..].find("\n\n") {
        consider(search + pos + 2, &mut best);
        search += pos + 1;
    }

    // Terminated table rows: a newline whose line ends with a pipe.
    for (i, ch) in text.char_indices() {
        if ch == '\n' {
            let line_start = text[..i].rfind('\n').map_or(0, |p| p + 1);
            let row = text[line_start..i].trim_end();
            if row.ends_with('|') && row.len() > 1 {
                consider(i + 1, &mut best);
            }
        }
    }

    // List-item starts: cut right after the newline, before the marker.
    for m in LIST_START_REGEX.find_iter(text) {
        consider(m.start() + 1, &mut best);
    }

    // Closed code fences.
    for marker in ["```", "~~~"] {
        let mut search = 0;
        while let Some(pos) = text[search..].find(marker) {
            let end = search + pos + marker.len();
            if text[..end].matches(marker).count() % 2 == 0 {
                let mut j = end;
                if text[j..].starts_with('\n') {
                    j += 1;
                }
                consider(j, &mut best);
            }
            search = end;
        }
    }

    (text[..best].to_string(), text[best..].to_string())
}

/// Aggregates streamed fragments into break-safe chunks and drains them
/// through a single sequential worker
pub struct StreamAggregator {
    /// Untranslated tail of the stream
    buffer: String,
    /// Chunk texts already sent to the worker, for the duplicate guard
    dispatched: HashSet<String>,
    /// Queue into the drain worker
    tx: mpsc::UnboundedSender<String>,
    /// Chunks enqueued but not yet fully processed
    pending: Arc<AtomicUsize>,
    /// Aggregation thresholds
    config: AggregatorConfig,
}

impl StreamAggregator {
    /// Create an aggregator draining into `sink`. Spawns the worker task;
    /// must be called inside a tokio runtime.
    pub fn new<S>(sink: S, config: AggregatorConfig) -> Self
    where
        S: ChunkSink + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let pending = Arc::new(AtomicUsize::new(0));
        let worker_pending = Arc::clone(&pending);

        tokio::spawn(async move {
            while let Some(chunk) = rx.recv().await {
                sink.process(chunk).await;
                worker_pending.fetch_sub(1, Ordering::SeqCst);
            }
        });

        Self {
            buffer: String::new(),
            dispatched: HashSet::new(),
            tx,
            pending,
            config,
        }
    }

    /// Append a streamed fragment and cut the buffer if it now ends at a
    /// natural break and the chunk is large enough
    pub fn add_chunk(&mut self, fragment: &str) {
        self.buffer.push_str(fragment);
        if !has_natural_break(&self.buffer) {
            return;
        }
        let (chunk, rest) = split_at_last_break(&self.buffer);
        if chunk.is_empty() || chunk.len() < self.config.min_chunk_len {
            return;
        }
        self.buffer = rest;
        self.enqueue(chunk);
    }

    fn enqueue(&mut self, chunk: String) {
        if self.dispatched.contains(&chunk) {
            debug!("Rejecting duplicate chunk ({} bytes)", chunk.len());
            return;
        }
        self.dispatched.insert(chunk.clone());
        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(chunk).is_err() {
            // Worker gone; nothing will drain this.
            self.pending.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Enqueue any remaining buffer unconditionally, then block until the
    /// queue and worker are idle or the timeout is exceeded
    pub async fn flush(&mut self) -> Result<(), AggregatorError> {
        if !self.buffer.is_empty() {
            let tail = std::mem::take(&mut self.buffer);
            self.enqueue(tail);
        }

        let deadline = Instant::now() + self.config.flush_timeout();
        while self.pending.load(Ordering::SeqCst) > 0 {
            if Instant::now() >= deadline {
                error!(
                    "Flush timed out with {} chunks pending",
                    self.pending.load(Ordering::SeqCst)
                );
                return Err(AggregatorError::FlushTimeout(self.config.flush_timeout()));
            }
            tokio::time::sleep(self.config.poll_interval()).await;
        }
        Ok(())
    }
}
