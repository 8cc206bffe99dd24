/*!
 * Translation unit extraction.
 *
 * This module flattens a segment list into addressable translation units, the
 * smallest pieces of translatable text. Code blocks, empty segments,
 * horizontal rules, blockquotes, and task-list items are skipped entirely;
 * inline-code tokens never yield units and pass through verbatim.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::segmenter::{Segment, SegmentKind};
use crate::tokenizer::{tokenize, Token, TokenKind};

/// Horizontal rule: three or more repeats of one of `-`, `*`, or `_`,
/// optionally spaced. One alternation branch per rule character; mixing
/// characters is not a rule.
static HORIZONTAL_RULE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}(-( *-){2,}|\*( *\*){2,}|_( *_){2,}) *$").unwrap());

/// Unique address of a translation unit within a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitAddress {
    /// Index of the parent segment
    pub segment: usize,
    /// Inner line index for multi-line segments; None for single-line ones
    pub line: Option<usize>,
    /// Token index within the tokenized content
    pub token: usize,
}

/// The smallest addressable piece of translatable text
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    /// Unique address, stable across extraction and reconstruction
    pub address: UnitAddress,
    /// Inline kind of the originating token
    pub kind: TokenKind,
    /// Source text sent to the translator (inner text, wrappers stripped)
    pub source: String,
}

/// Address to translated text; missing addresses default to source text
pub type TranslatedUnits = HashMap<UnitAddress, String>;

/// Whether a segment participates in translation at all
pub fn is_translatable(segment: &Segment) -> bool {
    match segment.kind {
        SegmentKind::Code => false,
        SegmentKind::Heading => !segment.content.trim().is_empty(),
        SegmentKind::Text => {
            if segment.prefix.trim_start().starts_with('>') {
                return false;
            }
            let content = segment.content.trim();
            !content.is_empty() && !HORIZONTAL_RULE_REGEX.is_match(&segment.content)
        }
        SegmentKind::List => {
            // Spaced horizontal rules like "- - -" parse as one-line lists.
            if segment.lines.len() == 1 && HORIZONTAL_RULE_REGEX.is_match(&segment.render()) {
                return false;
            }
            let has_content = segment.lines.iter().any(|l| !l.content.trim().is_empty());
            let is_task_list = segment.lines.iter().any(|l| is_task_marker(&l.prefix));
            has_content && !is_task_list
        }
        SegmentKind::Table => segment.lines.iter().any(|l| !l.content.trim().is_empty()),
    }
}

fn is_task_marker(prefix: &str) -> bool {
    prefix.contains("[ ]") || prefix.contains("[x]") || prefix.contains("[X]")
}

/// Whether a token yields a translation unit
fn is_translatable_token(token: &Token) -> bool {
    token.kind != TokenKind::InlineCode && !token.inner.trim().is_empty()
}

fn push_units(
    units: &mut Vec<TranslationUnit>,
    tokens: &[Token],
    segment: usize,
    line: Option<usize>,
) {
    for (token_index, token) in tokens.iter().enumerate() {
        if is_translatable_token(token) {
            units.push(TranslationUnit {
                address: UnitAddress { segment, line, token: token_index },
                kind: token.kind,
                source: token.inner.clone(),
            });
        }
    }
}

/// Flatten a segment list into ordered translation units
pub fn extract_units(segments: &[Segment]) -> Vec<TranslationUnit> {
    let mut units = Vec::new();
    for (segment_index, segment) in segments.iter().enumerate() {
        if !is_translatable(segment) {
            continue;
        }
        match segment.kind {
            SegmentKind::List | SegmentKind::Table => {
                for (line_index, line) in segment.lines.iter().enumerate() {
                    let tokens = tokenize(&line.content);
                    push_units(&mut units, &tokens, segment_index, Some(line_index));
                }
            }
            _ => {
                let tokens = tokenize(&segment.content);
                push_units(&mut units, &tokens, segment_index, None);
            }
        }
    }
    units
}
