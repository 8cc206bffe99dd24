/*!
 * Structural segmentation of markdown text.
 *
 * This module decomposes raw text into ordered segments (paragraph, code
 * fence, table, list, heading) with a line-oriented state machine. The
 * segmenter is total: no input fails, every line lands in exactly one
 * segment. Rendering all segments back and joining them with `\n`
 * reproduces the input byte-for-byte.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// ATX heading marker, `#` through `######` followed by a space
static HEADING_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6} )(.*)$").unwrap());

/// Task-checkbox list marker, checked before the plain bullet form
static TASK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*[-*+] \[[ xX]\] )(.*)$").unwrap());

/// Bullet list marker
static BULLET_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*[-*+] )(.*)$").unwrap());

/// Numbered list marker
static NUMBERED_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*\d+\. )(.*)$").unwrap());

/// Blockquote prefix
static BLOCKQUOTE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*>+ ?)(.*)$").unwrap());

/// Structural classification of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Paragraph, blank line, or blockquote run
    Text,
    /// Fenced code block, fences included
    Code,
    /// ATX heading line
    Heading,
    /// Run of list items sharing one marker kind
    List,
    /// Run of table rows
    Table,
}

/// One inner line of a multi-line segment, with the markers needed to
/// reproduce the original punctuation on reconstruction
#[derive(Debug, Clone)]
pub struct SegmentLine {
    /// Literal marker text before the content (list marker, leading pipe)
    pub prefix: String,
    /// Inner content without the markers
    pub content: String,
    /// Literal text after the content (trailing pipe for table rows)
    pub suffix: String,
}

/// A structurally classified contiguous block of the input
#[derive(Debug, Clone)]
pub struct Segment {
    /// Structural classification
    pub kind: SegmentKind,
    /// Block-level prefix: heading marker or shared blockquote prefix
    pub prefix: String,
    /// Content for single-block segments; may span multiple logical lines
    pub content: String,
    /// Inner lines for list and table segments; empty otherwise
    pub lines: Vec<SegmentLine>,
}

impl Segment {
    fn text(content: String) -> Self {
        Self { kind: SegmentKind::Text, prefix: String::new(), content, lines: Vec::new() }
    }

    fn code(content: String) -> Self {
        Self { kind: SegmentKind::Code, prefix: String::new(), content, lines: Vec::new() }
    }

    /// Render this segment back to its exact source text
    pub fn render(&self) -> String {
        match self.kind {
            SegmentKind::Code => self.content.clone(),
            SegmentKind::Heading => format!("{}{}", self.prefix, self.content),
            SegmentKind::Text => {
                if self.prefix.is_empty() {
                    self.content.clone()
                } else {
                    self.content
                        .split('\n')
                        .map(|line| format!("{}{}", self.prefix, line))
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            SegmentKind::List => self
                .lines
                .iter()
                .map(|line| format!("{}{}", line.prefix, line.content))
                .collect::<Vec<_>>()
                .join("\n"),
            // Table lines are cells; pipes and row breaks live in the
            // prefixes and suffixes, so a plain concat restores the rows.
            SegmentKind::Table => self
                .lines
                .iter()
                .map(|line| format!("{}{}{}", line.prefix, line.content, line.suffix))
                .collect::<String>(),
        }
    }
}

/// Render a segment list back to a full document
pub fn render_segments(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(Segment::render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Marker family of a list line; a change of family ends the current list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListMarker {
    Bullet,
    Numbered,
    Task,
}

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

fn split_heading(line: &str) -> Option<(String, String)> {
    HEADING_REGEX
        .captures(line)
        .map(|c| (c[1].to_string(), c[2].to_string()))
}

fn split_blockquote(line: &str) -> Option<(String, String)> {
    BLOCKQUOTE_REGEX
        .captures(line)
        .map(|c| (c[1].to_string(), c[2].to_string()))
}

fn split_list_item(line: &str) -> Option<(ListMarker, String, String)> {
    if let Some(c) = TASK_REGEX.captures(line) {
        return Some((ListMarker::Task, c[1].to_string(), c[2].to_string()));
    }
    if let Some(c) = BULLET_REGEX.captures(line) {
        return Some((ListMarker::Bullet, c[1].to_string(), c[2].to_string()));
    }
    if let Some(c) = NUMBERED_REGEX.captures(line) {
        return Some((ListMarker::Numbered, c[1].to_string(), c[2].to_string()));
    }
    None
}

/// A continuation line keeps the current list item open instead of ending
/// the list
fn is_list_continuation(line: &str) -> bool {
    line.starts_with("  ") && !line.trim().is_empty()
}

/// Split a table row into leading pipe, inner text, and trailing pipe.
/// Returns None when the line is not a table row.
fn split_table_row(line: &str) -> Option<SegmentLine> {
    let first = line.find('|')?;
    if !line[..first].trim().is_empty() {
        return None;
    }

    // Walk the row honoring a single backslash-escape lookahead, so an
    // escaped pipe never terminates the row.
    let mut last_unescaped = None;
    let mut chars = line.char_indices().peekable();
    while let Some((pos, ch)) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            '|' => last_unescaped = Some(pos),
            _ => {}
        }
    }

    let last = last_unescaped?;
    if last == first {
        return None;
    }
    if !line[last + 1..].trim().is_empty() {
        return None;
    }

    Some(SegmentLine {
        prefix: line[..=first].to_string(),
        content: line[first + 1..last].to_string(),
        suffix: line[last..].to_string(),
    })
}

/// Split a table row's inner text into cells on unescaped pipes
pub fn parse_row_cells(inner: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                current.push(ch);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '|' => {
                cells.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    cells.push(current);
    cells
}

/// Explode one table row into per-cell segment lines. The row's leading
/// pipe (with the newline for rows after the first), the inner pipes, and
/// the trailing pipe are stored as cell prefixes and suffixes so that
/// concatenating them restores the row exactly.
fn push_row_cells(out: &mut Vec<SegmentLine>, row: &SegmentLine, first_row: bool) {
    let cells = parse_row_cells(&row.content);
    let last = cells.len() - 1;
    for (ci, cell) in cells.into_iter().enumerate() {
        let prefix = if ci == 0 {
            if first_row {
                row.prefix.clone()
            } else {
                format!("\n{}", row.prefix)
            }
        } else {
            "|".to_string()
        };
        let suffix = if ci == last {
            row.suffix.clone()
        } else {
            String::new()
        };
        out.push(SegmentLine { prefix, content: cell, suffix });
    }
}

fn flush_paragraph(segments: &mut Vec<Segment>, paragraph: &mut Vec<String>) {
    if !paragraph.is_empty() {
        segments.push(Segment::text(paragraph.join("\n")));
        paragraph.clear();
    }
}

/// Decompose raw text into ordered segments. Total: no input fails.
pub fn segment(text: &str) -> Vec<Segment> {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut segments = Vec::new();
    let mut paragraph: Vec<String> = Vec::new();
    let mut idx = 0;

    while idx < lines.len() {
        let line = lines[idx];

        if is_fence(line) {
            flush_paragraph(&mut segments, &mut paragraph);
            // An unterminated fence still yields a code segment holding
            // everything from the opening fence to end of input.
            let mut code_lines = vec![line];
            idx += 1;
            while idx < lines.len() {
                code_lines.push(lines[idx]);
                let closing = is_fence(lines[idx]);
                idx += 1;
                if closing {
                    break;
                }
            }
            segments.push(Segment::code(code_lines.join("\n")));
            continue;
        }

        if let Some(row) = split_table_row(line) {
            flush_paragraph(&mut segments, &mut paragraph);
            let mut cells = Vec::new();
            push_row_cells(&mut cells, &row, true);
            idx += 1;
            while idx < lines.len() {
                match split_table_row(lines[idx]) {
                    Some(next) => {
                        push_row_cells(&mut cells, &next, false);
                        idx += 1;
                    }
                    None => break,
                }
            }
            segments.push(Segment {
                kind: SegmentKind::Table,
                prefix: String::new(),
                content: String::new(),
                lines: cells,
            });
            continue;
        }

        if let Some((prefix, rest)) = split_blockquote(line) {
            flush_paragraph(&mut segments, &mut paragraph);
            let mut inner = vec![rest];
            idx += 1;
            while idx < lines.len() {
                match split_blockquote(lines[idx]) {
                    Some((next_prefix, next_rest)) if next_prefix == prefix => {
                        inner.push(next_rest);
                        idx += 1;
                    }
                    _ => break,
                }
            }
            segments.push(Segment {
                kind: SegmentKind::Text,
                prefix,
                content: inner.join("\n"),
                lines: Vec::new(),
            });
            continue;
        }

        if let Some((prefix, rest)) = split_heading(line) {
            flush_paragraph(&mut segments, &mut paragraph);
            segments.push(Segment {
                kind: SegmentKind::Heading,
                prefix,
                content: rest,
                lines: Vec::new(),
            });
            idx += 1;
            continue;
        }

        if let Some((marker, prefix, rest)) = split_list_item(line) {
            flush_paragraph(&mut segments, &mut paragraph);
            let mut items = vec![SegmentLine { prefix, content: rest, suffix: String::new() }];
            idx += 1;
            while idx < lines.len() {
                let next = lines[idx];
                if let Some((next_marker, next_prefix, next_rest)) = split_list_item(next) {
                    // A marker-kind change ends the list even between
                    // adjacent lines.
                    if next_marker != marker {
                        break;
                    }
                    items.push(SegmentLine {
                        prefix: next_prefix,
                        content: next_rest,
                        suffix: String::new(),
                    });
                    idx += 1;
                } else if is_list_continuation(next) {
                    let last = items.last_mut().unwrap();
                    last.content.push('\n');
                    last.content.push_str(next);
                    idx += 1;
                } else {
                    break;
                }
            }
            segments.push(Segment {
                kind: SegmentKind::List,
                prefix: String::new(),
                content: String::new(),
                lines: items,
            });
            continue;
        }

        if line.trim().is_empty() {
            flush_paragraph(&mut segments, &mut paragraph);
            segments.push(Segment::text(line.to_string()));
            idx += 1;
            continue;
        }

        paragraph.push(line.to_string());
        idx += 1;
    }

    flush_paragraph(&mut segments, &mut paragraph);
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_roundtrip(input: &str) {
        let segments = segment(input);
        assert_eq!(render_segments(&segments), input, "segments: {:?}", segments);
    }

    #[test]
    fn test_segment_withPlainParagraph_shouldYieldSingleTextSegment() {
        let segments = segment("Hello world\nsecond line");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, SegmentKind::Text);
        assert_eq!(segments[0].content, "Hello world\nsecond line");
    }

    #[test]
    fn test_segment_withBlankLine_shouldPreserveEmptySegment() {
        let segments = segment("one\n\ntwo");
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].content, "");
        assert_roundtrip("one\n\ntwo");
    }

    #[test]
    fn test_segment_withHeading_shouldFlushParagraph() {
        let segments = segment("intro\n## Title\noutro");
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].kind, SegmentKind::Heading);
        assert_eq!(segments[1].prefix, "## ");
        assert_eq!(segments[1].content, "Title");
        assert_roundtrip("intro\n## Title\noutro");
    }

    #[test]
    fn test_segment_withCodeBlock_shouldKeepFencesVerbatim() {
        let input = "before\n```rust\nlet x = 1;\n```\nafter";
        let segments = segment(input);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].kind, SegmentKind::Code);
        assert_eq!(segments[1].content, "```rust\nlet x = 1;\n```");
        assert_roundtrip(input);
    }

    #[test]
    fn test_segment_withUnterminatedFence_shouldStillYieldCodeSegment() {
        let input = "text\n```\nno closing fence";
        let segments = segment(input);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].kind, SegmentKind::Code);
        assert_eq!(segments[1].content, "```\nno closing fence");
        assert_roundtrip(input);
    }

    #[test]
    fn test_segment_withTable_shouldGroupContiguousRows() {
        let input = "| a | b |\n| - | - |\n| 1 | 2 |";
        let segments = segment(input);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, SegmentKind::Table);
        // Two cells per row, three rows.
        assert_eq!(segments[0].lines.len(), 6);
        assert_eq!(segments[0].lines[0].content, " a ");
        assert_eq!(segments[0].lines[1].content, " b ");
        assert_roundtrip(input);
    }

    #[test]
    fn test_segment_withEscapedPipe_shouldNotSplitCell() {
        let input = r"| a \| b | c |";
        let segments = segment(input);
        assert_eq!(segments[0].kind, SegmentKind::Table);
        assert_eq!(segments[0].lines.len(), 2);
        assert_eq!(segments[0].lines[0].content, r" a \| b ");
        assert_roundtrip(input);
    }

    #[test]
    fn test_segment_withBlockquote_shouldGroupOnSamePrefix() {
        let input = "> first\n> second\nplain";
        let segments = segment(input);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].prefix, "> ");
        assert_eq!(segments[0].content, "first\nsecond");
        assert_roundtrip(input);
    }

    #[test]
    fn test_segment_withMixedListMarkers_shouldBreakOnKindChange() {
        let input = "- one\n- two\n1. three\n2. four";
        let segments = segment(input);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].lines.len(), 2);
        assert_eq!(segments[1].lines.len(), 2);
        assert_roundtrip(input);
    }

    #[test]
    fn test_segment_withIndentedContinuation_shouldExtendCurrentItem() {
        let input = "- item one\n  continues here\n- item two";
        let segments = segment(input);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].lines.len(), 2);
        assert_eq!(segments[0].lines[0].content, "item one\n  continues here");
        assert_roundtrip(input);
    }

    #[test]
    fn test_segment_withTaskList_shouldUseTaskMarkerKind() {
        let input = "- [ ] open\n- [x] done\n- plain";
        let segments = segment(input);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].lines[0].prefix, "- [ ] ");
        assert_roundtrip(input);
    }

    #[test]
    fn test_segment_withTrailingNewline_shouldRoundTrip() {
        assert_roundtrip("paragraph\n");
        assert_roundtrip("");
        assert_roundtrip("\n\n");
    }

    #[test]
    fn test_segment_withMixedDocument_shouldRoundTrip() {
        let input = "# Title\n\nIntro paragraph with **bold**.\n\n- first\n- second\n\n```python\nprint('hi')\n```\n\n| h1 | h2 |\n| -- | -- |\n\n> quoted line\n\nclosing text\n";
        assert_roundtrip(input);
    }
}
