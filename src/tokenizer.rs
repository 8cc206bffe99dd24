/*!
 * Inline tokenization of segment content.
 *
 * This module splits one segment's content into ordered tokens (text, bold,
 * italic, link, inline code). Four pattern families are matched independently
 * over the whole content, restarting each scan just past the previous match's
 * start so overlapping candidates are all collected; candidates are then
 * sorted by ascending start then descending length and accepted greedily,
 * discarding any candidate that overlaps an already-accepted span. Gaps
 * become plain text tokens.
 *
 * Rendering the tokens and concatenating them reproduces the content
 * byte-for-byte under identity translation.
 */

use once_cell::sync::Lazy;
use regex::Regex;

static INLINE_CODE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
static LINK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]\(([^)]*)\)").unwrap());
static BOLD_STAR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static BOLD_UNDERSCORE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"__([^_]+)__").unwrap());
static ITALIC_STAR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+)\*").unwrap());
static ITALIC_UNDERSCORE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"_([^_]+)_").unwrap());

/// Inline classification of a span within a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Plain text between formatted spans
    Text,
    /// Single-backtick code span, never translated
    InlineCode,
    /// Bold span, `**..**` or `__..__`
    Bold,
    /// Italic span, `*..*` or `_.._`
    Italic,
    /// Link with visible text and URL
    Link,
}

/// An inline-formatting-classified span within a segment
#[derive(Debug, Clone)]
pub struct Token {
    /// Inline classification
    pub kind: TokenKind,
    /// Inner text without wrapper markers; the visible text for links
    pub inner: String,
    /// The literal source span, wrappers included
    pub original: String,
    /// Literal opening marker
    pub wrapper_start: String,
    /// Literal closing marker
    pub wrapper_end: String,
    /// Link target, present only for link tokens
    pub url: Option<String>,
}

impl Token {
    fn text(span: &str) -> Self {
        Self {
            kind: TokenKind::Text,
            inner: span.to_string(),
            original: span.to_string(),
            wrapper_start: String::new(),
            wrapper_end: String::new(),
            url: None,
        }
    }

    /// Render this token back to its exact source span
    pub fn render(&self) -> String {
        match self.kind {
            TokenKind::Text | TokenKind::InlineCode => self.original.clone(),
            TokenKind::Link => format!(
                "[{}]({})",
                self.inner,
                self.url.as_deref().unwrap_or_default()
            ),
            TokenKind::Bold | TokenKind::Italic => {
                format!("{}{}{}", self.wrapper_start, self.inner, self.wrapper_end)
            }
        }
    }
}

/// A candidate match before overlap resolution
struct Candidate {
    start: usize,
    end: usize,
    token: Token,
}

/// Advance a scan position one character past a match start, so the next
/// search can find candidates overlapping the previous one
fn restart_after(content: &str, start: usize) -> usize {
    start + content[start..].chars().next().map_or(1, char::len_utf8)
}

fn collect_wrapped(
    content: &str,
    regex: &Regex,
    kind: TokenKind,
    wrapper: &str,
    out: &mut Vec<Candidate>,
) {
    let mut pos = 0;
    while let Some(caps) = regex.captures_at(content, pos) {
        let whole = caps.get(0).unwrap();
        out.push(Candidate {
            start: whole.start(),
            end: whole.end(),
            token: Token {
                kind,
                inner: caps[1].to_string(),
                original: whole.as_str().to_string(),
                wrapper_start: wrapper.to_string(),
                wrapper_end: wrapper.to_string(),
                url: None,
            },
        });
        pos = restart_after(content, whole.start());
    }
}

/// Tokenize one segment's content into ordered inline tokens
pub fn tokenize(content: &str) -> Vec<Token> {
    let mut candidates = Vec::new();

    collect_wrapped(content, &INLINE_CODE_REGEX, TokenKind::InlineCode, "`", &mut candidates);
    collect_wrapped(content, &BOLD_STAR_REGEX, TokenKind::Bold, "**", &mut candidates);
    collect_wrapped(content, &BOLD_UNDERSCORE_REGEX, TokenKind::Bold, "__", &mut candidates);
    collect_wrapped(content, &ITALIC_STAR_REGEX, TokenKind::Italic, "*", &mut candidates);
    collect_wrapped(content, &ITALIC_UNDERSCORE_REGEX, TokenKind::Italic, "_", &mut candidates);

    let mut pos = 0;
    while let Some(caps) = LINK_REGEX.captures_at(content, pos) {
        let whole = caps.get(0).unwrap();
        candidates.push(Candidate {
            start: whole.start(),
            end: whole.end(),
            token: Token {
                kind: TokenKind::Link,
                inner: caps[1].to_string(),
                original: whole.as_str().to_string(),
                wrapper_start: "[".to_string(),
                wrapper_end: "]".to_string(),
                url: Some(caps[2].to_string()),
            },
        });
        pos = restart_after(content, whole.start());
    }

    // Earliest-longest-wins: ascending start, then descending length.
    candidates.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut accepted: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        let overlaps = accepted
            .iter()
            .any(|kept| candidate.start < kept.end && kept.start < candidate.end);
        if !overlaps {
            accepted.push(candidate);
        }
    }
    accepted.sort_by_key(|c| c.start);

    let mut tokens = Vec::new();
    let mut cursor = 0;
    for candidate in accepted {
        if candidate.start > cursor {
            tokens.push(Token::text(&content[cursor..candidate.start]));
        }
        cursor = candidate.end;
        tokens.push(candidate.token);
    }
    if cursor < content.len() {
        tokens.push(Token::text(&content[cursor..]));
    }
    tokens
}

/// Render a token list back to the exact segment content
pub fn render_tokens(tokens: &[Token]) -> String {
    tokens.iter().map(Token::render).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_roundtrip(content: &str) {
        let tokens = tokenize(content);
        assert_eq!(render_tokens(&tokens), content, "tokens: {:?}", tokens);
    }

    #[test]
    fn test_tokenize_withPlainText_shouldYieldSingleTextToken() {
        let tokens = tokenize("just plain words");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Text);
    }

    #[test]
    fn test_tokenize_withBold_shouldCaptureWrapper() {
        let tokens = tokenize("Hello **world** and **universe**");
        let bolds: Vec<_> = tokens.iter().filter(|t| t.kind == TokenKind::Bold).collect();
        assert_eq!(bolds.len(), 2);
        assert_eq!(bolds[0].inner, "world");
        assert_eq!(bolds[0].wrapper_start, "**");
        assert_roundtrip("Hello **world** and **universe**");
    }

    #[test]
    fn test_tokenize_withBoldAndItalicOverlap_shouldPreferEarliestLongest() {
        let tokens = tokenize("**bold** and *italic*");
        assert_eq!(tokens[0].kind, TokenKind::Bold);
        assert_eq!(tokens[0].inner, "bold");
        let italics: Vec<_> = tokens.iter().filter(|t| t.kind == TokenKind::Italic).collect();
        assert_eq!(italics.len(), 1);
        assert_eq!(italics[0].inner, "italic");
        assert_roundtrip("**bold** and *italic*");
    }

    #[test]
    fn test_tokenize_withEmphasisAfterBold_shouldFindLaterSpan() {
        // The stars closing the bold span must not consume the opening
        // marker of the following italic span.
        let tokens = tokenize("**bold** and *italic* tail");
        let italic = tokens.iter().find(|t| t.kind == TokenKind::Italic).unwrap();
        assert_eq!(italic.inner, "italic");
        assert_roundtrip("**bold** and *italic* tail");

        let tokens = tokenize("__a__ x _b_");
        let italic = tokens.iter().find(|t| t.kind == TokenKind::Italic).unwrap();
        assert_eq!(italic.inner, "b");
        assert_roundtrip("__a__ x _b_");
    }

    #[test]
    fn test_tokenize_withUnderscoreBold_shouldNotSplitIntoItalics() {
        let tokens = tokenize("__strong__ text");
        assert_eq!(tokens[0].kind, TokenKind::Bold);
        assert_eq!(tokens[0].wrapper_start, "__");
        assert_roundtrip("__strong__ text");
    }

    #[test]
    fn test_tokenize_withLink_shouldSeparateTextAndUrl() {
        let tokens = tokenize("see [docs](https://example.com) here");
        let link = tokens.iter().find(|t| t.kind == TokenKind::Link).unwrap();
        assert_eq!(link.inner, "docs");
        assert_eq!(link.url.as_deref(), Some("https://example.com"));
        assert_roundtrip("see [docs](https://example.com) here");
    }

    #[test]
    fn test_tokenize_withInlineCode_shouldKeepLiteralSpan() {
        let content = "Use `console.log()` to **debug** your code";
        let tokens = tokenize(content);
        let code = tokens.iter().find(|t| t.kind == TokenKind::InlineCode).unwrap();
        assert_eq!(code.original, "`console.log()`");
        assert_eq!(code.inner, "console.log()");
        assert_roundtrip(content);
    }

    #[test]
    fn test_tokenize_withCodeContainingStars_shouldNotMatchEmphasisInside() {
        let content = "run `a * b * c` now";
        let tokens = tokenize(content);
        assert_eq!(tokens[1].kind, TokenKind::InlineCode);
        assert!(tokens.iter().all(|t| t.kind != TokenKind::Italic));
        assert_roundtrip(content);
    }

    #[test]
    fn test_tokenize_withMultilineContent_shouldRoundTrip() {
        assert_roundtrip("first line with *em*\nsecond line with `code`");
    }

    #[test]
    fn test_tokenize_retokenizedRender_shouldBeStable() {
        let content = "mix of **bold**, *italic*, `code` and [a](b)";
        let rendered = render_tokens(&tokenize(content));
        assert_eq!(render_tokens(&tokenize(&rendered)), content);
    }
}
