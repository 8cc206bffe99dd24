/*!
 * Segment reconstruction from translated units.
 *
 * Each translatable segment's content is re-tokenized with the identical
 * tokenizer algorithm, so token addresses line up with the extractor's, and
 * translated text is looked up by address. Inline code renders its original
 * span verbatim; text is trimmed and re-wrapped in the original token's
 * leading/trailing whitespace (the vendor commonly trims edges); bold,
 * italic, and link tokens are re-wrapped with their original markers and
 * URLs. Tokens with no map entry keep their source text.
 *
 * Two repair passes run on the final text: a mid-line bullet injected by the
 * vendor is reflowed onto its own line, and residual legacy placeholders are
 * stripped.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::segmenter::{Segment, SegmentKind};
use crate::tokenizer::{tokenize, Token, TokenKind};
use crate::units::{is_translatable, TranslatedUnits, UnitAddress};

/// Bullet character injected mid-line by the vendor
static INLINE_BULLET_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"([^\n]) *• *").unwrap());

/// Legacy placeholder shapes left behind by an earlier wrapping scheme
static LEGACY_PLACEHOLDER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@@[A-Z]+_\d+@@|@[A-Z]+_\d+@|__[A-Z]+_\d+__").unwrap());

/// Re-wrap trimmed translated text in the original inner text's leading and
/// trailing whitespace
fn rewrap_whitespace(original_inner: &str, translated: &str) -> String {
    let trimmed = original_inner.trim();
    if trimmed.is_empty() {
        return original_inner.to_string();
    }
    let lead_len = original_inner.len() - original_inner.trim_start().len();
    let trail_len = original_inner.len() - original_inner.trim_end().len();
    format!(
        "{}{}{}",
        &original_inner[..lead_len],
        translated,
        &original_inner[original_inner.len() - trail_len..]
    )
}

fn render_token(token: &Token, translated: Option<&String>) -> String {
    let translated = match translated {
        Some(text) => text,
        None => return token.render(),
    };
    match token.kind {
        TokenKind::InlineCode => token.render(),
        TokenKind::Text => rewrap_whitespace(&token.inner, translated.trim()),
        TokenKind::Bold | TokenKind::Italic => format!(
            "{}{}{}",
            token.wrapper_start,
            translated.trim(),
            token.wrapper_end
        ),
        TokenKind::Link => format!(
            "[{}]({})",
            translated.trim(),
            token.url.as_deref().unwrap_or_default()
        ),
    }
}

fn rebuild_content(
    content: &str,
    translated: &TranslatedUnits,
    segment: usize,
    line: Option<usize>,
) -> String {
    tokenize(content)
        .iter()
        .enumerate()
        .map(|(token_index, token)| {
            let address = UnitAddress { segment, line, token: token_index };
            render_token(token, translated.get(&address))
        })
        .collect()
}

/// Rebuild the full document from the original segments and the translated
/// unit map. Non-translatable segments pass through unchanged.
pub fn reconstruct(segments: &[Segment], translated: &TranslatedUnits) -> String {
    let rendered: Vec<String> = segments
        .iter()
        .enumerate()
        .map(|(segment_index, segment)| {
            if !is_translatable(segment) {
                return segment.render();
            }
            match segment.kind {
                SegmentKind::List => segment
                    .lines
                    .iter()
                    .enumerate()
                    .map(|(line_index, line)| {
                        let content = rebuild_content(
                            &line.content,
                            translated,
                            segment_index,
                            Some(line_index),
                        );
                        format!("{}{}", line.prefix, content)
                    })
                    .collect::<Vec<_>>()
                    .join("\n"),
                // Table lines are cells; the pipes and row breaks live in the
                // prefixes and suffixes, so a plain concat restores the rows.
                SegmentKind::Table => segment
                    .lines
                    .iter()
                    .enumerate()
                    .map(|(line_index, line)| {
                        let content = rebuild_content(
                            &line.content,
                            translated,
                            segment_index,
                            Some(line_index),
                        );
                        format!("{}{}{}", line.prefix, content, line.suffix)
                    })
                    .collect::<String>(),
                _ => {
                    let content =
                        rebuild_content(&segment.content, translated, segment_index, None);
                    format!("{}{}", segment.prefix, content)
                }
            }
        })
        .collect();

    rendered.join("\n")
}

/// Reflow a bullet injected mid-line onto its own `• `-prefixed line
pub fn normalize_inline_bullets(text: &str) -> String {
    INLINE_BULLET_REGEX.replace_all(text, "$1\n• ").to_string()
}

/// Strip residual legacy placeholders before the text is considered final
pub fn strip_legacy_placeholders(text: &str) -> String {
    LEGACY_PLACEHOLDER_REGEX.replace_all(text, "").to_string()
}
