/*!
 * Batch translation and misalignment recovery.
 *
 * Units are grouped by segment, chunked into sub-batches, joined with a
 * single pipe character, and sent to the external translator in one call.
 * A unit whose source already contains the separator character gets its own
 * single-unit call, since a response split could never distinguish its pipes
 * from batch boundaries. The vendor only best-effort preserves the
 * separator, so the result is classified by its split-part count and
 * realigned heuristically:
 *
 * - exact match: positional assignment
 * - single merged string: whole result to the first unit, rest fall back
 * - over-split: headers consume one part, prose absorbs the surplus
 * - under-split: header/non-header pairing with individual retranslation
 *
 * Recovery never loses content. Any sub-batch failure degrades every unit of
 * that sub-batch to its own source text.
 */

use futures::stream::{self, StreamExt};
use log::{debug, warn};
use std::sync::Arc;

use crate::config::BatchPolicy;
use crate::errors::TranslatorError;
use crate::providers::{Direction, Translator};
use crate::units::{TranslatedUnits, TranslationUnit, UnitAddress};

/// Batch translator for processing translation units through the external
/// translate operation
pub struct BatchTranslator<T: Translator + ?Sized> {
    /// The external translation backend
    translator: Arc<T>,

    /// Batching and recovery thresholds
    policy: BatchPolicy,
}

impl<T: Translator + ?Sized> BatchTranslator<T> {
    /// Create a new batch translator
    pub fn new(translator: Arc<T>, policy: BatchPolicy) -> Self {
        Self { translator, policy }
    }

    /// Translate all units, producing a complete translated-unit map.
    ///
    /// Total: transport failures degrade the affected sub-batch to source
    /// text instead of propagating.
    pub async fn translate_units(
        &self,
        units: &[TranslationUnit],
        direction: &Direction,
    ) -> TranslatedUnits {
        let mut map = TranslatedUnits::new();
        if units.is_empty() {
            return map;
        }

        // Group by segment index, then cap each group's sub-batches to bound
        // prompt size. A unit whose source contains the separator is split
        // out into its own single-unit call.
        let mut sub_batches: Vec<&[TranslationUnit]> = Vec::new();
        let mut start = 0;
        for i in 0..=units.len() {
            let boundary = i == units.len()
                || units[i].source.contains(self.policy.separator)
                || units[i].address.segment != units[start].address.segment;
            if boundary && i > start {
                for chunk in units[start..i].chunks(self.policy.max_units_per_batch) {
                    sub_batches.push(chunk);
                }
                start = i;
            }
            if i < units.len() && units[i].source.contains(self.policy.separator) {
                sub_batches.push(std::slice::from_ref(&units[i]));
                start = i + 1;
            }
        }

        let results = stream::iter(sub_batches)
            .then(|batch| async move {
                (batch, self.translate_sub_batch(batch, direction).await)
            })
            .collect::<Vec<_>>()
            .await;

        for (batch, result) in results {
            match result {
                Ok(assignments) => map.extend(assignments),
                Err(e) => {
                    warn!(
                        "Sub-batch of {} units failed, falling back to source text: {}",
                        batch.len(),
                        e
                    );
                    for unit in batch {
                        map.insert(unit.address, unit.source.clone());
                    }
                }
            }
        }
        map
    }

    async fn translate_sub_batch(
        &self,
        batch: &[TranslationUnit],
        direction: &Direction,
    ) -> Result<Vec<(UnitAddress, String)>, TranslatorError> {
        // A single-unit batch is never split back; pipes in the source or in
        // the translation are plain text here.
        if batch.len() == 1 {
            let translated = self.translator.translate(&batch[0].source, direction).await?;
            return Ok(vec![(batch[0].address, translated)]);
        }

        let separator = self.policy.separator.to_string();
        let joined = batch
            .iter()
            .map(|u| u.source.as_str())
            .collect::<Vec<_>>()
            .join(&separator);

        let translated = self.translator.translate(&joined, direction).await?;
        let parts: Vec<&str> = translated.split(self.policy.separator).collect();

        let assignments = if parts.len() == batch.len() {
            debug!("Batch aligned exactly ({} units)", batch.len());
            batch
                .iter()
                .zip(parts)
                .map(|(unit, part)| (unit.address, part.to_string()))
                .collect()
        } else if parts.len() == 1 {
            debug!("Batch merged into one part ({} units)", batch.len());
            let mut out = vec![(batch[0].address, translated.clone())];
            for unit in &batch[1..] {
                out.push((unit.address, unit.source.clone()));
            }
            out
        } else if parts.len() > batch.len() {
            warn!(
                "Batch over-split: {} parts for {} units, recovering",
                parts.len(),
                batch.len()
            );
            self.recover_over_split(batch, &parts, direction).await
        } else {
            warn!(
                "Batch under-split: {} parts for {} units, recovering",
                parts.len(),
                batch.len()
            );
            self.recover_under_split(batch, &parts, direction).await
        };

        Ok(assignments)
    }

    /// More parts than units: headers consume exactly one header-shaped part,
    /// prose units absorb their share of the surplus.
    async fn recover_over_split(
        &self,
        units: &[TranslationUnit],
        parts: &[&str],
        direction: &Direction,
    ) -> Vec<(UnitAddress, String)> {
        let mut out = Vec::with_capacity(units.len());
        let mut p = 0;

        for (i, unit) in units.iter().enumerate() {
            if p >= parts.len() {
                out.push((unit.address, unit.source.clone()));
                continue;
            }
            if self.is_header(&unit.source) {
                if parts[p].trim_end().ends_with(':') {
                    let candidate = parts[p].to_string();
                    p += 1;
                    let text = self.check_header_assignment(unit, candidate, direction).await;
                    out.push((unit.address, text));
                } else {
                    out.push((unit.address, unit.source.clone()));
                }
            } else {
                let mut acc = parts[p].to_string();
                p += 1;
                let remaining_units = units.len() - i - 1;
                let mut extra = (parts.len() - p).saturating_sub(remaining_units);
                while extra > 0 && p < parts.len() && !self.is_header(parts[p]) {
                    acc = join_fragments(&acc, parts[p]);
                    p += 1;
                    extra -= 1;
                }
                out.push((unit.address, acc));
            }
        }
        out
    }

    /// Fewer parts than units: pair headers with header-shaped parts, give
    /// prose units one part each, retranslate the rest individually.
    async fn recover_under_split(
        &self,
        units: &[TranslationUnit],
        parts: &[&str],
        direction: &Direction,
    ) -> Vec<(UnitAddress, String)> {
        let mut out = Vec::with_capacity(units.len());
        let mut p = 0;

        for unit in units {
            if p >= parts.len() {
                out.push((unit.address, self.translate_single(unit, direction).await));
                continue;
            }
            if self.is_header(&unit.source) {
                if self.is_header(parts[p]) {
                    let candidate = parts[p].to_string();
                    p += 1;
                    let text = self.check_header_assignment(unit, candidate, direction).await;
                    out.push((unit.address, text));
                } else {
                    out.push((unit.address, self.translate_single(unit, direction).await));
                }
            } else {
                out.push((unit.address, parts[p].to_string()));
                p += 1;
            }
        }
        out
    }

    /// Retranslate a corrupted header assignment individually
    async fn check_header_assignment(
        &self,
        unit: &TranslationUnit,
        candidate: String,
        direction: &Direction,
    ) -> String {
        if self.looks_corrupted(&candidate) {
            warn!("Header assignment looks corrupted, retranslating unit individually");
            self.translate_single(unit, direction).await
        } else {
            candidate
        }
    }

    /// Translate one unit on its own; its source text is the last resort
    async fn translate_single(&self, unit: &TranslationUnit, direction: &Direction) -> String {
        match self.translator.translate(&unit.source, direction).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Individual translation failed, keeping source text: {}", e);
                unit.source.clone()
            }
        }
    }

    /// Header shape: short trimmed text ending with a colon
    fn is_header(&self, text: &str) -> bool {
        let trimmed = text.trim();
        trimmed.len() < self.policy.header_max_len && trimmed.ends_with(':')
    }

    /// Known vendor failure shapes: a closing bracket straight into lowercase
    /// text, or an isolated filler word from the vendor's chatter.
    fn looks_corrupted(&self, text: &str) -> bool {
        let trimmed = text.trim_start();
        let mut chars = trimmed.chars();
        if let (Some(first), Some(second)) = (chars.next(), chars.next()) {
            if matches!(first, ')' | ']' | '}') && second.is_lowercase() {
                return true;
            }
        }
        text.split_whitespace().any(|word| {
            let cleaned = word.trim_matches(|c: char| !c.is_alphanumeric());
            self.policy
                .filler_words
                .iter()
                .any(|filler| cleaned.eq_ignore_ascii_case(filler))
        })
    }
}

/// Join absorbed fragments: a space when the next fragment starts uppercase
/// or the previous one ended a sentence, direct concatenation otherwise.
fn join_fragments(previous: &str, next: &str) -> String {
    let needs_space =
        next.chars().next().is_some_and(char::is_uppercase) || previous.ends_with('.');
    if needs_space {
        format!("{} {}", previous, next)
    } else {
        format!("{}{}", previous, next)
    }
}
