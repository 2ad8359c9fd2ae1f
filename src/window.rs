//! Reference/variant sequence window construction

use crate::{VescoreError, VescoreResult};

/// A bounded genomic sequence window around a variant position
///
/// Two construction modes exist and deliberately use different relative
/// position arithmetic: slicing a pre-loaded whole-chromosome sequence
/// ([`SequenceWindow::from_chromosome`]) and wrapping a window already
/// fetched centered on the position ([`SequenceWindow::from_fetched`]).
/// Near the start of a sequence the two conventions place the variant at
/// different offsets; unifying them would silently shift which base gets
/// substituted, so they stay separate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceWindow {
    /// Upper-case bases
    pub sequence: String,
    /// 0-based coordinate of `sequence[0]` in the source genome
    pub start: usize,
    /// Index of the variant base within `sequence`
    pub relative_position: usize,
}

impl SequenceWindow {
    /// Slice a window out of a whole-chromosome sequence.
    ///
    /// `position` is 1-based. The window covers
    /// `[max(0, p - w/2), min(len, p + w/2))` with `p = position - 1`; for
    /// even `w` the two halves are asymmetric and the variant base sits at
    /// `min(w/2, p)`. Windows near either end of the chromosome come out
    /// shorter than `window_size`.
    pub fn from_chromosome(
        chromosome: &str,
        position: u32,
        window_size: usize,
    ) -> VescoreResult<Self> {
        let p = (position as usize).saturating_sub(1);
        if position < 1 || p >= chromosome.len() {
            return Err(VescoreError::OutOfBounds {
                position,
                window_start: 1,
                window_end: chromosome.len(),
            });
        }

        let half = window_size / 2;
        let start = p.saturating_sub(half);
        let end = std::cmp::min(chromosome.len(), p + half);
        let relative_position = std::cmp::min(half, p);

        let sequence = chromosome[start..end].to_string();
        if relative_position >= sequence.len() {
            return Err(VescoreError::OutOfBounds {
                position,
                window_start: start + 1,
                window_end: end,
            });
        }

        Ok(Self {
            sequence,
            start,
            relative_position,
        })
    }

    /// Wrap a window that was fetched pre-centered on `position`.
    ///
    /// `fetch_start` is the 0-based coordinate of the first fetched base.
    /// Fails if the fetched range does not actually cover the position,
    /// e.g. after a mismatched or truncated fetch.
    pub fn from_fetched(
        sequence: String,
        fetch_start: usize,
        position: u32,
    ) -> VescoreResult<Self> {
        let rel = position as i64 - 1 - fetch_start as i64;
        if rel < 0 || rel as usize >= sequence.len() {
            return Err(VescoreError::OutOfBounds {
                position,
                window_start: fetch_start + 1,
                window_end: fetch_start + sequence.len(),
            });
        }

        Ok(Self {
            sequence,
            start: fetch_start,
            relative_position: rel as usize,
        })
    }

    /// The reference base at the variant position
    pub fn reference_base(&self) -> char {
        self.sequence.as_bytes()[self.relative_position] as char
    }

    /// Build the variant sequence by substituting `alt_base` at the variant
    /// position; length is preserved.
    pub fn with_substitution(&self, alt_base: char) -> String {
        let rel = self.relative_position;
        format!(
            "{}{}{}",
            &self.sequence[..rel],
            alt_base,
            &self.sequence[rel + 1..]
        )
    }
}
