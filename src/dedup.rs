//! Deduplication index for reference sequence windows
//!
//! Neighboring variants in a batch produce identical reference windows but
//! distinct variant windows. Interning the reference windows means each
//! unique sequence is sent to the scoring oracle exactly once, and score
//! lookup stays a dense index away.

use std::collections::HashMap;

/// Append-only map from sequence content to a dense first-seen index
#[derive(Debug, Default)]
pub struct SequenceIndex {
    indices: HashMap<String, usize>,
    sequences: Vec<String>,
}

impl SequenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the index for `sequence`, allocating the next dense index if
    /// the content has not been seen before.
    pub fn intern(&mut self, sequence: &str) -> usize {
        if let Some(&index) = self.indices.get(sequence) {
            return index;
        }
        let index = self.sequences.len();
        self.indices.insert(sequence.to_string(), index);
        self.sequences.push(sequence.to_string());
        index
    }

    /// Unique sequences in first-seen order
    pub fn sequences(&self) -> &[String] {
        &self.sequences
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}
