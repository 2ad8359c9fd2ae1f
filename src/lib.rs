//! # vescore - Variant Effect Scoring Tool
//!
//! Estimates the functional effect of single-nucleotide variants by comparing
//! the log-likelihood a sequence-scoring model assigns to a reference genomic
//! window against the same window with the variant substituted in, and
//! classifies the resulting delta score against a ROC-calibrated threshold.

pub mod calibrate;
pub mod classify;
pub mod dataset;
pub mod dedup;
pub mod fetch;
pub mod pipeline;
pub mod scoring;
pub mod utils;
pub mod window;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default number of bases in a scoring window.
pub const DEFAULT_WINDOW_SIZE: usize = 8192;

/// Represents a single-nucleotide genomic variant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variant {
    pub chrom: String,
    /// 1-based genome coordinate
    pub pos: u32,
    /// Reference base; `None` until resolved from the genome sequence
    pub ref_base: Option<char>,
    pub alt_base: char,
}

impl Variant {
    pub fn new(chrom: String, pos: u32, ref_base: Option<char>, alt_base: char) -> Self {
        Self {
            chrom,
            pos,
            ref_base,
            alt_base,
        }
    }

    /// Validate that a base is one of the four upper-case nucleotides
    pub fn is_valid_base(base: char) -> bool {
        matches!(base, 'A' | 'C' | 'G' | 'T')
    }
}

/// Functional class label attached to a calibration example
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariantClass {
    /// Loss-of-function (the positive class in ROC analysis)
    LossOfFunction,
    /// Functional or intermediate (the negative class)
    Functional,
}

impl FromStr for VariantClass {
    type Err = VescoreError;

    fn from_str(s: &str) -> Result<Self, VescoreError> {
        match s {
            "LOF" => Ok(VariantClass::LossOfFunction),
            "FUNC" | "INT" | "FUNC/INT" => Ok(VariantClass::Functional),
            other => Err(VescoreError::InvalidVariant(format!(
                "Unknown variant class label: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for VariantClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantClass::LossOfFunction => write!(f, "LOF"),
            VariantClass::Functional => write!(f, "FUNC/INT"),
        }
    }
}

/// Predicted effect of a variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prediction {
    #[serde(rename = "Likely pathogenic")]
    Pathogenic,
    #[serde(rename = "Likely benign")]
    Benign,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Pathogenic => write!(f, "Likely pathogenic"),
            Prediction::Benign => write!(f, "Likely benign"),
        }
    }
}

/// Calibration parameters for delta-score classification
///
/// Produced by one run of the calibration engine over a labeled dataset and
/// consumed read-only by any number of classifications. The `Default` values
/// are a frozen snapshot of one calibration run over the BRCA1 reference
/// dataset; the calibration engine remains the source of truth and these
/// constants are its golden output, not independently chosen numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationParams {
    /// Delta-score decision threshold (scores below it are pathogenic)
    pub threshold: f64,
    /// Sample std of delta scores among loss-of-function examples
    pub lof_std: f64,
    /// Sample std of delta scores among functional examples
    pub func_std: f64,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            threshold: -0.0009178519,
            lof_std: 0.0015140239,
            func_std: 0.0009016589,
        }
    }
}

impl CalibrationParams {
    /// Check that both spreads are usable as confidence denominators
    pub fn validate(&self) -> VescoreResult<()> {
        if !(self.lof_std > 0.0) || !self.lof_std.is_finite() {
            return Err(VescoreError::InvalidCalibration(format!(
                "lof_std must be a positive finite number, got {}",
                self.lof_std
            )));
        }
        if !(self.func_std > 0.0) || !self.func_std.is_finite() {
            return Err(VescoreError::InvalidCalibration(format!(
                "func_std must be a positive finite number, got {}",
                self.func_std
            )));
        }
        Ok(())
    }
}

/// Classification outcome for a single variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub chrom: String,
    pub position: u32,
    pub reference: char,
    pub alternative: char,
    pub delta_score: f64,
    pub prediction: Prediction,
    pub classification_confidence: f64,
}

/// Error types for the vescore library
#[derive(Debug, thiserror::Error)]
pub enum VescoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Variant position {position} is outside the window (start={window_start}, end={window_end})")]
    OutOfBounds {
        position: u32,
        /// 1-based first position covered by the window
        window_start: usize,
        /// 1-based last position covered by the window
        window_end: usize,
    },

    #[error("Scoring oracle unavailable: {0}")]
    ScoringUnavailable(String),

    #[error("Sequence fetch failed: {0}")]
    Fetch(String),

    #[error("Insufficient calibration data: {0}")]
    InsufficientData(String),

    #[error("Degenerate score distribution: {0}")]
    DegenerateDistribution(String),

    #[error("Invalid calibration: {0}")]
    InvalidCalibration(String),

    #[error("Invalid variant format: {0}")]
    InvalidVariant(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

pub type VescoreResult<T> = Result<T, VescoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_class_parsing() {
        assert_eq!(
            "LOF".parse::<VariantClass>().unwrap(),
            VariantClass::LossOfFunction
        );
        assert_eq!(
            "FUNC".parse::<VariantClass>().unwrap(),
            VariantClass::Functional
        );
        assert_eq!(
            "INT".parse::<VariantClass>().unwrap(),
            VariantClass::Functional
        );
        assert_eq!(
            "FUNC/INT".parse::<VariantClass>().unwrap(),
            VariantClass::Functional
        );
        assert!("PATHOGENIC".parse::<VariantClass>().is_err());
    }

    #[test]
    fn test_default_calibration_validates() {
        let params = CalibrationParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.threshold, -0.0009178519);
        assert_eq!(params.lof_std, 0.0015140239);
        assert_eq!(params.func_std, 0.0009016589);
    }

    #[test]
    fn test_calibration_rejects_nonpositive_std() {
        let params = CalibrationParams {
            threshold: 0.0,
            lof_std: 0.0,
            func_std: 0.001,
        };
        assert!(params.validate().is_err());

        let params = CalibrationParams {
            threshold: 0.0,
            lof_std: 0.001,
            func_std: -1.0,
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_is_valid_base() {
        for base in ['A', 'C', 'G', 'T'] {
            assert!(Variant::is_valid_base(base));
        }
        assert!(!Variant::is_valid_base('N'));
        assert!(!Variant::is_valid_base('a'));
    }
}
