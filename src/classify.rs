//! Delta-score classification against calibrated parameters

use crate::{CalibrationParams, Prediction, VescoreResult};

/// Classified delta score with its bounded confidence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub prediction: Prediction,
    /// In [0, 1]: distance from the threshold in units of the predicted
    /// class's spread, saturating at 1
    pub confidence: f64,
}

/// Classify a delta score.
///
/// Scores strictly below the threshold are pathogenic; confidence is the
/// distance from the threshold normalized by the predicted class's spread,
/// capped at 1. Pure function; fails only on a degenerate calibration.
pub fn classify(delta_score: f64, params: &CalibrationParams) -> VescoreResult<Classification> {
    params.validate()?;

    let distance = (delta_score - params.threshold).abs();
    let (prediction, std) = if delta_score < params.threshold {
        (Prediction::Pathogenic, params.lof_std)
    } else {
        (Prediction::Benign, params.func_std)
    };

    Ok(Classification {
        prediction,
        confidence: (distance / std).min(1.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VescoreError;

    fn params() -> CalibrationParams {
        CalibrationParams {
            threshold: -0.001,
            lof_std: 0.002,
            func_std: 0.001,
        }
    }

    #[test]
    fn test_below_threshold_is_pathogenic() {
        let result = classify(-0.002, &params()).unwrap();
        assert_eq!(result.prediction, Prediction::Pathogenic);
        assert!((result.confidence - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_at_or_above_threshold_is_benign() {
        let result = classify(-0.001, &params()).unwrap();
        assert_eq!(result.prediction, Prediction::Benign);
        assert_eq!(result.confidence, 0.0);

        let result = classify(0.0005, &params()).unwrap();
        assert_eq!(result.prediction, Prediction::Benign);
        assert!((result.confidence - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_confidence_saturates_at_one() {
        let result = classify(-10.0, &params()).unwrap();
        assert_eq!(result.confidence, 1.0);

        let result = classify(10.0, &params()).unwrap();
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_monotone_in_distance_from_threshold() {
        let p = params();
        let mut previous = f64::NEG_INFINITY;
        // Walking downward from the threshold never flips back to benign
        // and never lowers the confidence
        for step in 0..20 {
            let delta = p.threshold - 0.0002 * (step + 1) as f64;
            let result = classify(delta, &p).unwrap();
            assert_eq!(result.prediction, Prediction::Pathogenic);
            assert!(result.confidence >= previous);
            previous = result.confidence;
        }

        let mut previous = f64::NEG_INFINITY;
        for step in 0..20 {
            let delta = p.threshold + 0.0002 * step as f64;
            let result = classify(delta, &p).unwrap();
            assert_eq!(result.prediction, Prediction::Benign);
            assert!(result.confidence >= previous);
            previous = result.confidence;
        }
    }

    #[test]
    fn test_default_calibration_worked_example() {
        // delta = -1000.9178519 - (-1000.0) against the frozen defaults
        let result = classify(-0.9178519, &CalibrationParams::default()).unwrap();
        assert_eq!(result.prediction, Prediction::Pathogenic);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_invalid_calibration_rejected() {
        let bad = CalibrationParams {
            threshold: 0.0,
            lof_std: 0.0,
            func_std: 0.001,
        };
        assert!(matches!(
            classify(0.5, &bad),
            Err(VescoreError::InvalidCalibration(_))
        ));
    }
}
