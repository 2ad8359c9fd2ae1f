//! ROC-based calibration of the delta-score decision threshold
//!
//! A lower (more negative) delta score marks the loss-of-function class, so
//! the ROC sweep runs over the negated delta scores against the
//! loss-of-function indicator. The operating threshold is chosen by Youden's
//! J statistic (max TPR - FPR) and reported back in delta-score space.

use crate::{CalibrationParams, VariantClass, VescoreError, VescoreResult};

/// One point of a ROC curve, tagged with the score threshold that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct RocPoint {
    pub fpr: f64,
    pub tpr: f64,
    /// Classify positive when score >= threshold
    pub threshold: f64,
}

/// Step-function ROC construction over the distinct values of `scores`.
///
/// Tied scores advance together, so each distinct value contributes exactly
/// one point. The curve starts at (0, 0) with an infinite threshold.
pub fn roc_curve(scores: &[f64], positives: &[bool]) -> Vec<RocPoint> {
    let total_pos = positives.iter().filter(|&&p| p).count() as f64;
    let total_neg = positives.len() as f64 - total_pos;

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut points = vec![RocPoint {
        fpr: 0.0,
        tpr: 0.0,
        threshold: f64::INFINITY,
    }];

    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut i = 0;
    while i < order.len() {
        let threshold = scores[order[i]];
        // Consume the whole tie group before emitting a point
        while i < order.len() && scores[order[i]] == threshold {
            if positives[order[i]] {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        points.push(RocPoint {
            fpr: fp as f64 / total_neg,
            tpr: tp as f64 / total_pos,
            threshold,
        });
    }

    points
}

/// Area under a ROC curve by the trapezoidal rule
pub fn auroc(points: &[RocPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| (pair[1].fpr - pair[0].fpr) * (pair[0].tpr + pair[1].tpr) / 2.0)
        .sum()
}

/// Calibrate a decision threshold and per-class spreads from labeled deltas.
///
/// Returns the calibration parameters together with the AUROC of the labeled
/// set. Requires at least two examples covering both classes, and at least
/// two examples per class for the spreads to be defined.
pub fn calibrate(
    delta_scores: &[f64],
    labels: &[VariantClass],
) -> VescoreResult<(CalibrationParams, f64)> {
    if delta_scores.len() != labels.len() {
        return Err(VescoreError::InsufficientData(format!(
            "{} delta scores but {} labels",
            delta_scores.len(),
            labels.len()
        )));
    }
    if delta_scores.len() < 2 {
        return Err(VescoreError::InsufficientData(format!(
            "need at least 2 labeled examples, got {}",
            delta_scores.len()
        )));
    }

    let positives: Vec<bool> = labels
        .iter()
        .map(|c| *c == VariantClass::LossOfFunction)
        .collect();
    let num_pos = positives.iter().filter(|&&p| p).count();
    let num_neg = positives.len() - num_pos;
    if num_pos == 0 || num_neg == 0 {
        return Err(VescoreError::InsufficientData(format!(
            "both classes required, got {} LOF and {} FUNC/INT",
            num_pos, num_neg
        )));
    }

    let negated: Vec<f64> = delta_scores.iter().map(|d| -d).collect();
    let points = roc_curve(&negated, &positives);
    let area = auroc(&points);

    // First occurrence of the maximum J, for reproducibility on ties
    let mut optimal = 0;
    let mut best_j = f64::NEG_INFINITY;
    for (i, point) in points.iter().enumerate() {
        let j = point.tpr - point.fpr;
        if j > best_j {
            best_j = j;
            optimal = i;
        }
    }
    let threshold = -points[optimal].threshold;

    let lof_scores: Vec<f64> = delta_scores
        .iter()
        .zip(&positives)
        .filter(|(_, &p)| p)
        .map(|(d, _)| *d)
        .collect();
    let func_scores: Vec<f64> = delta_scores
        .iter()
        .zip(&positives)
        .filter(|(_, &p)| !p)
        .map(|(d, _)| *d)
        .collect();

    let lof_std = sample_std(&lof_scores).ok_or_else(|| {
        VescoreError::DegenerateDistribution(format!(
            "need at least 2 LOF examples for a spread, got {}",
            lof_scores.len()
        ))
    })?;
    let func_std = sample_std(&func_scores).ok_or_else(|| {
        VescoreError::DegenerateDistribution(format!(
            "need at least 2 FUNC/INT examples for a spread, got {}",
            func_scores.len()
        ))
    })?;

    log::info!(
        "Calibration: threshold={:.10}, lof_std={:.10}, func_std={:.10}, auroc={:.4}",
        threshold,
        lof_std,
        func_std,
        area
    );

    Ok((
        CalibrationParams {
            threshold,
            lof_std,
            func_std,
        },
        area,
    ))
}

/// Sample standard deviation (ddof = 1); `None` for fewer than 2 values
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}
