//! Delta-score pipelines
//!
//! Batch mode slices windows out of a pre-loaded chromosome sequence,
//! deduplicates the reference windows, and scores everything in two oracle
//! calls. Single-variant mode fetches one window remotely, scores the
//! reference/variant pair, and classifies the delta against a calibration.

use crate::classify::classify;
use crate::dedup::SequenceIndex;
use crate::fetch::{fetch_window, SequenceFetcher};
use crate::scoring::{score_pair_delta, ScoringClient};
use crate::window::SequenceWindow;
use crate::{CalibrationParams, ClassificationResult, Variant, VescoreResult};

/// Compute delta scores for a batch of variants on one chromosome.
///
/// Each unique reference window is scored once; variant windows are scored
/// in input order, and `delta[i] = var_scores[i] - ref_scores[ref_index[i]]`.
pub fn batch_delta_scores<C: ScoringClient>(
    variants: &[Variant],
    chromosome_seq: &str,
    window_size: usize,
    client: &C,
) -> VescoreResult<Vec<f64>> {
    if variants.is_empty() {
        return Ok(Vec::new());
    }

    let mut index = SequenceIndex::new();
    let mut ref_indexes = Vec::with_capacity(variants.len());
    let mut var_seqs = Vec::with_capacity(variants.len());

    for variant in variants {
        let window = SequenceWindow::from_chromosome(chromosome_seq, variant.pos, window_size)?;
        if let Some(expected) = variant.ref_base {
            let actual = window.reference_base();
            if actual != expected {
                log::warn!(
                    "Reference base mismatch at {}:{} (table says {}, sequence has {})",
                    variant.chrom,
                    variant.pos,
                    expected,
                    actual
                );
            }
        }
        var_seqs.push(window.with_substitution(variant.alt_base));
        ref_indexes.push(index.intern(&window.sequence));
    }

    log::info!(
        "Scoring {} unique reference sequences for {} variants",
        index.len(),
        variants.len()
    );
    let ref_scores = client.score_batch(index.sequences())?;

    log::info!("Scoring {} variant sequences", var_seqs.len());
    let var_scores = client.score_batch(&var_seqs)?;

    Ok(var_scores
        .iter()
        .zip(&ref_indexes)
        .map(|(var, &ref_idx)| var - ref_scores[ref_idx])
        .collect())
}

/// Analyze one variant end to end: fetch its window, resolve the reference
/// base, score the reference/variant pair, and classify the delta.
pub fn analyze_variant<F: SequenceFetcher, C: ScoringClient>(
    fetcher: &F,
    client: &C,
    genome: &str,
    variant: &Variant,
    window_size: usize,
    params: &CalibrationParams,
) -> VescoreResult<ClassificationResult> {
    let (sequence, fetch_start) =
        fetch_window(fetcher, genome, &variant.chrom, variant.pos, window_size)?;

    let window = SequenceWindow::from_fetched(sequence, fetch_start, variant.pos)?;
    let reference = window.reference_base();
    log::info!(
        "Relative position within window: {}, reference base: {}",
        window.relative_position,
        reference
    );

    if let Some(expected) = variant.ref_base {
        if expected != reference {
            log::warn!(
                "Requested reference base {} disagrees with genome sequence ({})",
                expected,
                reference
            );
        }
    }

    let variant_seq = window.with_substitution(variant.alt_base);
    let delta_score = score_pair_delta(client, &window.sequence, &variant_seq)?;

    let classification = classify(delta_score, params)?;
    Ok(ClassificationResult {
        chrom: variant.chrom.clone(),
        position: variant.pos,
        reference,
        alternative: variant.alt_base,
        delta_score,
        prediction: classification.prediction,
        classification_confidence: classification.confidence,
    })
}
