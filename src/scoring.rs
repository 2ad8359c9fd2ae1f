//! Scoring oracle client
//!
//! The sequence-likelihood model is an external service; the core only sees
//! the [`ScoringClient`] capability. Scores are log-likelihoods whose
//! relative magnitude is meaningful, not their absolute value.

use crate::{VescoreError, VescoreResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
const HTTP_READ_TIMEOUT_SECS: u64 = 600;

/// Capability interface to the sequence-likelihood scoring oracle
///
/// Implementations must preserve order: one score per input sequence, in
/// input order. Any oracle-side fault surfaces as
/// [`VescoreError::ScoringUnavailable`]; retry policy belongs to the caller.
pub trait ScoringClient {
    fn score_batch(&self, sequences: &[String]) -> VescoreResult<Vec<f64>>;
}

#[derive(Serialize)]
struct ScoreRequest<'a> {
    sequences: &'a [String],
}

#[derive(Deserialize)]
struct ScoreResponse {
    scores: Vec<f64>,
}

/// HTTP adapter for a remote scoring endpoint
///
/// Posts `{"sequences": [...]}` and expects `{"scores": [...]}`. The read
/// timeout is generous because the model serving layer may batch hundreds of
/// 8kb windows per request.
pub struct HttpScoringClient {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpScoringClient {
    pub fn new(endpoint: &str) -> VescoreResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(HTTP_READ_TIMEOUT_SECS))
            .user_agent(concat!("vescore-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                VescoreError::ScoringUnavailable(format!(
                    "could not construct HTTP client: {}",
                    e
                ))
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

impl ScoringClient for HttpScoringClient {
    fn score_batch(&self, sequences: &[String]) -> VescoreResult<Vec<f64>> {
        log::debug!(
            "Scoring batch of {} sequences via {}",
            sequences.len(),
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ScoreRequest { sequences })
            .send()
            .map_err(|e| VescoreError::ScoringUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VescoreError::ScoringUnavailable(format!(
                "scoring endpoint returned HTTP {}",
                status.as_u16()
            )));
        }

        let body: ScoreResponse = response
            .json()
            .map_err(|e| VescoreError::ScoringUnavailable(e.to_string()))?;

        if body.scores.len() != sequences.len() {
            return Err(VescoreError::ScoringUnavailable(format!(
                "scoring endpoint returned {} scores for {} sequences",
                body.scores.len(),
                sequences.len()
            )));
        }

        Ok(body.scores)
    }
}

/// Delta score for one reference/variant sequence pair, single-variant mode:
/// two one-element batches, variant minus reference.
pub fn score_pair_delta<C: ScoringClient>(
    client: &C,
    reference: &str,
    variant: &str,
) -> VescoreResult<f64> {
    let ref_score = single_score(client, reference)?;
    let var_score = single_score(client, variant)?;
    Ok(var_score - ref_score)
}

fn single_score<C: ScoringClient>(client: &C, sequence: &str) -> VescoreResult<f64> {
    client
        .score_batch(&[sequence.to_string()])?
        .first()
        .copied()
        .ok_or_else(|| {
            VescoreError::ScoringUnavailable("oracle returned an empty score batch".to_string())
        })
}
