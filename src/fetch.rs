//! Remote genome sequence retrieval
//!
//! Windows for single-variant analysis come from the UCSC sequence API; the
//! core only depends on the [`SequenceFetcher`] capability so tests can
//! substitute a canned chromosome.

use crate::{VescoreError, VescoreResult};
use serde::Deserialize;
use std::time::Duration;

const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
const HTTP_READ_TIMEOUT_SECS: u64 = 60;

/// Capability interface for fetching a half-open genomic coordinate range
pub trait SequenceFetcher {
    /// Fetch upper-case bases for `[start, end)` (0-based) on `chromosome`
    fn fetch(&self, genome: &str, chromosome: &str, start: usize, end: usize)
        -> VescoreResult<String>;
}

#[derive(Deserialize)]
struct UcscResponse {
    dna: Option<String>,
    error: Option<String>,
}

/// Sequence fetcher backed by the UCSC genome browser REST API
pub struct UcscFetcher {
    client: reqwest::blocking::Client,
    base_url: String,
}

pub const UCSC_API_BASE: &str = "https://api.genome.ucsc.edu";

impl UcscFetcher {
    pub fn new() -> VescoreResult<Self> {
        Self::with_base_url(UCSC_API_BASE)
    }

    pub fn with_base_url(base_url: &str) -> VescoreResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(HTTP_READ_TIMEOUT_SECS))
            .user_agent(concat!("vescore-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VescoreError::Fetch(format!("could not construct HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl SequenceFetcher for UcscFetcher {
    fn fetch(
        &self,
        genome: &str,
        chromosome: &str,
        start: usize,
        end: usize,
    ) -> VescoreResult<String> {
        let url = format!(
            "{}/getData/sequence?genome={};chrom={};start={};end={}",
            self.base_url, genome, chromosome, start, end
        );
        log::debug!("Fetching sequence: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| VescoreError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VescoreError::Fetch(format!(
                "UCSC API returned HTTP {}",
                status.as_u16()
            )));
        }

        let body: UcscResponse = response
            .json()
            .map_err(|e| VescoreError::Fetch(format!("invalid UCSC API response: {}", e)))?;

        match body.dna {
            Some(dna) if !dna.is_empty() => Ok(dna),
            _ => Err(VescoreError::Fetch(format!(
                "UCSC API returned no sequence: {}",
                body.error.unwrap_or_else(|| "unknown error".to_string())
            ))),
        }
    }
}

/// Fetch a window of `window_size` bases centered on the 1-based `position`.
///
/// Coordinates are the symmetric fetch-mode convention:
/// `[max(0, p - w/2), p + w/2 + 1)` with `p = position - 1`. Returns the
/// upper-cased sequence and its 0-based start. A response shorter than
/// requested is a warning (legitimate near chromosome ends); an empty
/// response is a fatal fetch error raised by the fetcher itself.
pub fn fetch_window<F: SequenceFetcher>(
    fetcher: &F,
    genome: &str,
    chromosome: &str,
    position: u32,
    window_size: usize,
) -> VescoreResult<(String, usize)> {
    let p = (position as usize).saturating_sub(1);
    let half = window_size / 2;
    let start = p.saturating_sub(half);
    let end = p + half + 1;

    log::info!(
        "Fetching {}bp window around position {} ({}:{}-{}, {})",
        window_size,
        position,
        chromosome,
        start,
        end,
        genome
    );

    let sequence = fetcher.fetch(genome, chromosome, start, end)?.to_uppercase();

    let expected = end - start;
    if sequence.len() != expected {
        log::warn!(
            "Received sequence length ({}) differs from expected ({})",
            sequence.len(),
            expected
        );
    }

    Ok((sequence, start))
}

#[cfg(test)]
pub mod stub {
    use super::*;

    /// Fetcher serving slices of a fixed in-memory chromosome
    pub struct StubFetcher {
        pub chromosome: String,
    }

    impl SequenceFetcher for StubFetcher {
        fn fetch(
            &self,
            _genome: &str,
            _chromosome: &str,
            start: usize,
            end: usize,
        ) -> VescoreResult<String> {
            if start >= self.chromosome.len() {
                return Err(VescoreError::Fetch(
                    "requested range is past the chromosome end".to_string(),
                ));
            }
            let end = std::cmp::min(end, self.chromosome.len());
            Ok(self.chromosome[start..end].to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::stub::StubFetcher;
    use super::*;

    fn fetcher(len: usize) -> StubFetcher {
        StubFetcher {
            chromosome: "acgt".chars().cycle().take(len).collect(),
        }
    }

    #[test]
    fn test_fetch_window_coordinates_and_case() {
        let fetcher = fetcher(10000);
        let (sequence, start) = fetch_window(&fetcher, "hg38", "chr17", 5000, 100).unwrap();

        // p = 4999, half = 50
        assert_eq!(start, 4949);
        assert_eq!(sequence.len(), 101);
        assert!(sequence.bytes().all(|b| b.is_ascii_uppercase()));
    }

    #[test]
    fn test_fetch_window_clamps_at_origin() {
        let fetcher = fetcher(10000);
        let (sequence, start) = fetch_window(&fetcher, "hg38", "chr17", 10, 100).unwrap();

        assert_eq!(start, 0);
        assert_eq!(sequence.len(), 60);
    }

    #[test]
    fn test_fetch_window_truncated_near_end() {
        // Shorter-than-requested response is tolerated
        let fetcher = fetcher(5020);
        let (sequence, start) = fetch_window(&fetcher, "hg38", "chr17", 5000, 100).unwrap();

        assert_eq!(start, 4949);
        assert_eq!(sequence.len(), 5020 - 4949);
    }

    #[test]
    fn test_fetch_past_end_is_fatal() {
        let fetcher = fetcher(100);
        let result = fetch_window(&fetcher, "hg38", "chr17", 5000, 100);
        assert!(matches!(result, Err(VescoreError::Fetch(_))));
    }
}
