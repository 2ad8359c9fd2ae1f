//! CLI binary for batch calibration over a labeled variant table

use clap::Parser;
use env_logger::Env;
use std::path::PathBuf;
use vescore_rs::{
    calibrate::calibrate,
    dataset::{read_fasta_sequence, read_labeled_variants, write_delta_scores},
    pipeline::batch_delta_scores,
    scoring::HttpScoringClient,
    utils::{ensure_parent_dirs, validate_file_readable, Timer},
    VescoreError, VescoreResult, DEFAULT_WINDOW_SIZE,
};

#[derive(Parser)]
#[command(name = "calibrate")]
#[command(about = "Calibrate the delta-score threshold from a labeled variant table")]
#[command(long_about = "
Runs the batch variant-effect pipeline over a labeled SNV table and derives
classification parameters from the resulting delta scores.

For every table row a reference window is sliced out of the supplied
chromosome FASTA sequence and the variant window is built by substituting the
alternative base. Identical reference windows (from neighboring variants) are
scored only once. The scoring service receives one batch of unique reference
windows and one batch of variant windows; the per-variant delta score is the
variant log-likelihood minus the matching reference log-likelihood.

ROC analysis over the labeled delta scores yields the AUROC, an operating
threshold selected by Youden's J statistic, and the per-class score spreads
used as confidence scales. The parameters are printed to stdout as JSON and
the per-variant delta scores are written to the output TSV.

The variant table is tab-separated with a header line containing chrom, pos,
ref, alt and class columns; class is LOF, FUNC, INT or FUNC/INT. Any
malformed row aborts the run.
")]
struct Args {
    /// Path to the labeled variant table (TSV, optionally gzipped)
    #[arg(long, value_name = "FILE")]
    variants: PathBuf,

    /// Path to the chromosome FASTA file (optionally gzipped)
    #[arg(long, value_name = "FILE")]
    fasta: PathBuf,

    /// URL of the sequence scoring endpoint
    #[arg(long, value_name = "URL")]
    scoring_url: String,

    /// Path to the output delta-score TSV file
    #[arg(long, value_name = "FILE")]
    output: PathBuf,

    /// Number of bases in the scoring window
    #[arg(long, default_value_t = DEFAULT_WINDOW_SIZE)]
    window_size: usize,

    /// Only calibrate on the first N table rows
    #[arg(long, value_name = "N")]
    limit: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn run() -> VescoreResult<()> {
    let args = Args::parse();

    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_secs()
        .init();

    log::info!("Starting batch calibration");
    log::info!("Variant table: {:?}", args.variants);
    log::info!("Chromosome FASTA: {:?}", args.fasta);
    log::info!("Output: {:?}", args.output);

    validate_file_readable(&args.variants)?;
    validate_file_readable(&args.fasta)?;
    ensure_parent_dirs(&args.output)?;

    let _timer = Timer::new("Reading inputs");
    let mut labeled = read_labeled_variants(&args.variants)?;
    if let Some(limit) = args.limit {
        labeled.truncate(limit);
    }
    log::info!("Read {} labeled variants", labeled.len());

    let chromosome = read_fasta_sequence(&args.fasta)?;
    log::info!("Read chromosome sequence ({} bases)", chromosome.len());

    let client = HttpScoringClient::new(&args.scoring_url)?;
    let variants: Vec<_> = labeled.iter().map(|l| l.variant.clone()).collect();

    let _timer = Timer::new("Scoring delta likelihoods");
    let deltas = batch_delta_scores(&variants, &chromosome, args.window_size, &client)?;

    let _timer = Timer::new("Calibrating threshold");
    let labels: Vec<_> = labeled.iter().map(|l| l.class).collect();
    let (params, auroc) = calibrate(&deltas, &labels)?;

    write_delta_scores(&labeled, &deltas, &args.output)?;
    log::info!("Delta scores written to: {:?}", args.output);

    let summary = serde_json::json!({
        "threshold": params.threshold,
        "lof_std": params.lof_std,
        "func_std": params.func_std,
        "auroc": auroc,
        "variants": labeled.len(),
    });
    println!("{}", serde_json::to_string_pretty(&summary).map_err(|e| {
        VescoreError::InvalidVariant(format!("could not serialize summary: {}", e))
    })?);

    Ok(())
}

/// Handle application errors and provide user-friendly messages
fn handle_error(error: VescoreError) -> ! {
    match error {
        VescoreError::FileNotFound(ref path) => {
            eprintln!("Error: File not found: {}", path);
            eprintln!("Please check that the file exists and is readable.");
        }
        VescoreError::InvalidVariant(ref msg) => {
            eprintln!("Error: Invalid variant table: {}", msg);
            eprintln!("Calibration aborts on the first malformed row; fix the table and rerun.");
        }
        VescoreError::InsufficientData(ref msg) => {
            eprintln!("Error: Insufficient calibration data: {}", msg);
            eprintln!("The table needs at least two rows covering both classes.");
        }
        VescoreError::DegenerateDistribution(ref msg) => {
            eprintln!("Error: Degenerate score distribution: {}", msg);
            eprintln!("Each class needs at least two examples for a usable spread.");
        }
        VescoreError::ScoringUnavailable(ref msg) => {
            eprintln!("Error: Scoring service unavailable: {}", msg);
            eprintln!("Check that the scoring endpoint is running and reachable.");
        }
        VescoreError::OutOfBounds { .. } => {
            eprintln!("Error: {}", error);
            eprintln!("A table position falls outside the supplied chromosome sequence.");
        }
        ref other => {
            eprintln!("Error: {}", other);
        }
    }
    std::process::exit(1);
}

fn main() {
    if let Err(e) = run() {
        handle_error(e);
    }
}
