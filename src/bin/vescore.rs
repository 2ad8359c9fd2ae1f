//! CLI binary for single-variant effect analysis

use clap::Parser;
use env_logger::Env;
use vescore_rs::{
    fetch::UcscFetcher,
    pipeline::analyze_variant,
    scoring::HttpScoringClient,
    utils::Timer,
    CalibrationParams, Variant, VescoreError, VescoreResult, DEFAULT_WINDOW_SIZE,
};

#[derive(Parser)]
#[command(name = "vescore")]
#[command(about = "Variant effect scoring: classify a single SNV from sequence likelihoods")]
#[command(long_about = "
Estimates the functional effect of a single-nucleotide variant. The tool
fetches a reference genome window around the variant position from the UCSC
sequence API, asks a remote sequence-likelihood scoring service for the
log-likelihood of the reference window and the window with the alternative
base substituted in, and classifies the likelihood difference (delta score)
against a calibrated threshold.

The calibration defaults are a frozen snapshot of a calibration run over the
BRCA1 saturation mutagenesis dataset; use the `calibrate` tool to produce
fresh parameters from your own labeled variant table and pass them via the
--threshold / --lof-std / --func-std options.

The result is printed to stdout as a single JSON object with the resolved
reference base, the delta score, the prediction and a confidence in [0, 1].
")]
struct Args {
    /// 1-based variant position on the chromosome
    #[arg(long)]
    position: u32,

    /// Alternative base (A, C, G or T)
    #[arg(long)]
    alternative: char,

    /// Genome build identifier, e.g. hg38
    #[arg(long, default_value = "hg38")]
    genome: String,

    /// Chromosome identifier, e.g. chr17
    #[arg(long)]
    chromosome: String,

    /// URL of the sequence scoring endpoint
    #[arg(long, value_name = "URL")]
    scoring_url: String,

    /// Number of bases in the scoring window
    #[arg(long, default_value_t = DEFAULT_WINDOW_SIZE)]
    window_size: usize,

    /// Delta-score decision threshold
    #[arg(long, default_value_t = CalibrationParams::default().threshold)]
    threshold: f64,

    /// Spread of delta scores among loss-of-function examples
    #[arg(long, default_value_t = CalibrationParams::default().lof_std)]
    lof_std: f64,

    /// Spread of delta scores among functional examples
    #[arg(long, default_value_t = CalibrationParams::default().func_std)]
    func_std: f64,

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

    log::info!("Starting single-variant analysis");
    log::info!("Genome: {}", args.genome);
    log::info!("Chromosome: {}", args.chromosome);
    log::info!("Variant position: {}", args.position);
    log::info!("Variant alternative: {}", args.alternative);

    if args.position < 1 {
        return Err(VescoreError::InvalidVariant(
            "position must be >= 1".to_string(),
        ));
    }
    let alternative = args.alternative.to_ascii_uppercase();
    if !Variant::is_valid_base(alternative) {
        return Err(VescoreError::InvalidVariant(format!(
            "alternative must be one of A, C, G, T; got '{}'",
            args.alternative
        )));
    }

    let params = CalibrationParams {
        threshold: args.threshold,
        lof_std: args.lof_std,
        func_std: args.func_std,
    };
    params.validate()?;

    let fetcher = UcscFetcher::new()?;
    let client = HttpScoringClient::new(&args.scoring_url)?;
    let variant = Variant::new(args.chromosome.clone(), args.position, None, alternative);

    let _timer = Timer::new("Single-variant analysis");
    let result = analyze_variant(
        &fetcher,
        &client,
        &args.genome,
        &variant,
        args.window_size,
        &params,
    )?;

    log::info!(
        "Delta score {:.10} classified as {} (confidence {:.3})",
        result.delta_score,
        result.prediction,
        result.classification_confidence
    );

    let json = serde_json::to_string_pretty(&result).map_err(|e| {
        VescoreError::InvalidVariant(format!("could not serialize result: {}", e))
    })?;
    println!("{}", json);

    Ok(())
}

/// Handle application errors and provide user-friendly messages
fn handle_error(error: VescoreError) -> ! {
    match error {
        VescoreError::OutOfBounds { .. } => {
            eprintln!("Error: {}", error);
            eprintln!("The fetched genome window does not cover the requested position.");
            eprintln!("Check the chromosome name and position against the genome build.");
        }
        VescoreError::Fetch(ref msg) => {
            eprintln!("Error: Sequence fetch failed: {}", msg);
            eprintln!("Check the genome build and chromosome identifiers, and your network connection.");
        }
        VescoreError::ScoringUnavailable(ref msg) => {
            eprintln!("Error: Scoring service unavailable: {}", msg);
            eprintln!("Check that the scoring endpoint is running and reachable.");
        }
        VescoreError::InvalidCalibration(ref msg) => {
            eprintln!("Error: Invalid calibration parameters: {}", msg);
            eprintln!("Both --lof-std and --func-std must be positive.");
        }
        VescoreError::InvalidVariant(ref msg) => {
            eprintln!("Error: Invalid variant: {}", msg);
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
