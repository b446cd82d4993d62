//! `relocate` command line tool
//!
//! ```text
//! relocate <ORIGINAL> <VARIANT>... <LABEL>
//! ```
//!
//! Prints the best match of LABEL in every VARIANT, one line per variant. When
//! the last argument names an existing file it is read as a variant and the
//! label defaults to `make-everything-ok-button`.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use relocate::report::{self, Format};
use relocate::{FailurePolicy, MatchConfig, MatchError, DEFAULT_LABEL};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Find a labeled element again in mutated copies of a document",
    long_about = None,
    override_usage = "relocate [OPTIONS] <ORIGINAL> <VARIANT>... [LABEL]"
)]
struct Args {
    /// Original document, then one or more variants, then the label
    #[arg(required = true, num_args = 2.., value_name = "INPUT")]
    inputs: Vec<String>,

    /// Matches to report per variant
    #[arg(long, default_value_t = 1)]
    limit: usize,

    /// Minimum score a match needs to be reported
    #[arg(long, default_value_t = 0.0)]
    threshold: f64,

    /// What to do when a variant cannot be matched
    #[arg(long = "on-error", value_enum, default_value_t = OnError::Abort)]
    on_error: OnError,

    /// Match variants on all cores
    #[arg(long)]
    parallel: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Include per-feature scores
    #[arg(long)]
    explain: bool,

    /// More logging on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OnError {
    Abort,
    Skip,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Text,
    Json,
}

/// Original file, variant files and the label, after applying the
/// default-label rule
#[derive(Debug, PartialEq)]
struct Invocation {
    original: PathBuf,
    variants: Vec<PathBuf>,
    label: String,
}

fn split_inputs(inputs: &[String]) -> Result<Invocation> {
    let Some((original, rest)) = inputs.split_first() else {
        bail!("missing original document");
    };
    let Some(last) = rest.last() else {
        bail!("missing variant document");
    };

    let (variants, label) = if Path::new(last).is_file() {
        (rest, DEFAULT_LABEL.to_string())
    } else {
        (&rest[..rest.len() - 1], last.clone())
    };
    if variants.is_empty() {
        bail!("missing variant document");
    }

    Ok(Invocation {
        original: PathBuf::from(original),
        variants: variants.iter().map(PathBuf::from).collect(),
        label,
    })
}

/// Read one variant; a failure stays with that variant
fn load_variant(path: &Path) -> relocate::Result<Vec<u8>> {
    std::fs::read(path).map_err(|err| MatchError::Unreadable {
        path: path.display().to_string(),
        reason: err.to_string(),
    })
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    let invocation = split_inputs(&args.inputs)?;
    let config = MatchConfig {
        limit: args.limit,
        threshold: args.threshold,
        failure_policy: match args.on_error {
            OnError::Abort => FailurePolicy::Abort,
            OnError::Skip => FailurePolicy::Skip,
        },
        parallel: args.parallel,
        explain: args.explain,
        ..MatchConfig::default()
    };
    config.validate()?;
    let format = match args.format {
        OutputFormat::Text => Format::Text,
        OutputFormat::Json => Format::Json,
    };

    let original = std::fs::read(&invocation.original)
        .with_context(|| format!("failed to read {}", invocation.original.display()))?;
    let fp = relocate::learn(&original, &invocation.label)
        .with_context(|| format!("cannot use label in {}", invocation.original.display()))?;
    drop(original);

    let contents: Vec<relocate::Result<Vec<u8>>> =
        invocation.variants.iter().map(|path| load_variant(path)).collect();

    let reports = relocate::match_loaded(&fp, &contents, &config)?;
    debug!(reports = reports.len(), "matching finished");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for variant in &reports {
        let name = invocation.variants[variant.index].display().to_string();
        for line in report::render_variant(&name, &variant.matches, format)? {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(err) = run(args) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
