//! Pact mock server mismatch viewer
//!
//! Renders the verification failure payload returned by a mock server's
//! `GET /interactions/verification` endpoint.
//!
//! Usage:
//!   pact-mismatch [FILE] [OPTIONS]
//!   curl -s localhost:1234/interactions/verification | pact-mismatch

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pact_consumer::{MismatchReport, VerificationErrorKind};
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Pact mismatch viewer
#[derive(Parser, Debug)]
#[command(name = "pact-mismatch")]
#[command(
    author,
    version,
    about = "Render mock server verification failures in a readable form"
)]
struct Args {
    /// File holding the mismatch payload (reads stdin when omitted)
    path: Option<PathBuf>,

    /// When to use ANSI colors
    #[arg(long, value_enum, default_value = "auto", env = "PACT_MISMATCH_COLOR")]
    color: ColorChoice,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Colors unless NO_COLOR is set
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    fn plain(self) -> bool {
        match self {
            ColorChoice::Auto => std::env::var_os("NO_COLOR").is_some(),
            ColorChoice::Always => false,
            ColorChoice::Never => true,
        }
    }
}

struct Palette {
    red: &'static str,
    yellow: &'static str,
    green: &'static str,
    cyan: &'static str,
    bold: &'static str,
    dim: &'static str,
    reset: &'static str,
}

impl Palette {
    fn new(plain: bool) -> Self {
        if plain {
            Self {
                red: "",
                yellow: "",
                green: "",
                cyan: "",
                bold: "",
                dim: "",
                reset: "",
            }
        } else {
            Self {
                red: RED,
                yellow: YELLOW,
                green: GREEN,
                cyan: CYAN,
                bold: BOLD,
                dim: DIM,
                reset: RESET,
            }
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let payload = read_payload(args.path.as_ref())?;
    debug!("Read {} byte mismatch payload", payload.len());

    let palette = Palette::new(args.color.plain());

    if payload.iter().all(u8::is_ascii_whitespace) {
        println!(
            "{}{}No mismatches reported{}",
            palette.green, palette.bold, palette.reset
        );
        return Ok(());
    }

    let report = MismatchReport::decode(&payload);
    print_report(&report, &palette);

    std::process::exit(1);
}

fn read_payload(path: Option<&PathBuf>) -> Result<Vec<u8>> {
    match path {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn print_report(report: &MismatchReport, p: &Palette) {
    println!(
        "{}{}Actual request does not match expected interactions...{}",
        p.bold, p.red, p.reset
    );

    for entry in report.entries() {
        let actual = match (entry.kind, report.raw_payload()) {
            (VerificationErrorKind::MockServerParsingFailed, Some(raw)) => raw.to_string(),
            _ => entry.actual_request(),
        };

        println!();
        println!("{}Reason:{}", p.dim, p.reset);
        println!("\t{}{}{}{}", p.bold, p.yellow, entry.kind.reason(), p.reset);
        println!("{}Request:{}", p.dim, p.reset);
        println!("\t{}{}{}", p.cyan, entry.expected_request(), p.reset);
        println!("{}Error:{}", p.dim, p.reset);
        println!("\t{}{}{}", p.red, actual, p.reset);
    }

    println!();
    println!(
        "{}{}{} mismatch(es){}",
        p.bold,
        p.red,
        report.entries().len(),
        p.reset
    );
}
