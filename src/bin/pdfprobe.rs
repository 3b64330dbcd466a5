//! CLI binary for pdfeditor-probe.
//!
//! A thin shim over the library crate that maps CLI flags to `ProbeConfig`,
//! runs the four-stage workflow, and prints the stage report.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use pdfeditor_probe::{
    FileCommandClassifier, ObserverHandle, ProbeConfig, ProbeRunner, Stage, StageObserver,
    DEFAULT_BASE_URL,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI stage observer using indicatif ───────────────────────────────────────

const STAGE_COUNT: u64 = 4;

/// Terminal stage observer: one `[TAG]` line per completed stage, with an
/// optional live progress bar underneath. Stage lines go to stdout so they
/// can be grepped in CI; diagnostics stay on stderr.
struct CliObserver {
    /// `None` in `--no-progress` mode; stage lines print directly.
    bar: Option<ProgressBar>,
}

impl CliObserver {
    fn with_progress() -> Arc<Self> {
        let bar = ProgressBar::with_draw_target(Some(STAGE_COUNT), ProgressDrawTarget::stdout());
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:24.green/238}] {pos}/{len} stages  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Probing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar: Some(bar) })
    }

    fn plain() -> Arc<Self> {
        Arc::new(Self { bar: None })
    }

    fn line(&self, text: String) {
        match &self.bar {
            Some(bar) => bar.println(text),
            None => println!("{text}"),
        }
    }
}

impl StageObserver for CliObserver {
    fn on_run_start(&self, base_url: &str) {
        self.line(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Probing editor at {base_url}"))
        ));
    }

    fn on_stage_start(&self, stage: Stage) {
        if let Some(bar) = &self.bar {
            bar.set_message(stage.name().to_string());
        }
    }

    fn on_stage_complete(&self, stage: Stage, summary: &str, elapsed_ms: u64) {
        self.line(format!(
            "  {} [{}] {}  {}",
            green("✓"),
            stage.tag(),
            summary,
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn on_stage_failed(&self, stage: Stage, error: &str) {
        self.line(format!("  {} [{}] {}", red("✗"), stage.tag(), red(error)));
        // Clear the bar before main prints the stderr diagnostic.
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    fn on_run_complete(&self, total_ms: u64) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
        self.line(format!(
            "{} {}  {}",
            green("✔"),
            bold("All 4 stages passed"),
            dim(&format!("{:.1}s total", total_ms as f64 / 1000.0)),
        ));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Probe the default local backend
  pdfprobe

  # Probe a deployed backend
  pdfprobe --backend-url https://pdf.example.com

  # Same, via environment
  BACKEND_URL=https://pdf.example.com pdfprobe

  # Save the edited document, print the report as JSON
  pdfprobe -o edited.pdf --json > report.json

  # Classify the downloaded bytes with file(1) instead of the built-in sniffer
  pdfprobe --classifier file

  # CI-friendly: plain stage lines, no progress bar
  pdfprobe --no-progress

EXIT CODES:
  0  all four stages passed
  1  a stage failed; the stderr diagnostic names the stage and cause

ENVIRONMENT VARIABLES:
  BACKEND_URL  Base URL of the editor backend (default http://localhost:8080)
  RUST_LOG     Tracing filter, e.g. RUST_LOG=pdfeditor_probe=debug
"#;

/// Probe a PDF-editing backend end to end.
#[derive(Parser, Debug)]
#[command(
    name = "pdfprobe",
    version,
    about = "End-to-end probe for a PDF-editing backend",
    long_about = "Exercise a PDF-editing HTTP backend the way a real client would: upload a \
generated one-page PDF, read its page geometry back, stamp a text and an image overlay onto \
page 1, download the edited document, and verify the bytes still classify as a PDF. The first \
failing stage aborts the run with exit code 1.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Base URL of the editor backend.
    #[arg(long, env = "BACKEND_URL", default_value = DEFAULT_BASE_URL)]
    backend_url: String,

    /// Save the downloaded (edited) document to this file.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the full probe report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Per-request timeout in seconds. No timeout when unset.
    #[arg(long)]
    timeout: Option<u64>,

    /// How to classify the downloaded bytes.
    #[arg(long, value_enum, default_value = "builtin")]
    classifier: ClassifierArg,

    /// Multipart filename for the uploaded fixture.
    #[arg(long, default_value = "fixture.pdf")]
    filename: String,

    /// Disable the progress bar (stage lines still print).
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ClassifierArg {
    /// In-process magic-byte sniffer (no external dependencies).
    Builtin,
    /// Shell out to the file(1) utility.
    File,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The observer prints every stage line the user needs, so library INFO
    // logs are suppressed unless the observer is off or --verbose asks.
    let use_observer = !cli.quiet && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || use_observer {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = ProbeConfig::builder()
        .base_url(&cli.backend_url)
        .upload_filename(&cli.filename);

    if let Some(secs) = cli.timeout {
        builder = builder.timeout_secs(secs);
    }
    if matches!(cli.classifier, ClassifierArg::File) {
        builder = builder.classifier(Arc::new(FileCommandClassifier::new()));
    }
    if use_observer {
        let observer: ObserverHandle = if cli.no_progress {
            CliObserver::plain()
        } else {
            CliObserver::with_progress()
        };
        builder = builder.observer(observer);
    }

    let config = builder.build().context("Invalid configuration")?;
    let runner = ProbeRunner::new(config).context("Invalid configuration")?;

    // ── Run the probe ────────────────────────────────────────────────────
    let report = match runner.run().await {
        Ok(report) => report,
        Err(failure) => {
            eprintln!("{} {}", red("✘"), failure);
            std::process::exit(1);
        }
    };

    if let Some(ref path) = cli.output {
        save_artifact(path, &report.artifact).await?;
        if !cli.quiet {
            eprintln!(
                "   {}  →  {}",
                dim(&format!("{} bytes", report.artifact_bytes)),
                bold(&path.display().to_string()),
            );
        }
    }

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    }

    Ok(())
}

/// Atomic write: temp file in the same directory, then rename.
async fn save_artifact(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to move {} into place", tmp_path.display()))?;

    Ok(())
}
