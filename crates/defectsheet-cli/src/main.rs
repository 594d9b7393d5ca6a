// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Defectsheet — damage inspection report generator
//
// Entry point. Initialises logging, loads the report and its photos, and
// either prints the page plan or writes the finished PDF.

mod input;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use defectsheet_core::ReportConfig;
use defectsheet_document::{GeneratedReport, ImageIngestor, ReportGenerator};
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "defectsheet", version, about = "Generate paginated damage inspection reports")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a report to PDF.
    Generate {
        /// Report JSON file; photo paths are relative to it.
        #[arg(long)]
        report: PathBuf,

        /// Optional settings JSON file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory the PDF is written to.
        #[arg(long, default_value = ".")]
        out: PathBuf,

        /// Abort generation after this many seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Print the page plan without rendering.
    Plan {
        #[arg(long)]
        report: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!("Defectsheet v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Generate {
            report,
            config,
            out,
            timeout_secs,
        } => {
            let config = load_config(config.as_deref())?;
            let generated = generate(&report, config, timeout_secs.map(Duration::from_secs)).await?;
            let path = write_report(&out, &generated)?;
            println!(
                "{} ({} pages, sha256 {})",
                path.display(),
                generated.total_pages,
                generated.sha256
            );
        }
        Command::Plan { report, config } => {
            let config = load_config(config.as_deref())?;
            for line in plan_listing(&report, config)? {
                println!("{line}");
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ReportConfig> {
    match path {
        Some(path) => ReportConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(ReportConfig::default()),
    }
}

/// Load, ingest and render. Ctrl-C cancels between pages.
async fn generate(
    report: &Path,
    config: ReportConfig,
    timeout: Option<Duration>,
) -> Result<GeneratedReport> {
    let generator = ReportGenerator::new(config)?;
    let (document, sources) = input::load_report(report)?;
    let ingestor = ImageIngestor::from_config(generator.config());
    let images = input::ingest_photos(&sources, &ingestor)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    let generated = match timeout {
        Some(limit) => {
            generator
                .generate_with_timeout(&document, &images, &cancel, limit)
                .await?
        }
        None => generator.generate(&document, &images, &cancel).await?,
    };
    Ok(generated)
}

/// Write the PDF into `out_dir`, creating it if needed.
fn write_report(out_dir: &Path, generated: &GeneratedReport) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    let path = out_dir.join(&generated.filename);
    std::fs::write(&path, &generated.pdf)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "Report written");
    Ok(path)
}

/// A header line with the planning policy, then one line per planned page:
/// `<n>/<total> <kind> <page> [images]`.
fn plan_listing(report: &Path, config: ReportConfig) -> Result<Vec<String>> {
    let generator = ReportGenerator::new(config)?;
    let (document, _) = input::load_report(report)?;
    let plan = generator.plan(&document)?;

    let planner = generator.planner();
    let header = format!(
        "{} pages, {} images per overflow page, signatures {:?}",
        plan.total_pages(),
        planner.policy().overflow_batch_size(),
        planner.signatures()
    );
    let pages = plan
        .numbered()
        .map(|(running, page)| {
            let numbers: Vec<String> = page
                .numbered_images()
                .map(|(number, _)| number.to_string())
                .collect();
            let mut line = format!(
                "{}/{} {:<14} {}",
                running.page_number,
                running.total_pages,
                page.kind(),
                page.page_ref()
            );
            if !numbers.is_empty() {
                line.push_str(&format!(" images {}", numbers.join(",")));
            }
            if page.signing_block() {
                line.push_str(" [signed]");
            }
            line
        });
    Ok(std::iter::once(header).chain(pages).collect())
}
