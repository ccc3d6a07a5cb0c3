//! Batch command - extract many CFDI files into one report.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use facturas_core::batch::process_source;
use facturas_core::models::config::FacturasConfig;
use facturas_core::models::record::{
    COLUMNS, CellValue, InvoiceRecord, InvoiceTable, NOT_AVAILABLE,
};
use facturas_core::xlsx;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input XML files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Report file (default: facturas.xlsx next to the first input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "xlsx")]
    format: ReportFormat,

    /// Open each row's SAT verification link in the browser
    #[arg(long)]
    open_links: bool,

    /// Open the finished report with the system handler
    #[arg(long)]
    open: bool,

    /// Also generate a per-file summary CSV
    #[arg(long)]
    summary: bool,
}

/// Report serialization format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ReportFormat {
    /// Spreadsheet workbook
    Xlsx,
    /// Comma separated values
    Csv,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    record: Option<InvoiceRecord>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::config::load(config_path)?;

    let files = expand_inputs(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("No CFDI files found for: {}", args.inputs.join(", "));
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let output_path = resolve_output_path(&args, &config, &files);

    // Set up progress bar
    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    // Process files sequentially, isolating per-file failures
    let mut results = Vec::with_capacity(files.len());
    for path in files {
        let file_start = Instant::now();
        let outcome = process_source(&path);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match outcome {
            Ok(extraction) => {
                for warning in &extraction.warnings {
                    debug!("{}: {}", path.display(), warning);
                }
                results.push(ProcessResult {
                    path,
                    record: Some(extraction.record),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                warn!("{}", e);
                results.push(ProcessResult {
                    path,
                    record: None,
                    error: Some(e.to_string()),
                    processing_time_ms,
                });
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    let mut table = InvoiceTable::new();
    for result in &results {
        if let Some(record) = &result.record {
            table.push(record.clone());
        }
    }
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    // Write the report; a failure here aborts the run
    match args.format {
        ReportFormat::Xlsx => {
            xlsx::write_workbook(&output_path, &table, &config.output.sheet_name)?
        }
        ReportFormat::Csv => write_csv(&output_path, &table)?,
    }

    if args.open_links || config.browser.open_links {
        open_verification_links(&table);
    }

    if args.summary {
        let summary_path = output_path
            .parent()
            .unwrap_or(Path::new("."))
            .join("summary.csv");
        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    // Print summary
    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} rows written, {} failed",
        style(table.len()).green(),
        style(failed.len()).red()
    );
    println!(
        "{} Report written to {}",
        style("✓").green(),
        output_path.display()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    if args.open {
        open_report(&output_path);
    }

    Ok(())
}

/// Expand every input argument as a glob pattern, keeping argument order.
fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in inputs {
        let matches: Vec<PathBuf> = glob(pattern)?
            .filter_map(|entry| entry.ok())
            .filter(|path| {
                let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
                ext.eq_ignore_ascii_case("xml")
            })
            .collect();

        if matches.is_empty() {
            warn!("No XML files match: {}", pattern);
        }
        files.extend(matches);
    }
    Ok(files)
}

/// Default output location: the configured file name next to the first
/// input, with the extension following the report format.
fn resolve_output_path(args: &BatchArgs, config: &FacturasConfig, files: &[PathBuf]) -> PathBuf {
    if let Some(path) = &args.output {
        return path.clone();
    }

    let dir = files[0].parent().unwrap_or(Path::new("."));
    let mut path = dir.join(&config.output.workbook_name);
    if matches!(args.format, ReportFormat::Csv) {
        path.set_extension("csv");
    }
    path
}

/// Open each row's verification link in a new browser tab.
fn open_verification_links(table: &InvoiceTable) {
    for record in table.rows() {
        if record.url_verificacion == NOT_AVAILABLE {
            continue;
        }
        if webbrowser::open(&record.url_verificacion).is_err() {
            warn!("Could not open browser for {}", record.uuid);
        }
    }
}

/// Open the report with the platform's default handler.
fn open_report(path: &Path) {
    #[cfg(target_os = "windows")]
    let result = std::process::Command::new("cmd")
        .args(["/C", "start", ""])
        .arg(path)
        .spawn();
    #[cfg(target_os = "macos")]
    let result = std::process::Command::new("open").arg(path).spawn();
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let result = std::process::Command::new("xdg-open").arg(path).spawn();

    if let Err(e) = result {
        warn!("Could not open {}: {}", path.display(), e);
    }
}

/// Flat CSV rendition of the report, same columns as the workbook.
fn write_csv(path: &Path, table: &InvoiceTable) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(COLUMNS)?;
    for record in table.rows() {
        wtr.write_record(record.cells().iter().map(CellValue::display_text))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Per-file status CSV, one line per input.
fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "uuid",
        "folio",
        "total",
        "url_verificacion",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(record) = &result.record {
            wtr.write_record([
                filename,
                "success",
                &record.uuid,
                &record.folio,
                &format!("{:.2}", record.total.round_dp(2)),
                &record.url_verificacion,
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
