//! Process command - extract data from a single CFDI file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info, warn};

use facturas_core::batch::process_source;
use facturas_core::models::record::{COLUMNS, CellValue, InvoiceRecord, NOT_AVAILABLE, flag_label};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input CFDI XML file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Report extraction warnings on stderr
    #[arg(long)]
    validate: bool,

    /// Open the SAT verification link in the browser
    #[arg(long)]
    open_link: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::config::load(config_path)?;

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let extraction = process_source(&args.input)?;

    if args.validate {
        if extraction.warnings.is_empty() {
            eprintln!("{} No issues found", style("✓").green());
        } else {
            eprintln!("{}", style("Validation issues:").yellow());
            for warning in &extraction.warnings {
                eprintln!("  - {}", warning);
            }
        }
    } else {
        for warning in &extraction.warnings {
            debug!("{}: {}", args.input.display(), warning);
        }
    }

    // Format output
    let output = format_record(&extraction.record, args.format)?;

    // Write output
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.open_link || config.browser.open_links {
        let url = &extraction.record.url_verificacion;
        if url != NOT_AVAILABLE && webbrowser::open(url).is_err() {
            warn!("Could not open browser for {}", url);
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn format_record(record: &InvoiceRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => format_text(record),
    }
}

fn format_csv(record: &InvoiceRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(COLUMNS)?;
    wtr.write_record(record.cells().iter().map(CellValue::display_text))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &InvoiceRecord) -> anyhow::Result<String> {
    let mut output = String::new();

    output.push_str(&format!("Folio: {} {}\n", record.serie, record.folio));
    output.push_str(&format!("Fecha: {}\n", record.fecha));
    output.push_str(&format!("Tipo: {}\n", record.tipo_comprobante));
    output.push_str("\n");

    output.push_str("Emisor:\n");
    output.push_str(&format!("  {}\n", record.emisor_nombre));
    output.push_str(&format!("  RFC: {}\n", record.emisor_rfc));
    output.push_str("\n");

    output.push_str("Receptor:\n");
    output.push_str(&format!("  {}\n", record.receptor_nombre));
    output.push_str(&format!("  RFC: {}\n", record.receptor_rfc));
    output.push_str("\n");

    output.push_str("Importes:\n");
    output.push_str(&format!(
        "  SubTotal:  {:.2} {}\n",
        record.sub_total.round_dp(2),
        record.moneda
    ));
    output.push_str(&format!(
        "  Descuento: {:.2} {}\n",
        record.descuento.round_dp(2),
        record.moneda
    ));
    output.push_str(&format!(
        "  Total:     {:.2} {}\n",
        record.total.round_dp(2),
        record.moneda
    ));
    output.push_str("\n");

    output.push_str("Timbre:\n");
    output.push_str(&format!("  UUID: {}\n", record.uuid));
    output.push_str(&format!("  Timbrado: {}\n", record.fecha_timbrado));
    output.push_str(&format!("  Verificación: {}\n", record.url_verificacion));
    output.push_str("\n");

    output.push_str(&format!("Conceptos: {}\n", record.conceptos));
    output.push_str(&format!(
        "Café: {}  Cerveza: {}\n",
        flag_label(record.contiene_cafe),
        flag_label(record.contiene_cerveza)
    ));

    Ok(output)
}
