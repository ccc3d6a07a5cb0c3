//! Invoice record and report table structures

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sentinel for absent textual data.
pub const NOT_AVAILABLE: &str = "N/A";

/// Report column titles, in binding order.
///
/// Every serialized output (workbook, CSV, single-file dumps) uses exactly
/// this header row; [`InvoiceRecord::cells`] projects records in the same
/// order.
pub const COLUMNS: [&str; 26] = [
    "Serie",
    "Folio",
    "Fecha",
    "TipoComprobante",
    "FormaPago",
    "MetodoPago",
    "SubTotal",
    "Descuento",
    "Total",
    "Moneda",
    "TipoCambio",
    "EmisorRFC",
    "EmisorNombre",
    "EmisorRegimen",
    "ReceptorRFC",
    "ReceptorNombre",
    "ReceptorUsoCFDI",
    "ReceptorRegimen",
    "ReceptorCP",
    "UUID",
    "FechaTimbrado",
    "URLVerificacion",
    "Conceptos",
    "ImpuestosTrasladados",
    "ContieneCafe",
    "ContieneCerveza",
];

/// A fully extracted invoice, one per CFDI document
///
/// Text fields hold `"N/A"` when the source attribute is missing; amounts
/// default to zero. The record is immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Invoice series (`Serie`)
    pub serie: String,

    /// Invoice folio number (`Folio`)
    pub folio: String,

    /// Issuing date as written in the document (`Fecha`)
    pub fecha: String,

    /// Document kind code (`TipoDeComprobante`)
    pub tipo_comprobante: String,

    /// Payment form code (`FormaPago`)
    pub forma_pago: String,

    /// Payment method code (`MetodoPago`)
    pub metodo_pago: String,

    /// Amount before taxes and discounts (`SubTotal`)
    pub sub_total: Decimal,

    /// Total discount (`Descuento`)
    pub descuento: Decimal,

    /// Grand total (`Total`)
    pub total: Decimal,

    /// Currency code (`Moneda`)
    pub moneda: String,

    /// Exchange rate against MXN (`TipoCambio`, defaults to `"1"`)
    pub tipo_cambio: String,

    /// Issuer tax ID (`Emisor/@Rfc`)
    pub emisor_rfc: String,

    /// Issuer legal name (`Emisor/@Nombre`)
    pub emisor_nombre: String,

    /// Issuer tax regime code (`Emisor/@RegimenFiscal`)
    pub emisor_regimen: String,

    /// Receiver tax ID (`Receptor/@Rfc`)
    pub receptor_rfc: String,

    /// Receiver legal name (`Receptor/@Nombre`)
    pub receptor_nombre: String,

    /// CFDI usage code (`Receptor/@UsoCFDI`)
    pub receptor_uso_cfdi: String,

    /// Receiver tax regime code (`Receptor/@RegimenFiscalReceptor`)
    pub receptor_regimen: String,

    /// Receiver fiscal postal code (`Receptor/@DomicilioFiscalReceptor`)
    pub receptor_cp: String,

    /// Fiscal stamp UUID (`TimbreFiscalDigital/@UUID`)
    pub uuid: String,

    /// Stamping timestamp (`TimbreFiscalDigital/@FechaTimbrado`)
    pub fecha_timbrado: String,

    /// SAT verification link, or `"N/A"` when it cannot be built
    pub url_verificacion: String,

    /// Comma-joined line item descriptions
    pub conceptos: String,

    /// Transferred tax total as declared (`Impuestos/@TotalImpuestosTrasladados`)
    pub impuestos_trasladados: Decimal,

    /// Whether any line item mentions coffee
    pub contiene_cafe: bool,

    /// Whether any line item mentions beer
    pub contiene_cerveza: bool,
}

impl InvoiceRecord {
    /// Project the record into its 26 report cells, in header order.
    ///
    /// The keyword flags render as the Spanish labels the report uses.
    pub fn cells(&self) -> [CellValue; 26] {
        [
            CellValue::text(&self.serie),
            CellValue::text(&self.folio),
            CellValue::text(&self.fecha),
            CellValue::text(&self.tipo_comprobante),
            CellValue::text(&self.forma_pago),
            CellValue::text(&self.metodo_pago),
            CellValue::Number(self.sub_total),
            CellValue::Number(self.descuento),
            CellValue::Number(self.total),
            CellValue::text(&self.moneda),
            CellValue::text(&self.tipo_cambio),
            CellValue::text(&self.emisor_rfc),
            CellValue::text(&self.emisor_nombre),
            CellValue::text(&self.emisor_regimen),
            CellValue::text(&self.receptor_rfc),
            CellValue::text(&self.receptor_nombre),
            CellValue::text(&self.receptor_uso_cfdi),
            CellValue::text(&self.receptor_regimen),
            CellValue::text(&self.receptor_cp),
            CellValue::text(&self.uuid),
            CellValue::text(&self.fecha_timbrado),
            CellValue::text(&self.url_verificacion),
            CellValue::text(&self.conceptos),
            CellValue::Number(self.impuestos_trasladados),
            CellValue::text(flag_label(self.contiene_cafe)),
            CellValue::text(flag_label(self.contiene_cerveza)),
        ]
    }
}

/// Spanish yes/no label used for the keyword flag columns.
pub fn flag_label(flag: bool) -> &'static str {
    if flag { "Sí" } else { "No" }
}

/// A single rendered report cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Verbatim text
    Text(String),

    /// Decimal amount, shown with two decimal places
    Number(Decimal),
}

impl CellValue {
    /// Build a text cell from anything string-like.
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Flat textual rendering; amounts use exactly two decimal places.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Text(text) => text.clone(),
            CellValue::Number(value) => format!("{:.2}", value.round_dp(2)),
        }
    }
}

/// Accumulated report rows, in input order
///
/// Rows are appended as documents succeed and never merged or deduplicated.
#[derive(Debug, Clone, Default)]
pub struct InvoiceTable {
    rows: Vec<InvoiceRecord>,
}

impl InvoiceTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Append one record as the next row.
    pub fn push(&mut self, record: InvoiceRecord) {
        self.rows.push(record);
    }

    /// Data rows in insertion order.
    pub fn rows(&self) -> &[InvoiceRecord] {
        &self.rows
    }

    /// Number of data rows (the header row is not counted).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table holds no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
