//! CFDI 4.0 document handling
//!
//! Parsing, the per-element schema, field-level rules, and the extractor
//! that maps one parsed document to a flat [`InvoiceRecord`].
//!
//! [`InvoiceRecord`]: crate::models::record::InvoiceRecord

pub mod extractor;
pub mod rules;
pub mod schema;

pub use extractor::{CfdiExtractor, Extraction};

use crate::error::ExtractionError;

/// Namespace URIs fixed by the CFDI 4.0 standard.
pub mod ns {
    /// Invoice body namespace (prefix `cfdi`)
    pub const CFDI: &str = "http://www.sat.gob.mx/cfd/4";

    /// Digital stamp complement namespace (prefix `tfd`)
    pub const TFD: &str = "http://www.sat.gob.mx/TimbreFiscalDigital";
}

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Parse CFDI XML text into a document tree.
///
/// Tolerates a leading UTF-8 byte order mark, which some stamping providers
/// emit in front of the declaration.
pub fn parse(xml: &str) -> std::result::Result<roxmltree::Document<'_>, roxmltree::Error> {
    roxmltree::Document::parse(xml.trim_start_matches('\u{feff}'))
}
