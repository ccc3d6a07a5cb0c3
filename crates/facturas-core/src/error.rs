//! Error types for the facturas library

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while extracting fields from a parsed CFDI document
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The document root is not a CFDI 4.0 `Comprobante`
    #[error("root element '{0}' is not a CFDI 4.0 Comprobante")]
    UnexpectedRoot(String),

    /// A monetary attribute could not be read as a decimal number
    #[error("invalid decimal in {field}: '{value}'")]
    InvalidNumber {
        /// Attribute name as it appears in the document
        field: &'static str,
        /// Verbatim attribute text
        value: String,
    },
}

/// Per-source failures collected during a batch run
///
/// A failed source never aborts the run; its error is reported next to the
/// rows extracted from the sources that did succeed.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The source could not be parsed as XML at all
    #[error("{}: malformed XML: {detail}", path.display())]
    MalformedXml {
        /// Source file
        path: PathBuf,
        /// Parser diagnostic
        detail: String,
    },

    /// The source was readable XML but could not be processed
    #[error("{}: {detail}", path.display())]
    Processing {
        /// Source file
        path: PathBuf,
        /// What went wrong
        detail: String,
    },
}

impl DocumentError {
    /// Source file the failure belongs to.
    pub fn path(&self) -> &Path {
        match self {
            DocumentError::MalformedXml { path, .. } => path,
            DocumentError::Processing { path, .. } => path,
        }
    }
}

/// Errors raised while serializing the workbook report
#[derive(Error, Debug)]
pub enum WorkbookError {
    /// An XML part could not be serialized
    #[error("workbook XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The zip container could not be assembled
    #[error("workbook container error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The workbook file could not be written
    #[error("workbook I/O error: {0}")]
    Io(#[from] std::io::Error),
}
