//! Batch tabulation of CFDI sources
//!
//! Sources are processed strictly one at a time, in input order. A failing
//! source contributes an error instead of a row and never aborts the rest of
//! the batch.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::cfdi::{self, CfdiExtractor, Extraction};
use crate::error::DocumentError;
use crate::models::record::InvoiceTable;

/// Process one source end to end: read the file, parse it, extract the
/// record.
///
/// The file handle and document tree live only for the duration of this
/// call; nothing is kept open across sources.
pub fn process_source(path: &Path) -> Result<Extraction, DocumentError> {
    let text = fs::read_to_string(path).map_err(|e| DocumentError::Processing {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let document = cfdi::parse(&text).map_err(|e| DocumentError::MalformedXml {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    CfdiExtractor::new()
        .extract(&document)
        .map_err(|e| DocumentError::Processing {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
}

/// Tabulate every source into report rows plus per-source errors.
///
/// Row order follows source order, and every source lands in exactly one of
/// the two outputs: `table.len() + errors.len()` always equals
/// `sources.len()`.
pub fn tabulate(sources: &[PathBuf]) -> (InvoiceTable, Vec<DocumentError>) {
    let mut table = InvoiceTable::new();
    let mut errors = Vec::new();

    for path in sources {
        match process_source(path) {
            Ok(extraction) => {
                for warning in &extraction.warnings {
                    debug!("{}: {}", path.display(), warning);
                }
                table.push(extraction.record);
            }
            Err(error) => {
                warn!("{}", error);
                errors.push(error);
            }
        }
    }

    (table, errors)
}
