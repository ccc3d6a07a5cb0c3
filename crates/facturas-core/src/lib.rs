//! Core library for CFDI invoice batch processing
//!
//! This crate provides:
//! - CFDI 4.0 XML parsing and field extraction with explicit defaults
//! - SAT verification link construction in the portal's exact format
//! - Batch tabulation with per-document failure isolation
//! - Workbook report serialization (xlsx)

pub mod batch;
pub mod cfdi;
pub mod error;
pub mod models;
pub mod xlsx;

pub use batch::{process_source, tabulate};
pub use cfdi::{CfdiExtractor, Extraction};
pub use error::{DocumentError, ExtractionError, WorkbookError};
pub use models::config::FacturasConfig;
pub use models::record::{CellValue, InvoiceRecord, InvoiceTable};
