//! Configuration structures

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FacturasConfig {
    /// Report output settings
    pub output: OutputConfig,

    /// Browser side-effect settings
    pub browser: BrowserConfig,
}

/// Report output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File name of the workbook, placed next to the first input
    pub workbook_name: String,

    /// Worksheet title inside the workbook
    pub sheet_name: String,
}

/// Browser side-effect settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Open each row's SAT verification link in a new browser tab
    pub open_links: bool,
}

impl Default for FacturasConfig {
    fn default() -> Self {
        Self {
            output: OutputConfig::default(),
            browser: BrowserConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            workbook_name: "facturas.xlsx".to_string(),
            sheet_name: "Facturas".to_string(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self { open_links: false }
    }
}

impl FacturasConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
