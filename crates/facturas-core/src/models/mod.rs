//! Data models for invoice records and run configuration

pub mod config;
pub mod record;
