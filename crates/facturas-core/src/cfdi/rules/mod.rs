//! Field-level rules
//!
//! Small, independently testable pieces of business logic: the SAT
//! verification link, the line item keyword scan, and an advisory RFC
//! shape check.

pub mod keywords;
pub mod rfc;
pub mod verify_url;

pub use keywords::{KeywordFlags, scan_descriptions};
pub use rfc::is_well_formed_rfc;
pub use verify_url::{VERIFY_BASE_URL, build_verification_url};
