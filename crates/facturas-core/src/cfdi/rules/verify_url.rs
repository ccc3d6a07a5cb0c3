//! SAT verification link construction
//!
//! The SAT portal validates the query string byte for byte against what it
//! derives from the stamped invoice. Parameter order, zero padding, and the
//! raw signature fragment must match exactly; any deviation makes the portal
//! report a valid invoice as not found.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::models::record::NOT_AVAILABLE;

/// Base address of the SAT verification portal.
pub const VERIFY_BASE_URL: &str =
    "https://verificacfdi.facturaelectronica.sat.gob.mx/default.aspx?";

/// Build the verification link for one stamped invoice.
///
/// Returns `"N/A"` when the UUID is the `"N/A"` sentinel, when the signature
/// is empty or shorter than eight characters, or when the total cannot be
/// read as a decimal number. An unreadable total only disables the link for
/// that row; it never fails the document.
///
/// The five query parameters appear in fixed order with no URL encoding:
/// `id` (UUID), `re` (issuer RFC), `rr` (receiver RFC), `tt` (total as a
/// 16-character zero-padded amount with six decimal places), and `fe` (the
/// last eight characters of the signature, verbatim).
pub fn build_verification_url(
    uuid: &str,
    issuer_rfc: &str,
    receiver_rfc: &str,
    total: &str,
    sello: &str,
) -> String {
    if uuid == NOT_AVAILABLE || sello.is_empty() || sello.chars().count() < 8 {
        return NOT_AVAILABLE.to_string();
    }

    let Ok(total) = Decimal::from_str(total.trim()) else {
        return NOT_AVAILABLE.to_string();
    };

    format!(
        "{}id={}&re={}&rr={}&tt={}&fe={}",
        VERIFY_BASE_URL,
        uuid.trim(),
        issuer_rfc.trim(),
        receiver_rfc.trim(),
        format_sat_total(total),
        last_chars(sello, 8),
    )
}

/// Render a total the way the SAT encodes it in QR links: six fractional
/// digits, left-padded with zeros to 16 characters overall. A minus sign
/// counts toward the width and stays in front of the padding.
fn format_sat_total(total: Decimal) -> String {
    let rendered = format!("{:.6}", total.round_dp(6));
    if rendered.len() >= 16 {
        return rendered;
    }
    let zeros = "0".repeat(16 - rendered.len());
    match rendered.strip_prefix('-') {
        Some(digits) => format!("-{}{}", zeros, digits),
        None => format!("{}{}", zeros, rendered),
    }
}

/// Last `n` characters of `text`, or all of it when shorter.
fn last_chars(text: &str, n: usize) -> &str {
    let start = text
        .char_indices()
        .rev()
        .nth(n - 1)
        .map(|(index, _)| index)
        .unwrap_or(0);
    &text[start..]
}
