//! RFC shape checks
//!
//! Advisory only: extraction always keeps whatever tax ID the document
//! declares. This check feeds warnings so an operator can spot documents
//! with suspect issuer or receiver data.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // 3 letters for companies or 4 for persons (Ñ and & allowed), a six
    // digit date, and a three character homoclave.
    static ref RFC_PATTERN: Regex = Regex::new(
        r"^[A-ZÑ&]{3,4}[0-9]{6}[A-Z0-9]{3}$"
    ).unwrap();
}

/// Check whether text has the shape of a SAT RFC.
pub fn is_well_formed_rfc(rfc: &str) -> bool {
    RFC_PATTERN.is_match(rfc.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_rfc() {
        assert!(is_well_formed_rfc("AAA010101AAA"));
    }

    #[test]
    fn test_person_rfc() {
        assert!(is_well_formed_rfc("GODE561231GR8"));
    }

    #[test]
    fn test_generic_public_rfc() {
        assert!(is_well_formed_rfc("XAXX010101000"));
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert!(is_well_formed_rfc(" AAA010101AAA "));
    }

    #[test]
    fn test_malformed_rfcs() {
        assert!(!is_well_formed_rfc("N/A"));
        assert!(!is_well_formed_rfc(""));
        assert!(!is_well_formed_rfc("aaa010101aaa"));
        assert!(!is_well_formed_rfc("AAA01AAA"));
        assert!(!is_well_formed_rfc("AAAAA010101AAA"));
    }
}
