//! Line item keyword scan
//!
//! Matching is a literal substring test on lower-cased text. There is no
//! accent normalization: `"café"` matches only with the accented character,
//! exactly as the fixed term lists are written.

/// Terms that turn on the coffee flag.
pub const COFFEE_TERMS: [&str; 2] = ["café", "coffee"];

/// Terms that turn on the beer flag.
pub const BEER_TERMS: [&str; 2] = ["cerveza", "beer"];

/// Keyword flags accumulated across all line items of one document
///
/// Flags only ever turn on; a match in any single item sets the flag for the
/// whole document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeywordFlags {
    /// Any item description mentions coffee
    pub coffee: bool,

    /// Any item description mentions beer
    pub beer: bool,
}

impl KeywordFlags {
    /// Fold one item description into the flags.
    pub fn scan(&mut self, description: &str) {
        let lowered = description.to_lowercase();
        if COFFEE_TERMS.iter().any(|term| lowered.contains(term)) {
            self.coffee = true;
        }
        if BEER_TERMS.iter().any(|term| lowered.contains(term)) {
            self.beer = true;
        }
    }
}

/// Scan every line item description of one document.
pub fn scan_descriptions(descriptions: &[&str]) -> KeywordFlags {
    let mut flags = KeywordFlags::default();
    for description in descriptions {
        flags.scan(description);
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_accented_coffee_term_sets_flag() {
        let flags = scan_descriptions(&["Café de grano"]);
        assert!(flags.coffee);
        assert!(!flags.beer);
    }

    #[test]
    fn test_english_terms_match() {
        let flags = scan_descriptions(&["COFFEE BEANS 1KG", "Craft BEER six pack"]);
        assert!(flags.coffee);
        assert!(flags.beer);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let flags = scan_descriptions(&["CERVEZA ARTESANAL"]);
        assert!(flags.beer);
    }

    #[test]
    fn test_unaccented_text_does_not_match() {
        // Literal matching: "cafe" without the accent is not in the term list.
        let flags = scan_descriptions(&["Cafe molido"]);
        assert!(!flags.coffee);
    }

    #[test]
    fn test_match_in_any_item_flags_the_document() {
        let flags = scan_descriptions(&["Agua mineral", "cerveza clara", "Pan dulce"]);
        assert!(flags.beer);
        assert!(!flags.coffee);
    }

    #[test]
    fn test_no_items_means_no_flags() {
        assert_eq!(scan_descriptions(&[]), KeywordFlags::default());
    }
}
