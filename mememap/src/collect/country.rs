use celes::Country;
use std::str::FromStr;
use tracing::{debug, warn};

/// Normalize a country identifier to an ISO 3166 alpha-3 code
///
/// Anything longer than three characters is treated as a country name and
/// resolved through the ISO 3166 table, which keys names without spaces
/// ("United Kingdom" is looked up as "UnitedKingdom"). Short inputs are
/// passed through as-is.
/// An unknown name yields an empty identifier: nothing is validated here, the
/// boundary download is what eventually fails.
pub fn normalize_country(country: &str) -> String {
    if country.chars().count() <= 3 {
        return country.to_string();
    }

    let compact: String = country.chars().filter(|c| !c.is_whitespace()).collect();
    match Country::from_str(&compact) {
        Ok(found) => {
            debug!("Resolved {:?} to {}", country, found.alpha3);
            found.alpha3.to_string()
        }
        Err(_) => {
            warn!("No ISO 3166 match for country {:?}", country);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_resolves_to_alpha3() {
        assert_eq!(normalize_country("Sweden"), "SWE");
        assert_eq!(normalize_country("Germany"), "DEU");
    }

    #[test]
    fn test_multi_word_names_resolve_to_alpha3() {
        assert_eq!(normalize_country("United Kingdom"), "GBR");
        assert_eq!(normalize_country("South Africa"), "ZAF");
        assert_eq!(normalize_country("New Zealand"), "NZL");
        assert_eq!(normalize_country("  Ivory Coast "), "CIV");
    }

    #[test]
    fn test_short_codes_pass_through() {
        assert_eq!(normalize_country("USA"), "USA");
        assert_eq!(normalize_country("fr"), "fr");
        assert_eq!(normalize_country(""), "");
    }

    #[test]
    fn test_unknown_name_is_empty() {
        assert_eq!(normalize_country("Atlantis Prime"), "");
    }

    #[test]
    fn test_long_inputs_never_exceed_three_chars() {
        for name in ["Sweden", "United Kingdom", "Japan"] {
            assert_eq!(normalize_country(name).chars().count(), 3, "{}", name);
        }
        for name in ["Narnia", "xxxx"] {
            assert!(normalize_country(name).is_empty(), "{}", name);
        }
    }
}
