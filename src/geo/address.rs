//! Address text helpers: cleaning, ZIP and city extraction.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static SUFFIXES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        ("Aly", "Alley"),
        ("Ave", "Avenue"),
        ("Blvd", "Boulevard"),
        ("Cir", "Circle"),
        ("Ct", "Court"),
        ("Dr", "Drive"),
        ("Ln", "Lane"),
        ("Pkwy", "Parkway"),
        ("Pl", "Place"),
        ("Rd", "Road"),
        ("St", "Street"),
        ("Trl", "Trail"),
    ]
    .into_iter()
    .map(|(abbrev, full)| {
        let re = Regex::new(&format!(r"(?i) {}\b", abbrev)).unwrap();
        (re, full)
    })
    .collect()
});

static ZIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{5})\b").unwrap());

static STATE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i),\s*.*?(TN|Tennessee).*$").unwrap());

static CITY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i),\s*([A-Za-z\s]+)\s+TN\s*,?\s*\d{5}",
        r"(?i),\s*([A-Za-z\s]+)\s*,\s*TN",
        r"(?i),\s*([A-Za-z\s]+)\s+Tennessee",
        r"(?i)\b([A-Za-z\s]+),\s*Tennessee\s*\d{5}",
    ]
    .into_iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static TRAILING_STATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+(TN|Tennessee)$").unwrap());

/// Collapse whitespace and spell out common street-suffix abbreviations.
pub fn clean_address(address: &str) -> String {
    let mut cleaned = WHITESPACE.replace_all(address, " ").trim().to_string();
    for (re, full) in SUFFIXES.iter() {
        let replacement = format!(" {}", full);
        cleaned = re.replace_all(&cleaned, replacement.as_str()).into_owned();
    }
    cleaned
}

/// The first standalone five-digit run in the address.
pub fn extract_zip(address: &str) -> Option<&str> {
    ZIP.captures(address)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Drop everything from the first comma that precedes a state marker.
///
/// "12 Elm St, Antioch, TN 37013" becomes "12 Elm St". Addresses without a
/// state marker come back unchanged.
pub fn strip_state_suffix(address: &str) -> String {
    STATE_SUFFIX.replace(address, "").into_owned()
}

/// Pull a city name out of a Tennessee street address, title-cased.
/// Returns an empty string when no pattern matches.
pub fn extract_city(address: &str) -> String {
    for re in CITY_PATTERNS.iter() {
        if let Some(m) = re.captures(address).and_then(|c| c.get(1)) {
            let city = m.as_str().trim();
            let city = TRAILING_STATE.replace(city, "");
            return title_case(city.trim());
        }
    }
    String::new()
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_address_suffixes() {
        assert_eq!(clean_address("123  Main St"), "123 Main Street");
        assert_eq!(clean_address("9 Oak ave, Smyrna"), "9 Oak Avenue, Smyrna");
        assert_eq!(clean_address("1 Hill Rd."), "1 Hill Road.");
        assert_eq!(clean_address("\t44 Maple Ln \n"), "44 Maple Lane");
    }

    #[test]
    fn test_clean_address_word_boundary() {
        // "Stone" and "Drake" must not be touched.
        assert_eq!(clean_address("7 Stone Drake Way"), "7 Stone Drake Way");
        assert_eq!(clean_address("5 Court Square"), "5 Court Square");
    }

    #[test]
    fn test_extract_zip() {
        assert_eq!(extract_zip("123 Main St, Nashville, TN 37201"), Some("37201"));
        assert_eq!(extract_zip("123 Main St, Nashville"), None);
        assert_eq!(extract_zip("ZIP 372011"), None);
    }

    #[test]
    fn test_strip_state_suffix() {
        assert_eq!(strip_state_suffix("12 Elm St, Antioch, TN 37013"), "12 Elm St");
        assert_eq!(strip_state_suffix("12 Elm St, Tennessee"), "12 Elm St");
        assert_eq!(strip_state_suffix("12 Elm St"), "12 Elm St");
    }

    #[test]
    fn test_extract_city_patterns() {
        assert_eq!(extract_city("123 Main St, Nashville, TN 37201"), "Nashville");
        assert_eq!(extract_city("55 Lake Dr, MT JULIET TN 37122"), "Mt Juliet");
        assert_eq!(extract_city("8 Pine Ct, Hermitage Tennessee"), "Hermitage");
        assert_eq!(extract_city("8 Pine Ct, la vergne, tn"), "La Vergne");
    }

    #[test]
    fn test_extract_city_none() {
        assert_eq!(extract_city("456 Oak Ave"), "");
        assert_eq!(extract_city(""), "");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("old HICKORY"), "Old Hickory");
        assert_eq!(title_case("o'neil"), "O'Neil");
    }
}
