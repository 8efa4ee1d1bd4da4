//! Partial location cues pulled out of free-text addresses.
//!
//! When a full address does not geocode, a ZIP code or a shorter
//! "street, city, state" / "city, state" fragment often does. These are
//! textual heuristics, not an address parser: odd formats may yield
//! nothing or a wrong substring.

use std::sync::LazyLock;

use regex::Regex;

/// A standalone five-digit ASCII token.
static ZIP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[0-9]{5}\b").expect("valid regex"));

/// `", CITY, ST <digit>"`.
static CITY_STATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([^,]+),\s*([A-Z]{2})\s*[0-9]").expect("valid regex"));

/// House number and street ending in a common street type, then city and state.
static STREET_CITY_STATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)([0-9]+\s+[^,]+(?:Rd|St|Ave|Blvd|Ln|Dr|Ct|Way|Pike|Circle|Square|Trail|Place|Highway|Parkway))[,\s]+([^,]+),\s*([A-Z]{2})",
    )
    .expect("valid regex")
});

/// Leading house number.
static HOUSE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\s+").expect("valid regex"));

/// Extracts the first standalone five-digit ZIP code.
///
/// A five-digit run followed by `-<digit>` is the head of a ZIP+4 and is
/// not returned.
#[must_use]
pub fn extract_zip(address: &str) -> Option<String> {
    ZIP_RE
        .find_iter(address)
        .find(|m| {
            let mut rest = address[m.end()..].chars();
            !(rest.next() == Some('-') && rest.next().is_some_and(|c| c.is_ascii_digit()))
        })
        .map(|m| m.as_str().to_string())
}

/// Extracts `"City, ST"` from `"..., City, ST 12345"`.
#[must_use]
pub fn extract_city_state(address: &str) -> Option<String> {
    let caps = CITY_STATE_RE.captures(address)?;
    Some(format!("{}, {}", &caps[1], &caps[2]))
}

/// Extracts `"Street, City, ST"` with the house number removed.
#[must_use]
pub fn extract_street_city_state(address: &str) -> Option<String> {
    let caps = STREET_CITY_STATE_RE.captures(address)?;
    let street = HOUSE_NUMBER_RE.replace(&caps[1], "");
    Some(format!("{street}, {}, {}", &caps[2], &caps[3]))
}
