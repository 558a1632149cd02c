//! Province and territory labels.

/// `(code, display name, long name)` for every province and territory.
///
/// The display name is what widgets show; the long name is what the legacy
/// summary schema reports in its `province` field when it differs.
const PROVINCES: &[(&str, &str, &str)] = &[
    ("AB", "Alberta", "Alberta"),
    ("BC", "BC", "British Columbia"),
    ("MB", "Manitoba", "Manitoba"),
    ("NB", "New Brunswick", "New Brunswick"),
    ("NL", "NL", "Newfoundland and Labrador"),
    ("NT", "NWT", "Northwest Territories"),
    ("NS", "Nova Scotia", "Nova Scotia"),
    ("NU", "Nunavut", "Nunavut"),
    ("ON", "Ontario", "Ontario"),
    ("PE", "PEI", "Prince Edward Island"),
    ("QC", "Quebec", "Quebec"),
    ("SK", "Saskatchewan", "Saskatchewan"),
    ("YT", "Yukon", "Yukon"),
];

/// Returns the display name for a two-letter code, case-insensitively.
#[must_use]
pub fn display_name(code: &str) -> Option<&'static str> {
    PROVINCES
        .iter()
        .find(|(c, _, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, display, _)| *display)
}

/// Resolves a code from a code, display name, or long name.
#[must_use]
pub fn code_for(name: &str) -> Option<&'static str> {
    let name = name.trim();
    PROVINCES
        .iter()
        .find(|(code, display, long)| {
            code.eq_ignore_ascii_case(name)
                || display.eq_ignore_ascii_case(name)
                || long.eq_ignore_ascii_case(name)
        })
        .map(|(code, _, _)| *code)
}
