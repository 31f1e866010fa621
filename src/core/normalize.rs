/// Whole-word street-suffix and directional abbreviations
///
/// Applied after punctuation stripping and whitespace collapse, so token
/// boundaries are plain spaces by the time these run.
const TOKEN_ABBREVIATIONS: &[(&str, &str)] = &[
    ("avenue", "ave"),
    ("street", "st"),
    ("drive", "dr"),
    ("boulevard", "blvd"),
    ("road", "rd"),
    ("lane", "ln"),
    ("court", "ct"),
    ("north", "n"),
    ("south", "s"),
    ("east", "e"),
    ("west", "w"),
    ("northeast", "ne"),
    ("northwest", "nw"),
    ("southeast", "se"),
    ("southwest", "sw"),
];

/// Canonicalize a free-text street address for comparison
///
/// The two sides of a comparison (user-entered address vs. CRM free text)
/// rarely agree on abbreviation style; normalizing both before scoring
/// removes the superficial mismatches without any geocoding dependency.
///
/// Pipeline, in order: lowercase and trim, strip `.`, `,` and `#`, collapse
/// whitespace runs, then abbreviate whole-word suffix/directional tokens.
/// Total and deterministic: empty or all-punctuation input yields "".
pub fn normalize_street(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();

    let stripped: String = lowered
        .chars()
        .filter(|c| !matches!(c, '.' | ',' | '#'))
        .collect();

    stripped
        .split_whitespace()
        .map(abbreviate_token)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replace a single token with its standard abbreviation, if it has one
///
/// Matching is exact per token, so "east" inside "Eastwood" is never touched.
#[inline]
fn abbreviate_token(token: &str) -> &str {
    TOKEN_ABBREVIATIONS
        .iter()
        .find(|(full, _)| *full == token)
        .map_or(token, |(_, abbr)| *abbr)
}
