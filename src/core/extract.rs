use crate::models::CandidateRecord;
use serde_json::Value;

/// Brand and comparable street pulled out of one CRM record
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFields {
    pub brand: String,
    pub street: String,
}

/// Suffix tokens that mark the tail of a `"Brand - <rest>"` name as an
/// address rather than a second brand qualifier or a city
const STREET_SUFFIX_TOKENS: &[&str] = &["st", "ave", "rd", "blvd", "dr", "way", "lane", "court"];

const NAME_SEPARATOR: &str = " - ";

/// Pull a brand name and a comparable street address out of a CRM record
///
/// The street is taken from `shippingAddress` when it parses into a mapping
/// with a non-empty `street` key (strict JSON or the loose single-quoted
/// dialect the CRM emits), otherwise from the tail of a `"Brand - <rest>"`
/// name when that tail looks like an address. A record with no comparable
/// street yields `None` and contributes no signal; name-only matches would
/// be noise, not matches.
pub fn extract_fields(record: &CandidateRecord) -> Option<ExtractedFields> {
    let (brand, name_rest) = split_brand(&record.name);

    if let Some(street) = structured_street(record.shipping_address.as_ref()) {
        return Some(ExtractedFields { brand, street });
    }

    let rest = name_rest?;
    if looks_like_street(rest) {
        return Some(ExtractedFields {
            brand,
            street: rest.to_string(),
        });
    }

    None
}

/// Split `"Brand - rest"`, returning the brand (full name when there is no
/// separator) and the raw tail, if any
fn split_brand(name: &str) -> (String, Option<&str>) {
    match name.split_once(NAME_SEPARATOR) {
        Some((brand, rest)) => (brand.trim().to_string(), Some(rest.trim())),
        None => (name.trim().to_string(), None),
    }
}

/// Heuristic: does this text plausibly denote a street address?
///
/// Requires a digit or a whole-word street-suffix token. "Downtown" fails,
/// "456 Oak Ave" passes on both counts.
fn looks_like_street(text: &str) -> bool {
    if text.chars().any(|c| c.is_ascii_digit()) {
        return true;
    }

    text.split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
        .any(|token| {
            STREET_SUFFIX_TOKENS
                .iter()
                .any(|suffix| token.eq_ignore_ascii_case(suffix))
        })
}

/// Extract a non-empty `street` value from the `shippingAddress` field
///
/// Accepts a ready-made JSON object, or a string holding either strict JSON
/// or the loose dialect (single-quoted keys/values, `True`/`False`/`None`
/// literals). Anything unparseable degrades to `None`, never an error.
fn structured_street(shipping_address: Option<&Value>) -> Option<String> {
    let value = shipping_address?;

    let parsed: Value = match value {
        Value::Object(_) => value.clone(),
        Value::String(text) => parse_address_text(text)?,
        _ => return None,
    };

    let street = parsed.get("street")?.as_str()?.trim();
    if street.is_empty() {
        return None;
    }
    Some(street.to_string())
}

/// Parse address text as strict JSON first, then as the loose dialect
fn parse_address_text(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Some(value);
    }
    serde_json::from_str(&loose_to_strict_json(text)).ok()
}

/// Rewrite the loose address dialect into strict JSON
///
/// Single-quoted string literals become double-quoted (escaping any embedded
/// double quotes), and the bare words `True`/`False`/`None` outside string
/// literals become their JSON spellings. Best-effort: the result still has
/// to survive a strict parse.
fn loose_to_strict_json(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\'' | '"' => {
                let quote = c;
                out.push('"');
                i += 1;
                while i < chars.len() && chars[i] != quote {
                    let sc = chars[i];
                    if sc == '\\' && i + 1 < chars.len() {
                        out.push('\\');
                        out.push(chars[i + 1]);
                        i += 2;
                        continue;
                    }
                    if sc == '"' {
                        out.push('\\');
                    }
                    out.push(sc);
                    i += 1;
                }
                out.push('"');
                i += 1;
            }
            _ if c.is_ascii_alphabetic() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                match word.as_str() {
                    "True" => out.push_str("true"),
                    "False" => out.push_str("false"),
                    "None" => out.push_str("null"),
                    _ => out.push_str(&word),
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}
