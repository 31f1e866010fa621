/// Similarity score in [0, 1] between two strings
///
/// Shortcuts, in order:
/// - 0.0 if either side is empty after trimming
/// - 1.0 if the lowercased, trimmed strings are identical
/// - `len(shorter) / len(longer)` when the longer string contains the
///   shorter as a substring. Containment is a strong signal worth rewarding
///   proportionally to coverage rather than to edit cost.
/// - otherwise `1 - editDistance / max(len)` with classic Levenshtein.
///
/// Lengths are counted in characters. Symmetric up to floating-point
/// rounding.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let a_len = a.chars().count();
    let b_len = b.chars().count();
    let (shorter, longer) = if a_len <= b_len { (&a, &b) } else { (&b, &a) };
    let (short_len, long_len) = (a_len.min(b_len), a_len.max(b_len));

    if longer.contains(shorter.as_str()) {
        return short_len as f64 / long_len as f64;
    }

    let distance = edit_distance(&a, &b);
    1.0 - distance as f64 / long_len as f64
}

/// Single-character insert/delete/substitute edit distance
///
/// Two-row rolling buffer over the shorter string: O(a.len() * b.len())
/// time, O(min(a.len(), b.len())) space. Inputs here are short address and
/// brand strings, so no banding is needed.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (shorter, longer) = if a_chars.len() <= b_chars.len() {
        (a_chars, b_chars)
    } else {
        (b_chars, a_chars)
    };

    if shorter.is_empty() {
        return longer.len();
    }

    let mut prev: Vec<usize> = (0..=shorter.len()).collect();
    let mut curr: Vec<usize> = vec![0; shorter.len() + 1];

    for (i, lc) in longer.iter().enumerate() {
        curr[0] = i + 1;
        for (j, sc) in shorter.iter().enumerate() {
            let substitution = prev[j] + usize::from(lc != sc);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[shorter.len()]
}
