//! REGEX/REPLACE pattern safety: reject nested quantifiers and
//! over-long patterns before handing them to the regex engine, to
//! prevent catastrophic backtracking.

/// Patterns longer than this are rejected outright.
const MAX_PATTERN_LENGTH: usize = 512;

/// Returns `false` if `pattern` exceeds the length bound or contains a
/// group wrapping its own unbounded quantifier followed by another
/// unbounded quantifier — the textbook `(a+)+`/`(a*)*`/`(a+)*`/`(a*)+`
/// shapes that blow up backtracking regex engines.
#[must_use]
pub fn is_safe_pattern(pattern: &str) -> bool {
    if pattern.len() > MAX_PATTERN_LENGTH {
        return false;
    }
    !has_nested_quantifier(pattern)
}

fn has_nested_quantifier(pattern: &str) -> bool {
    let chars: Vec<char> = pattern.chars().collect();
    let mut group_starts = Vec::new();

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '(' => group_starts.push(i),
            ')' => {
                let Some(start) = group_starts.pop() else { continue };
                let inner_has_quantifier = chars[start + 1..i].iter().any(|&c| c == '+' || c == '*');
                let followed_by_quantifier = chars.get(i + 1).is_some_and(|&c| c == '+' || c == '*');
                if inner_has_quantifier && followed_by_quantifier {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}
