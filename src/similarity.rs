/// Shortest length at which positional overlap is considered meaningful.
pub const MIN_FUZZY_LEN: usize = 3;

/// Fraction of aligned characters two words must share to count as similar.
pub const POSITIONAL_THRESHOLD: f64 = 0.7;

/// Typo-tolerant word comparison.
///
/// Two words are similar when they are equal, when either contains the other,
/// or when at least 70% of the characters of the shorter word line up with the
/// longer one position by position. Words shorter than three characters are
/// only similar through equality or containment.
///
/// This is a positional overlap, not an edit distance: a substitution is
/// tolerated, an insertion or deletion that shifts alignment usually is not.
pub fn is_similar(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    if a.contains(b) || b.contains(a) {
        return true;
    }

    let a_len = a.chars().count();
    let b_len = b.chars().count();
    let n = a_len.min(b_len);
    if n < MIN_FUZZY_LEN {
        return false;
    }

    let matches = a
        .chars()
        .zip(b.chars())
        .filter(|(x, y)| x == y)
        .count();

    matches as f64 / n as f64 >= POSITIONAL_THRESHOLD
}

/// Compares an input token against a vocabulary term (trigger, keyword or group word).
///
/// Words shorter than `MIN_FUZZY_LEN` only match exactly; otherwise "i", "an"
/// or an empty token would satisfy the containment rule against most terms.
pub fn matches_term(token: &str, term: &str) -> bool {
    if token.chars().count() < MIN_FUZZY_LEN || term.chars().count() < MIN_FUZZY_LEN {
        return token == term;
    }
    is_similar(token, term)
}
