//! Edit-distance helper for "did you mean" suggestions.

/// Levenshtein distance between two strings, computed over chars with the
/// usual two-row DP.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Pick the candidate closest to `attempted`, if it is close enough to be a
/// plausible typo. "Close enough" means the distance is at most half the
/// length of the attempted name.
pub fn suggest<'a, I>(attempted: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let (best, best_distance) = candidates
        .into_iter()
        .map(|candidate| (candidate, levenshtein(attempted, candidate)))
        .min_by_key(|&(_, distance)| distance)?;

    if best_distance * 2 <= attempted.chars().count() {
        Some(best)
    } else {
        None
    }
}
