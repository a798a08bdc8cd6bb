//! Normalized string similarity for filename comparison.
//!
//! The score is the indel ratio: insertions and deletions cost 1, a
//! substitution counts as a deletion plus an insertion. Scaled to 0..=100.

/// Maximum similarity score (identical strings)
pub const MAX_SCORE: u8 = 100;

/// Length of the longest common subsequence of two char slices.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for &a_ch in a {
        for (j, &b_ch) in b.iter().enumerate() {
            curr[j + 1] = if a_ch == b_ch {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Similarity ratio in `0..=100`, rounded to the nearest integer.
///
/// Symmetric; `ratio(x, x) == 100`; two empty strings are identical.
pub fn ratio(a: &str, b: &str) -> u8 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let total = a_chars.len() + b_chars.len();

    if total == 0 {
        return MAX_SCORE;
    }

    let common = 2 * lcs_len(&a_chars, &b_chars);
    // Integer rounding of 100 * common / total
    ((200 * common + total) / (2 * total)) as u8
}
