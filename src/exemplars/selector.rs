//! Greedy diversity reduction of a filename set.
//!
//! ## Algorithm
//!
//! 1. Score every unordered pair of filenames with [`ratio`]
//! 2. Take the most similar pair
//! 3. Of the two, drop the one with the larger total similarity to all
//!    remaining names (the most redundant one)
//! 4. Forget every score involving the dropped name, repeat until `cap` remain
//!
//! Ties are broken lexicographically so the result is stable across runs:
//! among equal pairs the smallest `(first, second)` wins, and on equal mass
//! the lexicographically greater name of the pair is dropped.

use super::similarity::ratio;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Default number of exemplars kept per category
pub const DEFAULT_EXEMPLAR_CAP: usize = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExemplarError {
    #[error("Exemplar cap must be at least 1")]
    ZeroCap,
}

/// Pairwise similarity scores keyed by unordered name pairs.
///
/// Names are stored sorted; a pair `(i, j)` always has `i < j`, so
/// iteration order is lexicographic on `(first, second)`.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    names: Vec<String>,
    alive: Vec<bool>,
    scores: BTreeMap<(usize, usize), u8>,
}

impl SimilarityMatrix {
    /// Score every distinct pair of the given names
    pub fn build(names: &BTreeSet<String>) -> Self {
        let names: Vec<String> = names.iter().cloned().collect();
        let mut scores = BTreeMap::new();

        for i in 0..names.len() {
            for j in (i + 1)..names.len() {
                scores.insert((i, j), ratio(&names[i], &names[j]));
            }
        }

        Self {
            alive: vec![true; names.len()],
            names,
            scores,
        }
    }

    /// Number of scored pairs still in the matrix
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Number of names not yet removed
    pub fn remaining(&self) -> usize {
        self.alive.iter().filter(|a| **a).count()
    }

    /// The first pair with the highest score
    fn most_similar_pair(&self) -> Option<(usize, usize)> {
        let mut best: Option<((usize, usize), u8)> = None;
        for (&pair, &score) in &self.scores {
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((pair, score)),
            }
        }
        best.map(|(pair, _)| pair)
    }

    /// Sum of scores between `idx` and every other remaining name
    fn similarity_mass(&self, idx: usize) -> u32 {
        self.scores
            .iter()
            .filter(|((a, b), _)| *a == idx || *b == idx)
            .map(|(_, &score)| score as u32)
            .sum()
    }

    /// Drop a name and every score that references it
    fn remove(&mut self, idx: usize) {
        self.alive[idx] = false;
        self.scores.retain(|(a, b), _| *a != idx && *b != idx);
    }

    /// Remove the most redundant name; returns it, or `None` if no pair is left
    pub fn remove_most_redundant(&mut self) -> Option<String> {
        let (first, second) = self.most_similar_pair()?;
        let first_mass = self.similarity_mass(first);
        let second_mass = self.similarity_mass(second);

        let victim = if first_mass > second_mass { first } else { second };
        self.remove(victim);

        Some(self.names[victim].clone())
    }

    /// Names still present, in sorted order
    pub fn into_remaining(self) -> Vec<String> {
        self.names
            .into_iter()
            .zip(self.alive)
            .filter_map(|(name, alive)| alive.then_some(name))
            .collect()
    }
}

/// Reduce `filenames` to at most `cap` maximally diverse names.
///
/// Returns the surviving names sorted. Inputs at or below the cap are
/// returned unchanged (deduplicated and sorted).
pub fn select_exemplars<I, S>(filenames: I, cap: usize) -> Result<Vec<String>, ExemplarError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    if cap == 0 {
        return Err(ExemplarError::ZeroCap);
    }

    let names: BTreeSet<String> = filenames.into_iter().map(Into::into).collect();
    if names.len() <= cap {
        return Ok(names.into_iter().collect());
    }

    let mut matrix = SimilarityMatrix::build(&names);
    while matrix.remaining() > cap {
        match matrix.remove_most_redundant() {
            Some(removed) => {
                tracing::trace!("[Exemplars] Dropped redundant name: {}", removed);
            }
            None => break,
        }
    }

    Ok(matrix.into_remaining())
}
