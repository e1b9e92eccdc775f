// Topic identification and categorization evals.
//
// Stability metrics compare labeling runs pairwise (categorization diff,
// topic-set similarity). Quality metrics score each run's clustering on its
// own (topic-centered and centroid silhouette).

pub mod analysis;
pub mod categorization;
pub mod centroid;
pub mod runner;
pub mod silhouette;
pub mod topic_centered;
pub mod topic_set;

pub use analysis::{AnalysisResults, NamedResult};

/// Every unordered pair `(items[i], items[j])` with `i < j`.
pub fn unordered_pairs<T>(items: &[T]) -> impl Iterator<Item = (&T, &T)> {
    items
        .iter()
        .enumerate()
        .flat_map(move |(i, a)| items[i + 1..].iter().map(move |b| (a, b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unordered_pairs() {
        let pairs: Vec<(i32, i32)> = unordered_pairs(&[1, 2, 3]).map(|(a, b)| (*a, *b)).collect();
        assert_eq!(pairs, vec![(1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn test_unordered_pairs_short_input() {
        assert_eq!(unordered_pairs(&[1]).count(), 0);
        assert_eq!(unordered_pairs::<i32>(&[]).count(), 0);
    }
}
