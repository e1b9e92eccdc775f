// Categorization stability between labeling runs.
//
// Two runs over the same comments should ideally assign the same topics.
// The diff rate is the fraction of comments whose topic set changed at all;
// it doesn't measure how many assignments changed per comment.

use anyhow::Result;
use tracing::debug;

use super::analysis::AnalysisResults;
use super::unordered_pairs;
use crate::data::models::Dataset;

/// Fraction of comments in `a` whose topic set differs from the same
/// comment (by id) in `b`.
///
/// A comment of `a` missing from `b` is an error, never a silent match.
pub fn pairwise_categorization_diff(a: &Dataset, b: &Dataset) -> Result<f64> {
    if a.is_empty() {
        anyhow::bail!("Insufficient data: dataset {} has no comments", a.name);
    }

    let mut differing = 0usize;
    for record in a.records() {
        let Some(other) = b.get(record.comment_id) else {
            anyhow::bail!(
                "comment-id {} from {} not found in {}",
                record.comment_id,
                a.name,
                b.name
            );
        };
        if record.topics.symmetric_difference(&other.topics).next().is_some() {
            differing += 1;
        }
    }

    let rate = differing as f64 / a.len() as f64;
    debug!(a = %a.name, b = %b.name, differing, rate, "Categorization diff");
    Ok(rate)
}

/// Diff rate for every unordered pair of datasets, summarized.
pub fn analyze_categorization_diffs(datasets: &[Dataset]) -> Result<AnalysisResults> {
    let rates = unordered_pairs(datasets)
        .map(|(a, b)| pairwise_categorization_diff(a, b))
        .collect::<Result<Vec<_>>>()?;
    AnalysisResults::new(&rates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::models::Record;

    fn dataset(name: &str, rows: &[(i64, &[&str])]) -> Dataset {
        let records = rows
            .iter()
            .map(|(id, topics)| Record::new(*id, format!("comment {id}"), topics.iter().copied()))
            .collect();
        Dataset::new(name, records).unwrap()
    }

    #[test]
    fn test_identical_datasets_have_no_diffs() {
        let d = dataset("d", &[(1, &["topic1"]), (2, &["topic2"])]);
        assert_eq!(pairwise_categorization_diff(&d, &d).unwrap(), 0.0);
        let r = analyze_categorization_diffs(&[d.clone(), d]).unwrap();
        assert_eq!(r.mean, 0.0);
    }

    #[test]
    fn test_some_diffs() {
        let a = dataset("a", &[(1, &["topic1"]), (2, &["topic2"])]);
        let b = dataset("b", &[(1, &["topic1"]), (2, &["topic3"])]);
        let r = analyze_categorization_diffs(&[a, b]).unwrap();
        assert_eq!(r.mean, 0.5);
    }

    #[test]
    fn test_join_is_by_id_not_position() {
        let a = dataset("a", &[(1, &["x"]), (2, &["y"])]);
        let b = dataset("b", &[(2, &["y"]), (1, &["x"])]);
        assert_eq!(pairwise_categorization_diff(&a, &b).unwrap(), 0.0);
    }

    #[test]
    fn test_added_topic_counts_as_diff() {
        let a = dataset("a", &[(1, &["x"])]);
        let b = dataset("b", &[(1, &["x", "y"])]);
        assert_eq!(pairwise_categorization_diff(&a, &b).unwrap(), 1.0);
    }

    #[test]
    fn test_missing_id_is_error() {
        let a = dataset("a", &[(1, &["x"]), (3, &["y"])]);
        let b = dataset("b", &[(1, &["x"])]);
        let err = pairwise_categorization_diff(&a, &b).unwrap_err();
        assert!(err.to_string().contains("comment-id 3"), "got: {err}");
    }

    #[test]
    fn test_three_datasets_give_three_pairs() {
        let a = dataset("a", &[(1, &["x"]), (2, &["y"])]);
        let b = dataset("b", &[(1, &["x"]), (2, &["z"])]);
        let c = dataset("c", &[(1, &["w"]), (2, &["z"])]);
        // a-b: 0.5, a-c: 1.0, b-c: 0.5
        let r = analyze_categorization_diffs(&[a, b, c]).unwrap();
        assert!((r.mean - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(r.min, 0.5);
        assert_eq!(r.max, 1.0);
    }

    #[test]
    fn test_single_dataset_is_insufficient() {
        let a = dataset("a", &[(1, &["x"])]);
        assert!(analyze_categorization_diffs(&[a]).is_err());
    }
}
