// Pieces shared by the two silhouette variants.
//
// Both variants score multi-label clusters the same way: cohesion is
// measured from each member to its own cluster's reference point, and
// separation from each member to the nearest reference point of a topic the
// member is *not* assigned. Scores are averaged within a cluster first and
// then across clusters (see https://arxiv.org/abs/2401.05831).

use serde::Serialize;

/// Distance from one comment to the nearest topic it wasn't assigned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Separation {
    pub distance: f64,
    /// None when the comment carries every topic (or a distance was NaN).
    pub closest_topic: Option<String>,
}

impl Separation {
    /// Separation for a comment with no candidate topics.
    pub fn undefined() -> Self {
        Self {
            distance: f64::NAN,
            closest_topic: None,
        }
    }
}

/// Per-topic silhouette breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicScore {
    pub topic: String,
    /// Number of comments assigned the topic.
    pub size: usize,
    pub cohesion: f64,
    pub separation: f64,
    pub silhouette: f64,
}

/// Normalized separation/cohesion gap, nominally in [-1, 1].
///
/// NaN when either input is NaN, or when both are zero (0/0).
pub fn silhouette_score(cohesion: f64, separation: f64) -> f64 {
    (separation - cohesion) / cohesion.max(separation)
}

/// Pick the smallest distance among `(distance, topic)` candidates.
///
/// Compares by distance only; among exact ties the first candidate wins,
/// which callers should treat as arbitrary. A NaN candidate makes the whole
/// separation undefined rather than being skipped.
pub fn nearest<'a, I>(candidates: I) -> Separation
where
    I: IntoIterator<Item = (f64, &'a str)>,
{
    let mut best: Option<(f64, &str)> = None;
    for (distance, topic) in candidates {
        if distance.is_nan() {
            return Separation::undefined();
        }
        if best.is_none_or(|(d, _)| distance < d) {
            best = Some((distance, topic));
        }
    }

    match best {
        Some((distance, topic)) => Separation {
            distance,
            closest_topic: Some(topic.to_string()),
        },
        None => Separation::undefined(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silhouette_score() {
        assert!((silhouette_score(0.1, 0.7) - 0.6 / 0.7).abs() < 1e-12);
        assert!((silhouette_score(0.8, 0.2) + 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_silhouette_zero_over_zero_is_nan() {
        assert!(silhouette_score(0.0, 0.0).is_nan());
    }

    #[test]
    fn test_silhouette_nan_separation_propagates() {
        assert!(silhouette_score(0.2, f64::NAN).is_nan());
    }

    #[test]
    fn test_nearest_picks_minimum() {
        let sep = nearest([(0.7, "topic2"), (0.5, "topic3")]);
        assert_eq!(sep.distance, 0.5);
        assert_eq!(sep.closest_topic.as_deref(), Some("topic3"));
    }

    #[test]
    fn test_nearest_empty_is_undefined() {
        let sep = nearest(std::iter::empty());
        assert!(sep.distance.is_nan());
        assert!(sep.closest_topic.is_none());
    }

    #[test]
    fn test_nearest_nan_candidate_is_undefined() {
        let sep = nearest([(0.2, "a"), (f64::NAN, "b")]);
        assert!(sep.distance.is_nan());
    }
}
