// Topic-centered silhouette.
//
// A center-based silhouette where the center of each topic's cluster is the
// embedding of the topic *name*, not the mean of its members. It asks
// whether comments sit closer to the label they were given than to the
// labels they weren't, which is what a reader of the topic list experiences.

use anyhow::Result;
use tracing::debug;

use super::analysis::{mean, AnalysisResults};
use super::silhouette::{nearest, silhouette_score, Separation, TopicScore};
use crate::data::models::{Dataset, Record};
use crate::embeddings::EmbeddingCache;

/// Topic-centered silhouette analysis bound to one dataset.
pub struct TopicCenteredSilhouette<'a> {
    cache: &'a EmbeddingCache,
    dataset: &'a Dataset,
    topics: Vec<String>,
}

impl<'a> TopicCenteredSilhouette<'a> {
    pub fn new(cache: &'a EmbeddingCache, dataset: &'a Dataset) -> Self {
        Self {
            cache,
            dataset,
            topics: dataset.topics(),
        }
    }

    /// Distinct topics of the dataset, in first-appearance order.
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Mean distance from the topic name to each comment assigned it.
    pub async fn cohesion(&self, topic: &str) -> Result<f64> {
        let mut distances = Vec::new();
        for record in self.dataset.topic_records(topic) {
            distances.push(self.cache.text_distance(topic, &record.comment_text).await?);
        }
        mean(&distances)
    }

    /// Nearest topic name the comment was not assigned, and its distance.
    pub async fn comment_separation(&self, record: &Record) -> Result<Separation> {
        let mut candidates = Vec::new();
        for topic in self.topics.iter().filter(|t| !record.has_topic(t)) {
            let distance = self.cache.text_distance(topic, &record.comment_text).await?;
            candidates.push((distance, topic.as_str()));
        }
        Ok(nearest(candidates))
    }

    /// Mean comment separation over the comments assigned `topic`.
    pub async fn separation(&self, topic: &str) -> Result<f64> {
        let mut separations = Vec::new();
        for record in self.dataset.topic_records(topic) {
            separations.push(self.comment_separation(record).await?.distance);
        }
        mean(&separations)
    }

    pub async fn topic_score(&self, topic: &str) -> Result<TopicScore> {
        let cohesion = self.cohesion(topic).await?;
        let separation = self.separation(topic).await?;
        Ok(TopicScore {
            topic: topic.to_string(),
            size: self.dataset.topic_records(topic).count(),
            cohesion,
            separation,
            silhouette: silhouette_score(cohesion, separation),
        })
    }

    /// Silhouette for a single topic.
    pub async fn topic_silhouette(&self, topic: &str) -> Result<f64> {
        Ok(self.topic_score(topic).await?.silhouette)
    }

    /// Per-topic breakdown for every topic in the dataset.
    pub async fn topic_scores(&self) -> Result<Vec<TopicScore>> {
        let mut scores = Vec::with_capacity(self.topics.len());
        for topic in &self.topics {
            scores.push(self.topic_score(topic).await?);
        }
        Ok(scores)
    }

    /// Summary over all topics' silhouettes.
    pub async fn silhouette(&self) -> Result<AnalysisResults> {
        let scores: Vec<f64> = self
            .topic_scores()
            .await?
            .iter()
            .map(|s| s.silhouette)
            .collect();
        AnalysisResults::new(&scores)
    }
}

/// Topic-centered silhouette summary for one dataset.
pub async fn topic_centered_silhouette(
    cache: &EmbeddingCache,
    dataset: &Dataset,
) -> Result<AnalysisResults> {
    TopicCenteredSilhouette::new(cache, dataset).silhouette().await
}

/// Summary over each dataset's mean topic-centered silhouette.
pub async fn analyze_topic_centered_silhouette_scores(
    cache: &EmbeddingCache,
    datasets: &[Dataset],
) -> Result<AnalysisResults> {
    let mut means = Vec::with_capacity(datasets.len());
    for dataset in datasets {
        let summary = topic_centered_silhouette(cache, dataset).await?;
        debug!(dataset = %dataset.name, mean = summary.mean, "Topic-centered silhouette");
        means.push(summary.mean);
    }
    AnalysisResults::new(&means)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::StaticEmbedder;

    /// Two orthogonal topics; comment vectors are unit length so that each
    /// coordinate is the cosine similarity to that topic.
    fn two_topic_fixture() -> (EmbeddingCache, Dataset) {
        let embedder = StaticEmbedder::default()
            .with("topic1", vec![1.0, 0.0, 0.0])
            .with("topic2", vec![0.0, 1.0, 0.0])
            // distance to topic1 = 0.1, to topic2 = 0.7
            .with("comment1", vec![0.9, 0.3, 0.1_f64.sqrt()])
            // distance to topic1 = 0.8, to topic2 = 0.2
            .with("comment2", vec![0.2, 0.8, 0.32_f64.sqrt()]);
        let dataset = Dataset::new(
            "fixture",
            vec![
                Record::new(1, "comment1", ["topic1"]),
                Record::new(2, "comment2", ["topic2"]),
            ],
        )
        .unwrap();
        (EmbeddingCache::new(Box::new(embedder)), dataset)
    }

    #[tokio::test]
    async fn test_cohesion_and_separation() {
        let (cache, dataset) = two_topic_fixture();
        let analysis = TopicCenteredSilhouette::new(&cache, &dataset);
        assert!((analysis.cohesion("topic1").await.unwrap() - 0.1).abs() < 1e-9);
        assert!((analysis.separation("topic1").await.unwrap() - 0.7).abs() < 1e-9);
        assert!((analysis.cohesion("topic2").await.unwrap() - 0.2).abs() < 1e-9);
        assert!((analysis.separation("topic2").await.unwrap() - 0.8).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_silhouette_summary() {
        let (cache, dataset) = two_topic_fixture();
        let analysis = TopicCenteredSilhouette::new(&cache, &dataset);
        let s1 = analysis.topic_silhouette("topic1").await.unwrap();
        let s2 = analysis.topic_silhouette("topic2").await.unwrap();
        assert!((s1 - 0.6 / 0.7).abs() < 1e-9);
        assert!((s2 - 0.75).abs() < 1e-9);

        let r = topic_centered_silhouette(&cache, &dataset).await.unwrap();
        assert!((r.mean - (0.6 / 0.7 + 0.75) / 2.0).abs() < 1e-9);
        assert!((r.min - 0.75).abs() < 1e-9);
        assert!((r.max - 0.6 / 0.7).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_separation_selects_nearest_unassigned_topic() {
        let embedder = StaticEmbedder::default()
            .with("topic1", vec![1.0, 0.0, 0.0, 0.0])
            .with("topic2", vec![0.0, 1.0, 0.0, 0.0])
            .with("topic3", vec![0.0, 0.0, 1.0, 0.0])
            // distance to topic2 = 0.7, to topic3 = 0.5
            .with("comment", vec![0.5, 0.3, 0.5, 0.41_f64.sqrt()]);
        let cache = EmbeddingCache::new(Box::new(embedder));
        let dataset = Dataset::new(
            "three",
            vec![
                Record::new(1, "comment", ["topic1"]),
                Record::new(2, "other", ["topic2", "topic3"]),
            ],
        )
        .unwrap();
        let analysis = TopicCenteredSilhouette::new(&cache, &dataset);
        let record = dataset.get(1).unwrap();
        let sep = analysis.comment_separation(record).await.unwrap();
        assert!((sep.distance - 0.5).abs() < 1e-9);
        assert_eq!(sep.closest_topic.as_deref(), Some("topic3"));
    }

    #[tokio::test]
    async fn test_comment_with_every_topic_is_nan() {
        let embedder = StaticEmbedder::default()
            .with("topic1", vec![1.0, 0.0])
            .with("topic2", vec![0.0, 1.0])
            .with("both", vec![1.0, 1.0])
            .with("only", vec![1.0, 0.1]);
        let cache = EmbeddingCache::new(Box::new(embedder));
        let dataset = Dataset::new(
            "nan",
            vec![
                Record::new(1, "both", ["topic1", "topic2"]),
                Record::new(2, "only", ["topic1"]),
            ],
        )
        .unwrap();
        let analysis = TopicCenteredSilhouette::new(&cache, &dataset);

        let sep = analysis
            .comment_separation(dataset.get(1).unwrap())
            .await
            .unwrap();
        assert!(sep.distance.is_nan());
        assert!(sep.closest_topic.is_none());

        let summary = analysis.silhouette().await.unwrap();
        assert!(summary.has_nan(), "NaN separation must stay visible");
    }

    #[tokio::test]
    async fn test_unknown_topic_is_insufficient_data() {
        let (cache, dataset) = two_topic_fixture();
        let analysis = TopicCenteredSilhouette::new(&cache, &dataset);
        assert!(analysis.cohesion("nope").await.is_err());
    }

    #[tokio::test]
    async fn test_analyze_across_datasets() {
        let (cache, dataset) = two_topic_fixture();
        let r = analyze_topic_centered_silhouette_scores(&cache, &[dataset.clone(), dataset])
            .await
            .unwrap();
        assert!(r.stdev.abs() < 1e-12);
        assert!((r.mean - (0.6 / 0.7 + 0.75) / 2.0).abs() < 1e-9);
    }
}
