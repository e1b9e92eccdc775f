// Centroid-based silhouette for multi-topic classifications.
//
// Data points are comment text embeddings; each topic's center is the mean
// embedding of the comments assigned to it. A comment with several topics
// contributes to the cohesion of each of them, and its separation is taken
// over the topics it was *not* assigned.
//
// Centroids are computed on first use and kept for the lifetime of the
// analysis, which is bound to a single dataset.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use super::analysis::{mean, AnalysisResults};
use super::silhouette::{nearest, silhouette_score, Separation, TopicScore};
use crate::data::models::{Dataset, Record};
use crate::embeddings::similarity::{cosine_distance, mean_embedding};
use crate::embeddings::{Embedding, EmbeddingCache};

pub struct CentroidSilhouette<'a> {
    cache: &'a EmbeddingCache,
    dataset: &'a Dataset,
    topics: Vec<String>,
    centroids: HashMap<String, Embedding>,
}

impl<'a> CentroidSilhouette<'a> {
    pub fn new(cache: &'a EmbeddingCache, dataset: &'a Dataset) -> Self {
        Self {
            cache,
            dataset,
            topics: dataset.topics(),
            centroids: HashMap::new(),
        }
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Number of centroids computed so far.
    pub fn cached_centroids(&self) -> usize {
        self.centroids.len()
    }

    /// Mean embedding of the comments assigned `topic`.
    pub async fn topic_centroid(&mut self, topic: &str) -> Result<Embedding> {
        if let Some(centroid) = self.centroids.get(topic) {
            return Ok(Arc::clone(centroid));
        }

        let mut members = Vec::new();
        for record in self.dataset.topic_records(topic) {
            members.push(self.cache.get(&record.comment_text).await?);
        }
        if members.is_empty() {
            anyhow::bail!(
                "Insufficient data: no comments assigned topic {:?} in {}",
                topic,
                self.dataset.name
            );
        }

        let vectors: Vec<&[f64]> = members.iter().map(|m| m.as_slice()).collect();
        let centroid = Arc::new(mean_embedding(&vectors)?);
        debug!(topic, members = members.len(), "Computed topic centroid");
        self.centroids.insert(topic.to_string(), Arc::clone(&centroid));
        Ok(centroid)
    }

    /// Mean distance from the topic centroid to each assigned comment.
    pub async fn topic_cohesion(&mut self, topic: &str) -> Result<f64> {
        let centroid = self.topic_centroid(topic).await?;
        let mut distances = Vec::new();
        for record in self.dataset.topic_records(topic) {
            distances.push(
                self.cache
                    .vector_text_distance(&centroid, &record.comment_text)
                    .await?,
            );
        }
        mean(&distances)
    }

    /// Nearest centroid among topics the comment was not assigned.
    pub async fn comment_separation(&mut self, record: &Record) -> Result<Separation> {
        let comment = self.cache.get(&record.comment_text).await?;
        let topics = self.topics.clone();
        let mut candidates = Vec::new();
        for topic in topics.iter().filter(|t| !record.has_topic(t)) {
            let centroid = self.topic_centroid(topic).await?;
            candidates.push((cosine_distance(&centroid, &comment), topic.as_str()));
        }
        Ok(nearest(candidates))
    }

    /// Mean comment separation over the comments assigned `topic`.
    pub async fn topic_separation(&mut self, topic: &str) -> Result<f64> {
        let dataset = self.dataset;
        let mut separations = Vec::new();
        for record in dataset.topic_records(topic) {
            separations.push(self.comment_separation(record).await?.distance);
        }
        mean(&separations)
    }

    pub async fn topic_score(&mut self, topic: &str) -> Result<TopicScore> {
        let cohesion = self.topic_cohesion(topic).await?;
        let separation = self.topic_separation(topic).await?;
        Ok(TopicScore {
            topic: topic.to_string(),
            size: self.dataset.topic_records(topic).count(),
            cohesion,
            separation,
            silhouette: silhouette_score(cohesion, separation),
        })
    }

    /// Silhouette for a single topic.
    pub async fn topic_silhouette(&mut self, topic: &str) -> Result<f64> {
        Ok(self.topic_score(topic).await?.silhouette)
    }

    /// Per-topic breakdown for every topic in the dataset.
    pub async fn topic_scores(&mut self) -> Result<Vec<TopicScore>> {
        let topics = self.topics.clone();
        let mut scores = Vec::with_capacity(topics.len());
        for topic in &topics {
            scores.push(self.topic_score(topic).await?);
        }
        Ok(scores)
    }

    /// Summary over all topics' silhouettes.
    pub async fn silhouette(&mut self) -> Result<AnalysisResults> {
        let scores: Vec<f64> = self
            .topic_scores()
            .await?
            .iter()
            .map(|s| s.silhouette)
            .collect();
        AnalysisResults::new(&scores)
    }
}

/// Summary over each dataset's mean centroid silhouette.
pub async fn analyze_centroid_silhouette_scores(
    cache: &EmbeddingCache,
    datasets: &[Dataset],
) -> Result<AnalysisResults> {
    let mut means = Vec::with_capacity(datasets.len());
    for dataset in datasets {
        let summary = CentroidSilhouette::new(cache, dataset).silhouette().await?;
        debug!(dataset = %dataset.name, mean = summary.mean, "Centroid silhouette");
        means.push(summary.mean);
    }
    AnalysisResults::new(&means)
}
