// Comment records and labeled datasets.
//
// A dataset is one labeling run: the same comments, each tagged by an LLM
// with zero or more topic names. Datasets from different runs are joined by
// comment id, never by position.

use std::collections::{BTreeSet, HashMap, HashSet};

use anyhow::Result;

/// One comment with the topics assigned to it in a single labeling run.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub comment_id: i64,
    pub comment_text: String,
    pub topics: BTreeSet<String>,
}

impl Record {
    pub fn new<I, S>(comment_id: i64, comment_text: impl Into<String>, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            comment_id,
            comment_text: comment_text.into(),
            topics: topics.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether this comment was assigned the given topic.
    pub fn has_topic(&self, topic: &str) -> bool {
        self.topics.contains(topic)
    }
}

/// An ordered set of records sharing one topic assignment run.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Where the dataset came from (file path), used in logs and errors.
    pub name: String,
    records: Vec<Record>,
    index: HashMap<i64, usize>,
}

impl Dataset {
    /// Build a dataset, rejecting duplicate comment ids.
    pub fn new(name: impl Into<String>, records: Vec<Record>) -> Result<Self> {
        let name = name.into();
        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if index.insert(record.comment_id, i).is_some() {
                anyhow::bail!(
                    "Duplicate comment-id {} in dataset {}",
                    record.comment_id,
                    name
                );
            }
        }
        Ok(Self {
            name,
            records,
            index,
        })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by comment id.
    pub fn get(&self, comment_id: i64) -> Option<&Record> {
        self.index.get(&comment_id).map(|&i| &self.records[i])
    }

    /// Distinct topic names across all records, in order of first appearance.
    pub fn topics(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut topics = Vec::new();
        for record in &self.records {
            for topic in &record.topics {
                if seen.insert(topic.as_str()) {
                    topics.push(topic.clone());
                }
            }
        }
        topics
    }

    /// Records assigned the given topic.
    pub fn topic_records<'a>(&'a self, topic: &'a str) -> impl Iterator<Item = &'a Record> + 'a {
        self.records.iter().filter(move |r| r.has_topic(topic))
    }

    /// Every string the evaluations will embed: comment texts and topic names.
    pub fn embedding_texts(&self) -> Vec<String> {
        let mut texts: Vec<String> = self.records.iter().map(|r| r.comment_text.clone()).collect();
        texts.extend(self.topics());
        texts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(
            "sample",
            vec![
                Record::new(1, "a", ["topic2", "topic1"]),
                Record::new(2, "b", ["topic3"]),
                Record::new(3, "c", Vec::<String>::new()),
                Record::new(4, "d", ["topic1"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = Dataset::new(
            "dupes",
            vec![Record::new(7, "a", ["x"]), Record::new(7, "b", ["y"])],
        )
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate comment-id 7"));
    }

    #[test]
    fn test_topics_are_distinct() {
        let topics = sample().topics();
        assert_eq!(topics.len(), 3);
        assert!(topics.contains(&"topic1".to_string()));
        assert!(topics.contains(&"topic3".to_string()));
    }

    #[test]
    fn test_topic_records() {
        let ds = sample();
        let ids: Vec<i64> = ds.topic_records("topic1").map(|r| r.comment_id).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(ds.topic_records("missing").count(), 0);
    }

    #[test]
    fn test_get_by_id() {
        let ds = sample();
        assert_eq!(ds.get(2).map(|r| r.comment_text.as_str()), Some("b"));
        assert!(ds.get(99).is_none());
    }

    #[test]
    fn test_embedding_texts_include_topics() {
        let texts = sample().embedding_texts();
        assert_eq!(texts.len(), 7);
        assert!(texts.contains(&"d".to_string()));
        assert!(texts.contains(&"topic2".to_string()));
    }
}
