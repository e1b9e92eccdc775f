// CSV loading for labeled comment datasets.
//
// Expects the categorization export columns `comment-id`, `comment_text`
// and `topics`. Extra columns (vote tallies, group counts) are ignored.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use super::models::{Dataset, Record};
use super::topics::parse_topics_field;

/// Integer ids. Integral floats such as `12.0` (pandas writes these for a
/// column with gaps) are accepted; `12.5` is not.
pub const COMMENT_ID_COL: &str = "comment-id";
pub const COMMENT_TEXT_COL: &str = "comment_text";
pub const TOPICS_COL: &str = "topics";

/// Load a dataset from a CSV file. The dataset is named after the path.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open dataset {}", path.display()))?;
    read_dataset(&path.display().to_string(), file)
}

/// Read a dataset from any CSV source.
pub fn read_dataset<R: Read>(name: &str, source: R) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(source);
    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read CSV header of {name}"))?
        .clone();

    let column = |wanted: &[&str]| -> Result<usize> {
        headers
            .iter()
            .position(|h| wanted.contains(&h.trim()))
            .ok_or_else(|| anyhow::anyhow!("{name} is missing the `{}` column", wanted[0]))
    };
    let id_col = column(&[COMMENT_ID_COL, "comment_id"])?;
    let text_col = column(&[COMMENT_TEXT_COL])?;
    let topics_col = column(&[TOPICS_COL])?;

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        // Row numbers are 1-based and skip the header line.
        let line = row + 2;
        let fields = result.with_context(|| format!("Malformed CSV row {line} in {name}"))?;

        let raw_id = fields.get(id_col).unwrap_or("").trim();
        let Some(comment_id) = parse_comment_id(raw_id) else {
            anyhow::bail!("Invalid comment-id {raw_id:?} at row {line} in {name}");
        };

        records.push(Record {
            comment_id,
            comment_text: fields.get(text_col).unwrap_or("").to_string(),
            topics: parse_topics_field(fields.get(topics_col).unwrap_or("")),
        });
    }

    debug!(dataset = name, records = records.len(), "Loaded dataset");
    Dataset::new(name, records)
}

/// Parse an id written as an integer or as an integral float.
fn parse_comment_id(raw: &str) -> Option<i64> {
    if let Ok(id) = raw.parse::<i64>() {
        return Some(id);
    }
    let value: f64 = raw.parse().ok()?;
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.is_finite() && value.fract() == 0.0 && in_range).then_some(value as i64)
}
