// Results CSV: one row per evaluation, summary statistics as columns.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::evals::NamedResult;

pub const HEADER: [&str; 5] = ["Evaluation Name", "Mean", "Stdev", "Min", "Max"];

/// Write evaluation rows as CSV to any writer.
pub fn write_results<W: Write>(writer: W, results: &[NamedResult]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(HEADER)
        .context("Failed to write results header")?;
    for row in results {
        let r = &row.results;
        csv.write_record([
            row.name.clone(),
            r.mean.to_string(),
            r.stdev.to_string(),
            r.min.to_string(),
            r.max.to_string(),
        ])
        .with_context(|| format!("Failed to write results row {}", row.name))?;
    }
    csv.flush().context("Failed to flush results CSV")?;
    Ok(())
}

/// Write evaluation rows to a CSV file, creating parent directories.
pub fn write_results_csv(path: &Path, results: &[NamedResult]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_results(file, results)?;
    info!(path = %path.display(), rows = results.len(), "Wrote results CSV");
    Ok(())
}
