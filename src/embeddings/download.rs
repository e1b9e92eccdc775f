// Download helper for the local sentence embedding model.
//
// Fetches all-MiniLM-L6-v2 (ONNX export + tokenizer) from HuggingFace into
// a platform data directory (~/.local/share/topiceval/models/ on Linux) so
// it persists across runs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// HuggingFace repo for the sentence embedding model.
const HF_URL: &str = "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main";

/// Local file names inside the model directory.
pub const MODEL_FILE: &str = "model.onnx";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Remote paths within the HuggingFace repo, paired with local names.
const FILES: [(&str, &str, bool); 2] = [
    (TOKENIZER_FILE, TOKENIZER_FILE, false),
    ("onnx/model.onnx", MODEL_FILE, true),
];

/// Default model directory under the platform data dir.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("topiceval")
        .join("models")
        .join("all-MiniLM-L6-v2")
}

/// Whether both model files exist in `dir`.
pub fn model_files_present(dir: &Path) -> bool {
    dir.join(MODEL_FILE).exists() && dir.join(TOKENIZER_FILE).exists()
}

/// Download any missing model files into `dir`.
pub async fn download_model(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create model directory: {}", dir.display()))?;

    println!("\nSentence embedding model (all-MiniLM-L6-v2):");

    for (remote, local, large) in FILES {
        let dest = dir.join(local);
        if dest.exists() {
            info!(file = local, "Model file already exists, skipping");
            println!("  {local} (already exists)");
            continue;
        }
        if large {
            println!("  Downloading {local} (~90 MB)...");
        } else {
            println!("  Downloading {local}...");
        }
        download_file(&format!("{HF_URL}/{remote}"), &dest, large).await?;
    }

    Ok(())
}

async fn download_file(url: &str, dest: &Path, show_progress: bool) -> Result<()> {
    let response = reqwest::Client::new()
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!("Download failed with status {}: {}", response.status(), url);
    }

    let pb = if show_progress {
        let pb = ProgressBar::new(response.content_length().unwrap_or(0));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("    [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                .expect("valid template")
                .progress_chars("=> "),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let bytes = response
        .bytes()
        .await
        .context("Failed to read response body")?;
    pb.set_position(bytes.len() as u64);

    // Write to a temp name first so an interrupted download never looks complete.
    let partial = dest.with_extension("part");
    std::fs::write(&partial, &bytes)
        .with_context(|| format!("Failed to write {}", partial.display()))?;
    std::fs::rename(&partial, dest)
        .with_context(|| format!("Failed to move download into {}", dest.display()))?;

    pb.finish_and_clear();
    info!(url = url, dest = %dest.display(), "Downloaded model file");
    Ok(())
}
