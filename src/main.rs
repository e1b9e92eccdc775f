use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use topiceval::config::{Config, EmbedderBackend};
use topiceval::data::loader::load_dataset;
use topiceval::data::models::Dataset;
use topiceval::embeddings::{Embedder, EmbeddingCache};

/// topiceval: stability and cluster-quality evals for LLM topic assignments.
///
/// Compares several labeling runs of the same comments and scores how well
/// each run's topics separate the comments, using semantic embeddings.
#[derive(Parser)]
#[command(name = "topiceval", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all evaluations over one or more labeled comment CSVs
    Run {
        /// Labeled comment CSVs (comment-id, comment_text, topics)
        #[arg(long, required = true, num_args = 1..)]
        input_data: Vec<PathBuf>,

        /// Where to write the results CSV
        #[arg(long)]
        output_csv_path: PathBuf,

        /// Embedding requests in flight at once (default: 8)
        #[arg(long, default_value = "8")]
        concurrency: u32,
    },

    /// Show per-topic silhouette scores for a single labeled CSV
    Topics {
        /// Labeled comment CSV
        #[arg(long)]
        input_data: PathBuf,

        /// Use centroid-based silhouette instead of topic-centered
        #[arg(long)]
        centroid: bool,

        /// Embedding requests in flight at once (default: 8)
        #[arg(long, default_value = "8")]
        concurrency: u32,
    },

    /// Download the local ONNX sentence embedding model (~90 MB)
    DownloadModel,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("topiceval=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input_data,
            output_csv_path,
            concurrency,
        } => {
            let config = Config::load()?;
            config.require_embedder()?;

            let datasets = load_all(&input_data)?;
            let cache = EmbeddingCache::new(create_embedder(&config)?);

            let results =
                topiceval::evals::runner::run_all(&cache, &datasets, concurrency as usize).await?;

            topiceval::output::terminal::display_results(&results, datasets.len());
            topiceval::output::report::write_results_csv(&output_csv_path, &results)?;

            println!(
                "{} {}",
                "Results written to".bold(),
                output_csv_path.display()
            );
        }

        Commands::Topics {
            input_data,
            centroid,
            concurrency,
        } => {
            let config = Config::load()?;
            config.require_embedder()?;

            let dataset = load_dataset(&input_data)?;
            let cache = EmbeddingCache::new(create_embedder(&config)?);
            cache
                .warm(&dataset.embedding_texts(), concurrency as usize)
                .await?;

            let (title, scores) = if centroid {
                let mut analysis =
                    topiceval::evals::centroid::CentroidSilhouette::new(&cache, &dataset);
                ("Centroid Silhouette", analysis.topic_scores().await?)
            } else {
                let analysis =
                    topiceval::evals::topic_centered::TopicCenteredSilhouette::new(&cache, &dataset);
                ("Topic Centered Silhouette", analysis.topic_scores().await?)
            };

            topiceval::output::terminal::display_topic_scores(title, &scores);
        }

        Commands::DownloadModel => {
            let config = Config::load()?;
            let model_dir = &config.model_dir;

            println!("Downloading ONNX embedding model...");
            println!("  Destination: {}", model_dir.display());

            topiceval::embeddings::download::download_model(model_dir).await?;

            println!("\n{}", "Model downloaded successfully.".bold());
            println!("Set TOPICEVAL_EMBEDDER=onnx to use it.");
        }
    }

    Ok(())
}

/// Load every input CSV, failing on the first bad file.
fn load_all(paths: &[PathBuf]) -> Result<Vec<Dataset>> {
    let datasets = paths
        .iter()
        .map(|p| load_dataset(p))
        .collect::<Result<Vec<_>>>()?;
    for dataset in &datasets {
        info!(
            dataset = %dataset.name,
            comments = dataset.len(),
            topics = dataset.topics().len(),
            "Loaded dataset"
        );
    }
    Ok(datasets)
}

/// Create the embedding backend selected by config.
fn create_embedder(config: &Config) -> Result<Box<dyn Embedder>> {
    match config.embedder {
        EmbedderBackend::Vertex => {
            info!(
                model = %config.embedding_model,
                location = %config.gcp_location,
                "Using Vertex AI embeddings"
            );
            Ok(Box::new(topiceval::embeddings::vertex::VertexEmbedder::new(
                &config.gcp_project,
                &config.gcp_location,
                &config.embedding_model,
                config.gcp_access_token.clone(),
                config.embedding_qps,
            )))
        }
        EmbedderBackend::Onnx => {
            info!("Using local ONNX sentence embeddings");
            Ok(Box::new(topiceval::embeddings::onnx::SentenceEmbedder::load(
                &config.model_dir,
            )?))
        }
        EmbedderBackend::Precomputed => {
            let path = config.embeddings_file.as_ref().ok_or_else(|| {
                anyhow::anyhow!("TOPICEVAL_EMBEDDINGS_FILE not set")
            })?;
            let embedder = topiceval::embeddings::StaticEmbedder::from_json_file(path)?;
            info!(texts = embedder.len(), "Using precomputed embeddings");
            Ok(Box::new(embedder))
        }
    }
}
