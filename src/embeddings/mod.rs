// Text embeddings: backends, the memoizing cache, and cosine math.

pub mod cache;
pub mod download;
pub mod onnx;
pub mod rate_limiter;
pub mod similarity;
pub mod traits;
pub mod vertex;

pub use cache::{Embedding, EmbeddingCache};
pub use traits::{Embedder, StaticEmbedder};
