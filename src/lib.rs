// topiceval: evals for LLM topic identification and categorization
//
// This is the library root. Each module corresponds to a stage of an
// evaluation run: load labeled datasets, embed their text, score them.

pub mod config;
pub mod data;
pub mod embeddings;
pub mod evals;
pub mod output;
