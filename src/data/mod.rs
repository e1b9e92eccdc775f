// Comment datasets: records, topic parsing, and CSV loading.

pub mod loader;
pub mod models;
pub mod topics;
