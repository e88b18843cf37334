pub mod config;
pub mod dataset;
pub mod embeddings;
pub mod engine;
pub mod errors;
pub mod literal;
pub mod model;
pub mod providers;
pub mod ranker;
pub mod report;
pub mod sandbox;
pub mod storage;
