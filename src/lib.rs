pub mod aggregate;
pub mod config;
pub mod fetch;
pub mod ingest;
pub mod loader;
pub mod output;
pub mod publish;
pub mod series;
