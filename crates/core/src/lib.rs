pub mod config;
pub mod domain;
pub mod ingest;
pub mod llm;
pub mod mail;
pub mod pipeline;
pub mod report;
pub mod time;
