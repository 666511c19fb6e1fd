pub mod news;
pub mod quotes;
pub mod types;
