pub mod market;
pub mod report;
