pub mod analyzer;
pub mod fetcher;
