pub mod analyzer;
pub mod fetcher;
pub mod repository;
