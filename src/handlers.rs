pub mod analysis;
pub mod browse;
pub mod feed;
pub mod membership;
pub mod note;
