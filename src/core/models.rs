pub mod application;
pub mod feed;
pub mod note;
