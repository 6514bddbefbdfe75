pub mod core;
pub mod database;
pub mod error;
pub mod handlers;
pub mod impls;
pub mod request;
pub mod response;
