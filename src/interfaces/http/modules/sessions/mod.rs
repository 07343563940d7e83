//! Sessions module: start, close and inspect charging sessions

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
