//! User aggregate

pub mod model;
pub mod repository;

pub use model::{normalize_email, User, UserRole};
pub use repository::UserRepository;
