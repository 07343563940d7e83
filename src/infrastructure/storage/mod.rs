//! Storage implementations of the domain repositories

pub mod memory;

pub use memory::InMemoryRepositoryProvider;
