//! Identity module: user accounts and authentication

pub mod service;

pub use service::{AccountPolicy, AuthResult, Recharge, Registration, UserService};
