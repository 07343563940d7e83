pub mod jwt;
pub mod password;

pub use jwt::{create_token, IssuedToken, JwtConfig, RejectReason, TokenClaims, TokenVerifier, Verification};
pub use password::{hash_password, verify_password};
