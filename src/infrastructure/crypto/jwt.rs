//! JWT issuance and verification

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::domain::UserRole;

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token lifetime in minutes
    pub expiration_minutes: i64,
    /// Issuer claim
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self::from(&SecurityConfig::default())
    }
}

impl From<&SecurityConfig> for JwtConfig {
    fn from(security: &SecurityConfig) -> Self {
        Self {
            secret: security.jwt_secret.clone(),
            expiration_minutes: security.jwt_expiration_minutes,
            issuer: security.jwt_issuer.clone(),
        }
    }
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Role at issuance; authorization re-reads the stored role
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl TokenClaims {
    pub fn new(user_id: Uuid, role: UserRole, issued_at: DateTime<Utc>, config: &JwtConfig) -> Self {
        let exp = issued_at + Duration::minutes(config.expiration_minutes);

        Self {
            sub: user_id.to_string(),
            role: role.as_str().to_string(),
            exp: exp.timestamp(),
            iat: issued_at.timestamp(),
            iss: config.issuer.clone(),
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

/// A signed token and when it stops being accepted
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Create a JWT token for a user
pub fn create_token(
    user_id: Uuid,
    role: UserRole,
    config: &JwtConfig,
) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
    let claims = TokenClaims::new(user_id, role, Utc::now(), config);
    let token = sign_claims(&claims, config)?;
    let expires_at = DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now);

    Ok(IssuedToken { token, expires_at })
}

pub fn sign_claims(
    claims: &TokenClaims,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Why a token was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Malformed,
    BadSignature,
    Expired,
    WrongIssuer,
    InvalidSubject,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Malformed => "malformed token",
            Self::BadSignature => "invalid token signature",
            Self::Expired => "token expired",
            Self::WrongIssuer => "invalid token issuer",
            Self::InvalidSubject => "invalid token subject",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of checking a bearer token
#[derive(Debug, Clone)]
pub enum Verification {
    Valid(TokenClaims),
    Rejected(RejectReason),
}

/// Checks signature, issuer and expiry of bearer tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::default();
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.leeway = 0;

        Self {
            key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Verification {
        match decode::<TokenClaims>(token, &self.key, &self.validation) {
            Ok(data) => {
                if data.claims.user_id().is_none() {
                    return Verification::Rejected(RejectReason::InvalidSubject);
                }
                Verification::Valid(data.claims)
            }
            Err(e) => Verification::Rejected(match e.kind() {
                ErrorKind::ExpiredSignature => RejectReason::Expired,
                ErrorKind::InvalidSignature => RejectReason::BadSignature,
                ErrorKind::InvalidIssuer => RejectReason::WrongIssuer,
                ErrorKind::InvalidSubject => RejectReason::InvalidSubject,
                _ => RejectReason::Malformed,
            }),
        }
    }
}
