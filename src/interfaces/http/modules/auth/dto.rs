//! Authentication DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::{AuthResult, Registration};
use crate::interfaces::http::modules::users::{RoleDto, UserDto};
use crate::shared::validations::validate_non_negative_amount;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[validate(email)]
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
    /// `individual` when omitted
    pub role: Option<RoleDto>,
    /// Server default when omitted
    #[validate(custom(function = "validate_non_negative_amount"))]
    pub initial_balance: Option<Decimal>,
}

impl From<RegisterRequest> for Registration {
    fn from(r: RegisterRequest) -> Self {
        Self {
            name: r.name,
            email: r.email,
            password: r.password,
            role: r.role.map(Into::into),
            initial_balance: r.initial_balance,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    /// Seconds until expiry
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
    pub user: UserDto,
}

impl From<AuthResult> for LoginResponse {
    fn from(r: AuthResult) -> Self {
        Self {
            token: r.token,
            token_type: r.token_type,
            expires_in: r.expires_in,
            expires_at: r.expires_at,
            user: r.user.into(),
        }
    }
}
