//! User DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::application::Recharge;
use crate::domain::{User, UserRole};
use crate::shared::validations::validate_positive_amount;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoleDto {
    Individual,
    Company,
    Admin,
}

impl From<UserRole> for RoleDto {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Individual => Self::Individual,
            UserRole::Company => Self::Company,
            UserRole::Admin => Self::Admin,
        }
    }
}

impl From<RoleDto> for UserRole {
    fn from(role: RoleDto) -> Self {
        match role {
            RoleDto::Individual => Self::Individual,
            RoleDto::Company => Self::Company,
            RoleDto::Admin => Self::Admin,
        }
    }
}

/// User API representation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: RoleDto,
    /// Price per kWh; absent for admins
    pub rate: Option<Decimal>,
    #[schema(example = "50.00")]
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            rate: u.rate(),
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role.into(),
            balance: u.balance,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RechargeRequest {
    #[validate(custom(function = "validate_positive_amount"))]
    #[schema(example = "20.00")]
    pub amount: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RechargeResponse {
    pub user_id: Uuid,
    pub previous_balance: Decimal,
    pub amount: Decimal,
    pub balance: Decimal,
}

impl From<Recharge> for RechargeResponse {
    fn from(r: Recharge) -> Self {
        Self {
            user_id: r.user.id,
            previous_balance: r.previous_balance,
            amount: r.amount,
            balance: r.user.balance,
        }
    }
}
