//! User domain entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// User role. Charging roles carry their per-kWh rate; admins have none
/// and therefore cannot hold charging sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserRole {
    Individual,
    Company,
    Admin,
}

impl UserRole {
    /// Price per kWh applied to this role's sessions.
    pub fn rate(&self) -> Option<Decimal> {
        match self {
            Self::Individual => Some(Decimal::new(30, 2)),
            Self::Company => Some(Decimal::new(25, 2)),
            Self::Admin => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Company => "company",
            Self::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "individual" => Some(Self::Individual),
            "company" => Some(Self::Company),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Individual
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User model
#[derive(Clone, Debug)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Always stored lowercase
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        name: impl Into<String>,
        email: &str,
        password_hash: impl Into<String>,
        role: UserRole,
        balance: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: normalize_email(email),
            password_hash: password_hash.into(),
            role,
            balance,
            created_at: Utc::now(),
        }
    }

    pub fn rate(&self) -> Option<Decimal> {
        self.role.rate()
    }

    pub fn has_balance_for(&self, amount: Decimal) -> bool {
        self.balance >= amount
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
