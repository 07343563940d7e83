//! User management service: registration, login, profiles and balances
//!
//! HTTP handlers are thin wrappers that delegate here.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::authorization::{authorize, Action, Principal};
use crate::config::{AccountConfig, AdminConfig};
use crate::domain::{DomainError, DomainResult, RepositoryProvider, User, UserRole};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
use crate::infrastructure::crypto::password::{hash_password, verify_password};
use crate::shared::validations::MAX_AMOUNT;

/// Registration rules applied by [`UserService::register`]
#[derive(Debug, Clone)]
pub struct AccountPolicy {
    pub initial_balance: Decimal,
    pub min_password_length: usize,
    pub bcrypt_cost: u32,
}

impl AccountPolicy {
    pub fn new(accounts: &AccountConfig, bcrypt_cost: u32) -> Self {
        Self {
            initial_balance: accounts.initial_balance,
            min_password_length: accounts.min_password_length as usize,
            bcrypt_cost,
        }
    }
}

impl Default for AccountPolicy {
    fn default() -> Self {
        Self::new(&AccountConfig::default(), bcrypt::DEFAULT_COST)
    }
}

/// Input for a new account
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<UserRole>,
    pub initial_balance: Option<Decimal>,
}

/// Authentication result returned after a successful login
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// Outcome of a balance top-up
#[derive(Debug, Clone)]
pub struct Recharge {
    pub previous_balance: Decimal,
    pub amount: Decimal,
    pub user: User,
}

pub struct UserService {
    repos: Arc<dyn RepositoryProvider>,
    jwt_config: JwtConfig,
    policy: AccountPolicy,
}

impl UserService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, jwt_config: JwtConfig, policy: AccountPolicy) -> Self {
        Self {
            repos,
            jwt_config,
            policy,
        }
    }

    // ── Authentication ──────────────────────────────────────────

    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthResult> {
        let Some(user) = self.repos.users().find_by_email(email).await? else {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        };

        let valid = verify_password(password, &user.password_hash).unwrap_or(false);
        if !valid {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        }

        let issued = create_token(user.id, user.role, &self.jwt_config)
            .map_err(|e| DomainError::Internal(format!("Failed to create token: {}", e)))?;

        info!(user_id = %user.id, role = %user.role, "User logged in");
        Ok(AuthResult {
            token: issued.token,
            token_type: "Bearer".into(),
            expires_in: self.jwt_config.expiration_minutes * 60,
            expires_at: issued.expires_at,
            user,
        })
    }

    // ── Registration ────────────────────────────────────────────

    /// Register a charging account. Admin accounts cannot be self-registered.
    pub async fn register(&self, registration: Registration) -> DomainResult<User> {
        let role = registration.role.unwrap_or_default();
        if role.is_admin() {
            return Err(DomainError::Forbidden(
                "admin accounts cannot be registered publicly".into(),
            ));
        }
        let balance = registration
            .initial_balance
            .unwrap_or(self.policy.initial_balance);
        self.create_user(
            &registration.name,
            &registration.email,
            &registration.password,
            role,
            balance,
        )
        .await
    }

    /// Create the configured administrator unless an admin already exists.
    pub async fn bootstrap_admin(&self, admin: &AdminConfig) -> DomainResult<Option<User>> {
        if self.repos.users().has_admin().await? {
            return Ok(None);
        }

        let user = self
            .create_user(&admin.name, &admin.email, &admin.password, UserRole::Admin, Decimal::ZERO)
            .await?;
        warn!(email = %user.email, "Default admin created; change its password");
        Ok(Some(user))
    }

    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
        balance: Decimal,
    ) -> DomainResult<User> {
        if name.trim().is_empty() {
            return Err(DomainError::Validation("Name must not be empty".into()));
        }
        if !email.contains('@') {
            return Err(DomainError::Validation("Invalid email address".into()));
        }
        if password.chars().count() < self.policy.min_password_length {
            return Err(DomainError::Validation(format!(
                "Password must be at least {} characters",
                self.policy.min_password_length
            )));
        }
        if balance.is_sign_negative() && !balance.is_zero() {
            return Err(DomainError::Validation("Initial balance must not be negative".into()));
        }
        if balance > MAX_AMOUNT {
            return Err(DomainError::Validation(format!(
                "Initial balance must not exceed {}",
                MAX_AMOUNT
            )));
        }

        if self.repos.users().find_by_email(email).await?.is_some() {
            return Err(DomainError::Conflict("Email already registered".into()));
        }

        let password_hash = hash_password(password, self.policy.bcrypt_cost)
            .map_err(|e| DomainError::Internal(format!("Failed to hash password: {}", e)))?;

        let user = User::new(name.trim(), email, password_hash, role, balance);
        self.repos.users().insert(user.clone()).await?;

        info!(user_id = %user.id, role = %user.role, "New user registered");
        Ok(user)
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn me(&self, principal: &Principal) -> DomainResult<User> {
        self.find(principal.user_id).await
    }

    pub async fn get_user(&self, principal: &Principal, id: Uuid) -> DomainResult<User> {
        authorize(principal, Action::ViewUser(id))?;
        self.find(id).await
    }

    pub async fn list_users(&self, principal: &Principal) -> DomainResult<Vec<User>> {
        authorize(principal, Action::ListUsers)?;
        self.repos.users().find_all().await
    }

    // ── Commands ────────────────────────────────────────────────

    pub async fn recharge(
        &self,
        principal: &Principal,
        id: Uuid,
        amount: Decimal,
    ) -> DomainResult<Recharge> {
        authorize(principal, Action::RechargeBalance(id))?;
        if amount <= Decimal::ZERO {
            return Err(DomainError::Validation("Recharge amount must be positive".into()));
        }
        if amount > MAX_AMOUNT {
            return Err(DomainError::Validation(format!(
                "Recharge amount must not exceed {}",
                MAX_AMOUNT
            )));
        }

        let user = self.repos.users().credit(id, amount).await?;
        info!(user_id = %id, %amount, balance = %user.balance, "Balance recharged");
        Ok(Recharge {
            previous_balance: user.balance - amount,
            amount,
            user,
        })
    }

    async fn find(&self, id: Uuid) -> DomainResult<User> {
        self.repos
            .users()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", "id", id))
    }
}
