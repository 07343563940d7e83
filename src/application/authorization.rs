//! Authentication and role-based authorization
//!
//! `Authenticator` turns a bearer token into a [`Principal`]; `authorize`
//! decides whether that principal may perform an [`Action`].

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult, RepositoryProvider, UserRole};
use crate::infrastructure::crypto::jwt::{JwtConfig, TokenVerifier, Verification};

/// The authenticated identity attached to a request.
///
/// The role is read from the store at authentication time, not taken from
/// the token, so role changes apply to tokens already issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Principal {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Operations subject to access control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewUser(Uuid),
    ListUsers,
    RechargeBalance(Uuid),
    ViewHistory(Uuid),
    StartSession(Uuid),
    CloseSession(Uuid),
    ManageStations,
    ManageChargers,
    ManageMaintenance,
    ViewConsumptionReport,
}

pub fn authorize(principal: &Principal, action: Action) -> DomainResult<()> {
    let allowed = match action {
        Action::ViewUser(target) | Action::ViewHistory(target) => {
            principal.is_admin() || principal.user_id == target
        }
        Action::RechargeBalance(target) => principal.user_id == target,
        Action::StartSession(target) | Action::CloseSession(target) => {
            principal.role.rate().is_some() && principal.user_id == target
        }
        Action::ListUsers
        | Action::ManageStations
        | Action::ManageChargers
        | Action::ManageMaintenance
        | Action::ViewConsumptionReport => principal.is_admin(),
    };

    if allowed {
        Ok(())
    } else {
        debug!(user_id = %principal.user_id, role = %principal.role, ?action, "Access denied");
        Err(DomainError::Forbidden(format!(
            "{} may not perform {:?}",
            principal.role, action
        )))
    }
}

/// Resolves bearer tokens to principals.
pub struct Authenticator {
    verifier: TokenVerifier,
    repos: Arc<dyn RepositoryProvider>,
}

impl Authenticator {
    pub fn new(repos: Arc<dyn RepositoryProvider>, jwt_config: &JwtConfig) -> Self {
        Self {
            verifier: TokenVerifier::new(jwt_config),
            repos,
        }
    }

    /// Authenticate the raw `Authorization` header value.
    pub async fn authenticate(&self, header: Option<&str>) -> DomainResult<Principal> {
        let header =
            header.ok_or_else(|| DomainError::Unauthorized("missing authorization header".into()))?;
        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DomainError::Unauthorized("expected a Bearer token".into()))?;

        self.authenticate_token(token).await
    }

    pub async fn authenticate_token(&self, token: &str) -> DomainResult<Principal> {
        let claims = match self.verifier.verify(token) {
            Verification::Valid(claims) => claims,
            Verification::Rejected(reason) => {
                debug!(%reason, "Token rejected");
                return Err(DomainError::Unauthorized(reason.to_string()));
            }
        };

        let user_id = claims
            .user_id()
            .ok_or_else(|| DomainError::Unauthorized("invalid token subject".into()))?;

        let user = self
            .repos
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::Unauthorized("unknown token subject".into()))?;

        Ok(Principal::new(user.id, user.role))
    }
}
