//! User repository interface

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::model::User;
use crate::shared::DomainResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with `Conflict` when the email is taken.
    async fn insert(&self, user: User) -> DomainResult<()>;
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    async fn find_all(&self) -> DomainResult<Vec<User>>;
    async fn has_admin(&self) -> DomainResult<bool>;

    /// Add `amount` to the balance and return the updated user.
    async fn credit(&self, id: Uuid, amount: Decimal) -> DomainResult<User>;

    /// Subtract `amount` from the balance. Fails with `InsufficientBalance`
    /// and leaves the balance untouched when it would go negative.
    async fn debit(&self, id: Uuid, amount: Decimal) -> DomainResult<User>;
}
