use async_trait::async_trait;

use crate::domain::model::{User, UserRecord};

/// Outcome of a write that touches the unique email index.
#[derive(Debug)]
pub enum WriteOutcome<T> {
    Written(T),
    EmailTaken,
    /// The row to update no longer exists.
    Missing,
}

/// Storage port of the users service.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>>;

    /// Whether another user already holds `email`; `except` skips one id.
    async fn email_exists(&self, email: &str, except: Option<i64>) -> anyhow::Result<bool>;

    async fn insert(&self, record: UserRecord) -> anyhow::Result<WriteOutcome<User>>;

    async fn update(&self, user: User) -> anyhow::Result<WriteOutcome<User>>;

    /// Returns `false` when no row had that id.
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;

    async fn list(&self, skip: u64, limit: u64) -> anyhow::Result<Vec<User>>;

    /// Round-trip to the database for readiness probes.
    async fn ping(&self) -> anyhow::Result<()>;
}
