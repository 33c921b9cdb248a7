use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::domain::error::{DomainError, FieldViolation};
use crate::domain::model::{NewUser, User, UserPatch, UserRecord};
use crate::domain::repo::{UsersRepository, WriteOutcome};
use crate::domain::validation::{ensure_distinct, normalize_email, normalize_name};

/// Domain service with the business rules for user management.
#[derive(Clone)]
pub struct UsersService {
    repo: Arc<dyn UsersRepository>,
    config: ServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page_size: 100,
            max_page_size: 100,
        }
    }
}

fn db_err(e: &anyhow::Error) -> DomainError {
    DomainError::database(format!("{e:#}"))
}

impl UsersService {
    #[must_use]
    pub fn new(repo: Arc<dyn UsersRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    #[instrument(name = "parity.users.get", skip(self), fields(user.id = id))]
    pub async fn get_user(&self, id: i64) -> Result<User, DomainError> {
        debug!("Getting user by id");
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| db_err(&e))?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    #[instrument(name = "parity.users.list", skip(self))]
    pub async fn list_users(
        &self,
        skip: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Vec<User>, DomainError> {
        // Storage binds offsets as signed 64-bit integers.
        let skip = skip.unwrap_or(0).min(i64::MAX.unsigned_abs());
        let limit = limit
            .unwrap_or(self.config.default_page_size)
            .clamp(1, self.config.max_page_size.max(1));

        let users = self
            .repo
            .list(skip, limit)
            .await
            .map_err(|e| db_err(&e))?;
        debug!(count = users.len(), skip, limit, "Listed users");
        Ok(users)
    }

    #[instrument(
        name = "parity.users.create",
        skip(self, new_user),
        fields(user.email = %new_user.email)
    )]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Creating new user");

        let (name, surname, email) =
            Self::validate_new_user(&new_user.name, &new_user.surname, &new_user.email)?;

        if self
            .repo
            .email_exists(&email, None)
            .await
            .map_err(|e| db_err(&e))?
        {
            return Err(DomainError::email_already_exists(email));
        }

        let now = Utc::now();
        let record = UserRecord {
            name,
            surname,
            email,
            role: new_user.role.unwrap_or_default(),
            is_active: new_user.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        let email = record.email.clone();

        match self.repo.insert(record).await.map_err(|e| db_err(&e))? {
            WriteOutcome::Written(user) => {
                info!(user.id = user.id, "Successfully created user");
                Ok(user)
            }
            WriteOutcome::EmailTaken => Err(DomainError::email_already_exists(email)),
            WriteOutcome::Missing => Err(DomainError::database("insert reported no row")),
        }
    }

    #[instrument(name = "parity.users.update", skip(self, patch), fields(user.id = id))]
    pub async fn update_user(&self, id: i64, patch: UserPatch) -> Result<User, DomainError> {
        info!("Updating user");

        let mut current = self.get_user(id).await?;
        if patch.is_empty() {
            return Ok(current);
        }

        let mut violations = Vec::new();
        let name = collect(
            patch.name.as_deref().map(|n| normalize_name("name", n)),
            &mut violations,
        );
        let surname = collect(
            patch.surname.as_deref().map(|s| normalize_name("surname", s)),
            &mut violations,
        );
        let email = collect(patch.email.as_deref().map(normalize_email), &mut violations);
        if !violations.is_empty() {
            return Err(DomainError::violations(violations));
        }

        if let Some(name) = name {
            current.name = name;
        }
        if let Some(surname) = surname {
            current.surname = surname;
        }
        ensure_distinct(&current.name, &current.surname)
            .map_err(|v| DomainError::violations(vec![v]))?;

        if let Some(email) = email {
            if email != current.email
                && self
                    .repo
                    .email_exists(&email, Some(id))
                    .await
                    .map_err(|e| db_err(&e))?
            {
                return Err(DomainError::email_already_exists(email));
            }
            current.email = email;
        }
        if let Some(role) = patch.role {
            current.role = role;
        }
        if let Some(is_active) = patch.is_active {
            current.is_active = is_active;
        }
        current.updated_at = Utc::now();

        let email = current.email.clone();
        match self.repo.update(current).await.map_err(|e| db_err(&e))? {
            WriteOutcome::Written(user) => {
                info!("Successfully updated user");
                Ok(user)
            }
            WriteOutcome::EmailTaken => Err(DomainError::email_already_exists(email)),
            WriteOutcome::Missing => {
                debug!("user deleted before the update landed");
                Err(DomainError::user_not_found(id))
            }
        }
    }

    #[instrument(name = "parity.users.delete", skip(self), fields(user.id = id))]
    pub async fn delete_user(&self, id: i64) -> Result<(), DomainError> {
        info!("Deleting user");

        let deleted = self.repo.delete(id).await.map_err(|e| db_err(&e))?;
        if !deleted {
            return Err(DomainError::user_not_found(id));
        }

        info!("Successfully deleted user");
        Ok(())
    }

    /// Readiness check of the backing store.
    ///
    /// # Errors
    /// Returns [`DomainError::Database`] when the store does not answer.
    pub async fn ping(&self) -> Result<(), DomainError> {
        self.repo.ping().await.map_err(|e| db_err(&e))
    }

    fn validate_new_user(
        name: &str,
        surname: &str,
        email: &str,
    ) -> Result<(String, String, String), DomainError> {
        let mut violations = Vec::new();
        let name = collect(Some(normalize_name("name", name)), &mut violations);
        let surname = collect(Some(normalize_name("surname", surname)), &mut violations);
        let email = collect(Some(normalize_email(email)), &mut violations);

        match (name, surname, email) {
            (Some(name), Some(surname), Some(email)) if violations.is_empty() => {
                ensure_distinct(&name, &surname).map_err(|v| DomainError::violations(vec![v]))?;
                Ok((name, surname, email))
            }
            _ => Err(DomainError::violations(violations)),
        }
    }
}

/// Keep the value of an optional check, stashing its violation.
fn collect<T>(
    checked: Option<Result<T, FieldViolation>>,
    violations: &mut Vec<FieldViolation>,
) -> Option<T> {
    match checked? {
        Ok(value) => Some(value),
        Err(v) => {
            violations.push(v);
            None
        }
    }
}
