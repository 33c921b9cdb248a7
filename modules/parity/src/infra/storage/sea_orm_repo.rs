//! `SeaORM`-backed implementation of [`UsersRepository`].

use anyhow::Context;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};
use tracing::{debug, instrument};

use crate::domain::model::{User, UserRecord};
use crate::domain::repo::{UsersRepository, WriteOutcome};
use crate::infra::storage::entity::{ActiveModel as UserAM, Column, Entity as UserEntity};

pub struct SeaOrmUsersRepository {
    db: DatabaseConnection,
}

impl SeaOrmUsersRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[async_trait::async_trait]
impl UsersRepository for SeaOrmUsersRepository {
    #[instrument(
        name = "parity.repo.find_by_id",
        skip(self),
        fields(db.operation = "SELECT", user.id = id)
    )]
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find_by_id query failed")?;
        found.map(User::try_from).transpose()
    }

    #[instrument(
        name = "parity.repo.email_exists",
        skip(self),
        fields(db.operation = "SELECT COUNT")
    )]
    async fn email_exists(&self, email: &str, except: Option<i64>) -> anyhow::Result<bool> {
        let mut query = UserEntity::find().filter(Column::Email.eq(email));
        if let Some(id) = except {
            query = query.filter(Column::Id.ne(id));
        }
        let count = query
            .count(&self.db)
            .await
            .context("email_exists query failed")?;
        Ok(count > 0)
    }

    #[instrument(
        name = "parity.repo.insert",
        skip(self, r),
        fields(db.operation = "INSERT", user.email = %r.email)
    )]
    async fn insert(&self, r: UserRecord) -> anyhow::Result<WriteOutcome<User>> {
        let m = UserAM {
            id: NotSet,
            name: Set(r.name),
            surname: Set(r.surname),
            email: Set(r.email),
            role: Set(r.role.as_str().to_owned()),
            is_active: Set(r.is_active),
            created_at: Set(r.created_at),
            updated_at: Set(r.updated_at),
        };

        match m.insert(&self.db).await {
            Ok(model) => Ok(WriteOutcome::Written(model.try_into()?)),
            Err(e) if is_unique_violation(&e) => {
                debug!("email taken by a concurrent insert");
                Ok(WriteOutcome::EmailTaken)
            }
            Err(e) => Err(anyhow::Error::new(e).context("insert failed")),
        }
    }

    #[instrument(
        name = "parity.repo.update",
        skip(self, u),
        fields(db.operation = "UPDATE", user.id = u.id)
    )]
    async fn update(&self, u: User) -> anyhow::Result<WriteOutcome<User>> {
        let m = UserAM {
            id: Set(u.id),
            name: Set(u.name),
            surname: Set(u.surname),
            email: Set(u.email),
            role: Set(u.role.as_str().to_owned()),
            is_active: Set(u.is_active),
            created_at: Set(u.created_at),
            updated_at: Set(u.updated_at),
        };

        match m.update(&self.db).await {
            Ok(model) => Ok(WriteOutcome::Written(model.try_into()?)),
            Err(e) if is_unique_violation(&e) => Ok(WriteOutcome::EmailTaken),
            Err(DbErr::RecordNotUpdated) => Ok(WriteOutcome::Missing),
            Err(e) => Err(anyhow::Error::new(e).context("update failed")),
        }
    }

    #[instrument(
        name = "parity.repo.delete",
        skip(self),
        fields(db.operation = "DELETE", user.id = id)
    )]
    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let res = UserEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }

    #[instrument(
        name = "parity.repo.list",
        skip(self),
        fields(db.operation = "SELECT")
    )]
    async fn list(&self, skip: u64, limit: u64) -> anyhow::Result<Vec<User>> {
        let rows = UserEntity::find()
            .order_by_asc(Column::Id)
            .offset(skip)
            .limit(limit)
            .all(&self.db)
            .await
            .context("list query failed")?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.db.ping().await.context("database ping failed")
    }
}
