use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::domain::model::User;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub surname: String,
    #[sea_orm(unique)]
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for User {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let role = m
            .role
            .parse()
            .map_err(|e: String| anyhow::anyhow!("user {}: {e}", m.id))?;
        Ok(Self {
            id: m.id,
            name: m.name,
            surname: m.surname,
            email: m.email,
            role,
            is_active: m.is_active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}
