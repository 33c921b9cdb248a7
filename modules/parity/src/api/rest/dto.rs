use serde::{Deserialize, Serialize};

use crate::domain::model::{NewUser, Role, User, UserPatch};

/// Query of `GET /odd-numbers`. Both bounds are required.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OddRangeQuery {
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OddNumbersResponse {
    pub odd_numbers: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ParityCheckResponse {
    pub number: i64,
    pub is_odd: bool,
}

/// REST view of a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub user_id: i64,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            user_id: u.id,
            name: u.name,
            surname: u.surname,
            email: u.email,
            role: u.role,
            is_active: u.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserReq {
    pub name: String,
    pub surname: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl From<CreateUserReq> for NewUser {
    fn from(req: CreateUserReq) -> Self {
        Self {
            name: req.name,
            surname: req.surname,
            email: req.email,
            role: req.role,
            is_active: req.is_active,
        }
    }
}

/// Admin patch of any user.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserReq {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl From<UpdateUserReq> for UserPatch {
    fn from(req: UpdateUserReq) -> Self {
        Self {
            name: req.name,
            surname: req.surname,
            email: req.email,
            role: req.role,
            is_active: req.is_active,
        }
    }
}

/// Self-service update; role and activation are not writable here.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMeReq {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl From<UpdateMeReq> for UserPatch {
    fn from(req: UpdateMeReq) -> Self {
        Self {
            name: req.name,
            surname: req.surname,
            email: req.email,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default)]
    pub skip: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub docs: String,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    #[test]
    fn user_dto_renames_id() {
        let now = Utc::now();
        let dto = UserDto::from(User {
            id: 7,
            name: "Ada".to_owned(),
            surname: "Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            role: Role::Admin,
            is_active: true,
            created_at: now,
            updated_at: now,
        });
        let v = serde_json::to_value(dto).unwrap();
        assert_eq!(
            v,
            json!({
                "user_id": 7,
                "name": "Ada",
                "surname": "Lovelace",
                "email": "ada@example.com",
                "role": "admin",
                "is_active": true
            })
        );
    }

    #[test]
    fn update_me_rejects_role() {
        let err = serde_json::from_value::<UpdateMeReq>(json!({ "role": "admin" }));
        assert!(err.is_err());

        let ok: UpdateMeReq = serde_json::from_value(json!({ "name": "Bob" })).unwrap();
        let patch = UserPatch::from(ok);
        assert_eq!(patch.name.as_deref(), Some("Bob"));
        assert!(patch.role.is_none());
    }

    #[test]
    fn create_request_defaults() {
        let req: CreateUserReq = serde_json::from_value(json!({
            "name": "Ada", "surname": "Lovelace", "email": "ada@example.com"
        }))
        .unwrap();
        let new_user = NewUser::from(req);
        assert!(new_user.role.is_none());
        assert!(new_user.is_active.is_none());
    }
}
