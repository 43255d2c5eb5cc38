use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::repo::User;

/// Request body for registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Writable user fields on update. The password is not among them; changing
/// it goes through a dedicated flow, not this endpoint.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: String,
}

/// Public user view (`user:read`).
#[derive(Debug, Serialize)]
pub struct UserRead {
    pub id: Uuid,
    pub email: String,
}

impl From<&User> for UserRead {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

/// Single-user view (`user:item:get`): adds the titles of owned listings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserItemRead {
    pub id: Uuid,
    pub email: String,
    pub cheese_listings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn user_views_never_leak_the_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            email: "a@b.co".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            roles: vec!["ROLE_USER".into()],
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let read = serde_json::to_string(&UserRead::from(&user)).unwrap();
        assert!(!read.contains("argon2"));
        assert!(!read.contains("password"));

        let item = serde_json::to_string(&UserItemRead {
            id: user.id,
            email: user.email.clone(),
            cheese_listings: vec!["Stilton".into()],
        })
        .unwrap();
        assert!(!item.contains("argon2"));
        assert!(item.contains("cheeseListings"));
    }
}
