//! User model - platform accounts and their public projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::utils::normalize_identifier;

/// Default role granted at registration.
pub const ROLE_STUDENT: &str = "student";

/// User account record.
///
/// Created once at registration and never physically deleted; deactivation
/// clears `active`. Email and username are stored normalized (trimmed,
/// lowercased) so the uniqueness-index records stay consistent.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub user_id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub roles: Vec<String>,
    pub active: bool,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        email: &str,
        username: &str,
        first_name: String,
        last_name: String,
        password_hash: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id: Uuid::new_v4().to_string(),
            email: normalize_identifier(email),
            username: normalize_identifier(username),
            first_name,
            last_name,
            password_hash,
            roles: vec![ROLE_STUDENT.to_string()],
            active: true,
            verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Public projection without the password hash.
    pub fn public(&self) -> PublicUser {
        PublicUser {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            roles: self.roles.clone(),
        }
    }
}

/// User fields exposed on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub user_id: String,
    #[schema(example = "a@x.com")]
    pub email: String,
    #[schema(example = "alice1")]
    pub username: String,
    #[schema(example = "Alice")]
    pub first_name: String,
    #[schema(example = "Lidell")]
    pub last_name: String,
    #[schema(example = json!(["student"]))]
    pub roles: Vec<String>,
}
