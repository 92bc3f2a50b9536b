//! Session model - one authenticated device/login per record.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;
use uuid::Uuid;

/// Device metadata captured from the request that created the session.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub ip_address: String,
    pub user_agent: String,
}

/// Session record.
///
/// Addressable by owning user (primary key) and by session id (secondary
/// index) so a refresh token can be validated without knowing the user.
/// Stores a digest of the refresh token, not the token itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub user_id: String,
    pub refresh_token_hash: String,
    pub ip_address: String,
    pub platform: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        session_id: String,
        user_id: String,
        refresh_token: &str,
        ip_address: String,
        platform: String,
        expiry_days: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            user_id,
            refresh_token_hash: Self::hash_token(refresh_token),
            ip_address,
            platform,
            active: true,
            created_at: now,
            last_used_at: now,
            expires_at: now + Duration::days(expiry_days),
        }
    }

    /// Digest binding the record to the issued refresh token.
    pub fn hash_token(token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Usable for refresh: active, unexpired.
    pub fn is_valid(&self) -> bool {
        self.active && !self.is_expired()
    }

    pub fn matches_token(&self, token: &str) -> bool {
        self.refresh_token_hash == Self::hash_token(token)
    }

    pub fn touch(&mut self) {
        self.last_used_at = Utc::now();
    }

    pub fn revoke(&mut self) {
        self.active = false;
    }

    pub fn public(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.session_id.clone(),
            ip_address: self.ip_address.clone(),
            platform: self.platform.clone(),
            active: self.active,
            created_at: self.created_at,
            last_used_at: self.last_used_at,
            expires_at: self.expires_at,
        }
    }
}

/// Session fields exposed on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: String,
    #[schema(example = "203.0.113.7")]
    pub ip_address: String,
    #[schema(example = "Android")]
    pub platform: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Generate a fresh random session id.
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session(expiry_days: i64) -> Session {
        Session::new(
            new_session_id(),
            "user-1".to_string(),
            "refresh-token",
            "127.0.0.1".to_string(),
            "Unknown".to_string(),
            expiry_days,
        )
    }

    #[test]
    fn fresh_session_is_valid_and_bound_to_token() {
        let session = sample_session(7);
        assert!(session.is_valid());
        assert!(session.matches_token("refresh-token"));
        assert!(!session.matches_token("other-token"));
    }

    #[test]
    fn revoked_session_is_invalid() {
        let mut session = sample_session(7);
        session.revoke();
        assert!(!session.is_valid());
        assert!(!session.is_expired());
    }

    #[test]
    fn expired_session_is_invalid() {
        let session = sample_session(-1);
        assert!(session.is_expired());
        assert!(!session.is_valid());
    }

    #[test]
    fn public_projection_omits_token_digest() {
        let session = sample_session(7);
        let json = serde_json::to_string(&session.public()).unwrap();
        assert!(!json.contains(&session.refresh_token_hash));
        assert!(json.contains("\"sessionId\""));
    }
}
