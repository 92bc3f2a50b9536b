//! Session registry: creation, refresh validation, revocation, listing.

use crate::db::IdentityStore;
use crate::models::{new_session_id, DeviceInfo, Session, User};

use super::{JwtService, ServiceError};

/// Coarse platform label derived from a user-agent string.
///
/// Order matters: Android UAs contain "linux" and iOS UAs contain
/// "mac os x", so the mobile families are checked first.
pub fn platform_label(user_agent: &str) -> &'static str {
    let ua = user_agent.to_lowercase();
    if ua.contains("android") {
        "Android"
    } else if ua.contains("iphone") || ua.contains("ipad") || ua.contains("ios") {
        "iOS"
    } else if ua.contains("windows") {
        "Windows"
    } else if ua.contains("mac os") || ua.contains("macintosh") {
        "macOS"
    } else if ua.contains("linux") {
        "Linux"
    } else {
        "Unknown"
    }
}

#[derive(Clone)]
pub struct SessionRegistry {
    db: IdentityStore,
    jwt: JwtService,
}

impl SessionRegistry {
    pub fn new(db: IdentityStore, jwt: JwtService) -> Self {
        Self { db, jwt }
    }

    /// Create a session for a fresh login or registration.
    ///
    /// The session record is persisted before the token pair leaves this
    /// function: a persistence failure must never hand back tokens that
    /// claim success.
    pub async fn create_session(
        &self,
        user: &User,
        device: &DeviceInfo,
    ) -> Result<(String, String), ServiceError> {
        let session_id = new_session_id();
        let refresh_token = self
            .jwt
            .issue_refresh_token(&user.user_id, &session_id)
            .map_err(ServiceError::Internal)?;

        let session = Session::new(
            session_id.clone(),
            user.user_id.clone(),
            &refresh_token,
            device.ip_address.clone(),
            platform_label(&device.user_agent).to_string(),
            self.jwt.refresh_token_expiry_days(),
        );

        self.db.put_session(&session).await?;

        tracing::info!(
            user_id = %user.user_id,
            session_id = %session_id,
            platform = %session.platform,
            "Session created"
        );

        Ok((session_id, refresh_token))
    }

    /// Validate a presented refresh token against its session record and
    /// bump the last-used timestamp. The refresh token itself is not
    /// rotated; the session expiry stands.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Session, ServiceError> {
        let claims = self
            .jwt
            .validate_refresh_token(refresh_token)
            .map_err(|_| ServiceError::InvalidToken)?;

        let mut session = self
            .db
            .find_session(&claims.sid)
            .await?
            .ok_or(ServiceError::InvalidToken)?;

        if session.user_id != claims.sub || !session.matches_token(refresh_token) {
            tracing::warn!(session_id = %claims.sid, "Refresh token does not match session record");
            return Err(ServiceError::InvalidToken);
        }

        if !session.is_valid() {
            return Err(ServiceError::SessionRevoked);
        }

        session.touch();
        self.db.put_session(&session).await?;

        Ok(session)
    }

    /// Mark the session behind a refresh token inactive.
    pub async fn revoke(&self, refresh_token: &str) -> Result<Session, ServiceError> {
        let claims = self
            .jwt
            .validate_refresh_token(refresh_token)
            .map_err(|_| ServiceError::InvalidToken)?;

        let mut session = self
            .db
            .find_session(&claims.sid)
            .await?
            .ok_or(ServiceError::InvalidToken)?;

        if session.user_id != claims.sub || !session.matches_token(refresh_token) {
            return Err(ServiceError::InvalidToken);
        }

        session.revoke();
        self.db.put_session(&session).await?;

        tracing::info!(
            user_id = %session.user_id,
            session_id = %session.session_id,
            "Session revoked"
        );

        Ok(session)
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Session>, ServiceError> {
        Ok(self.db.list_sessions(user_id).await?)
    }
}
