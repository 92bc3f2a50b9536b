//! Registration orchestrator and the login/refresh/logout flows that
//! share its persistence contract.

use crate::db::{IdentityStore, UniqueAttribute};
use crate::dtos::auth::{AuthResponse, LoginRequest, RegisterRequest, TokenResponse};
use crate::models::{DeviceInfo, SessionInfo, User};
use crate::utils::{
    hash_password, normalize_identifier, verify_password, Password, PasswordHashString,
};

use super::{
    policy, JwtService, Notification, NotificationQueue, ServiceError, SessionRegistry,
};

#[derive(Clone)]
pub struct AuthService {
    db: IdentityStore,
    jwt: JwtService,
    sessions: SessionRegistry,
    notifications: NotificationQueue,
}

impl AuthService {
    pub fn new(
        db: IdentityStore,
        jwt: JwtService,
        sessions: SessionRegistry,
        notifications: NotificationQueue,
    ) -> Self {
        Self {
            db,
            jwt,
            sessions,
            notifications,
        }
    }

    /// End-to-end account creation.
    ///
    /// Uniqueness is enforced by the store's conditional transaction, not
    /// by a prior read: two concurrent registrations for the same
    /// username or email cannot both commit.
    pub async fn register(
        &self,
        req: RegisterRequest,
        device: DeviceInfo,
    ) -> Result<AuthResponse, ServiceError> {
        let username = normalize_identifier(&req.username);
        let email = normalize_identifier(&req.email);

        policy::validate_username(&username)?;
        policy::validate_password(&req.password)?;

        let password_hash = hash_password(&Password::new(req.password))
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Password hashing error: {}", e)))?;

        let user = User::new(
            &email,
            &username,
            req.first_name,
            req.last_name,
            password_hash.into_string(),
        );

        self.db.create_user(&user).await.map_err(|e| {
            match IdentityStore::conflicting_attribute(&e) {
                Some(UniqueAttribute::Username) => ServiceError::UsernameTaken,
                Some(UniqueAttribute::Email) => ServiceError::EmailTaken,
                None => ServiceError::Store(e),
            }
        })?;

        tracing::info!(user_id = %user.user_id, username = %user.username, "User registered");

        let access_token = self
            .jwt
            .issue_access_token(&user.user_id, &user.email, &user.username, &user.roles)
            .map_err(ServiceError::Internal)?;

        let (_session_id, refresh_token) = self.sessions.create_session(&user, &device).await?;

        self.notifications.enqueue(Notification::Welcome {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            username: user.username.clone(),
        });

        Ok(AuthResponse {
            access_token,
            refresh_token,
            expires_in: self.jwt.access_token_expiry_seconds(),
            user: user.public(),
        })
    }

    /// Email/password login. Unknown email and wrong password are
    /// indistinguishable to the caller.
    pub async fn login(
        &self,
        req: LoginRequest,
        device: DeviceInfo,
    ) -> Result<AuthResponse, ServiceError> {
        let email = normalize_identifier(&req.email);

        let user = self
            .db
            .find_user_by_email(&email)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        verify_password(
            &Password::new(req.password),
            &PasswordHashString::new(user.password_hash.clone()),
        )
        .map_err(|_| ServiceError::InvalidCredentials)?;

        if !user.active {
            return Err(ServiceError::AccountDisabled);
        }

        let access_token = self
            .jwt
            .issue_access_token(&user.user_id, &user.email, &user.username, &user.roles)
            .map_err(ServiceError::Internal)?;

        let (_session_id, refresh_token) = self.sessions.create_session(&user, &device).await?;

        tracing::info!(user_id = %user.user_id, "User logged in");

        Ok(AuthResponse {
            access_token,
            refresh_token,
            expires_in: self.jwt.access_token_expiry_seconds(),
            user: user.public(),
        })
    }

    /// Exchange a refresh token for a new access token. The refresh
    /// token and its session stay unchanged apart from last-used.
    pub async fn refresh(&self, refresh_token: String) -> Result<TokenResponse, ServiceError> {
        let session = self.sessions.refresh(&refresh_token).await?;

        let user = self
            .db
            .find_user(&session.user_id)
            .await?
            .ok_or(ServiceError::InvalidToken)?;

        if !user.active {
            return Err(ServiceError::AccountDisabled);
        }

        let access_token = self
            .jwt
            .issue_access_token(&user.user_id, &user.email, &user.username, &user.roles)
            .map_err(ServiceError::Internal)?;

        tracing::info!(user_id = %user.user_id, session_id = %session.session_id, "Token refreshed");

        Ok(TokenResponse {
            access_token,
            refresh_token,
            expires_in: self.jwt.access_token_expiry_seconds(),
        })
    }

    /// Revoke the session behind a refresh token. The bearer must own it.
    pub async fn logout(
        &self,
        user_id: &str,
        refresh_token: String,
    ) -> Result<(), ServiceError> {
        let claims = self
            .jwt
            .validate_refresh_token(&refresh_token)
            .map_err(|_| ServiceError::InvalidToken)?;

        if claims.sub != user_id {
            return Err(ServiceError::InvalidToken);
        }

        self.sessions.revoke(&refresh_token).await?;
        Ok(())
    }

    pub async fn list_sessions(&self, user_id: &str) -> Result<Vec<SessionInfo>, ServiceError> {
        let sessions = self.sessions.list_for_user(user_id).await?;
        Ok(sessions.iter().map(|s| s.public()).collect())
    }
}
