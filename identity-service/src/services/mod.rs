pub mod auth;
pub mod error;
pub mod jwt;
pub mod notify;
pub mod policy;
pub mod sessions;

pub use auth::AuthService;
pub use error::ServiceError;
pub use jwt::{AccessTokenClaims, JwtService, RefreshTokenClaims};
pub use notify::{
    NoopNotifier, Notification, NotificationQueue, NotificationSender, SmtpNotifier,
};
pub use sessions::SessionRegistry;
