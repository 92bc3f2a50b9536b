//! Welcome notification delivery.
//!
//! Notifications are handed to a background worker through a bounded
//! queue: the request path never waits on SMTP, and delivery failures are
//! logged without surfacing to the caller.

use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials, Message,
    SmtpTransport, Transport,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::SmtpConfig;

const QUEUE_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub enum Notification {
    Welcome {
        email: String,
        first_name: String,
        username: String,
    },
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, notification: Notification) -> Result<(), anyhow::Error>;
}

/// Handle for enqueueing notifications from the request path.
#[derive(Clone)]
pub struct NotificationQueue {
    tx: mpsc::Sender<Notification>,
}

impl NotificationQueue {
    /// Spawn the delivery worker and return the enqueue handle.
    pub fn start(sender: Arc<dyn NotificationSender>) -> Self {
        let (tx, mut rx) = mpsc::channel::<Notification>(QUEUE_CAPACITY);

        tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                if let Err(e) = sender.send(notification).await {
                    tracing::warn!(error = %e, "Notification delivery failed");
                }
            }
        });

        Self { tx }
    }

    /// Best-effort enqueue. Drops (with a log line) when the queue is
    /// full rather than blocking the request.
    pub fn enqueue(&self, notification: Notification) {
        if let Err(e) = self.tx.try_send(notification) {
            tracing::warn!(error = %e, "Notification queue full, dropping");
        }
    }
}

/// SMTP-backed sender.
#[derive(Clone)]
pub struct SmtpNotifier {
    mailer: SmtpTransport,
    from_email: String,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, anyhow::Error> {
        let creds = Credentials::new(config.user.clone(), config.password.clone());

        let mailer = SmtpTransport::relay(&config.host)
            .map_err(|e| anyhow::anyhow!("SMTP relay setup failed: {}", e))?
            .credentials(creds)
            .port(config.port)
            .timeout(Some(Duration::from_secs(10)))
            .build();

        tracing::info!(host = %config.host, "SMTP notifier initialized");

        Ok(Self {
            mailer,
            from_email: config.user.clone(),
        })
    }

    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        plain_body: String,
    ) -> Result<(), anyhow::Error> {
        let email = Message::builder()
            .from(self.from_email.parse()?)
            .to(to_email.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(plain_body)?;

        // SmtpTransport is blocking; keep it off the async runtime
        let mailer = self.mailer.clone();
        let result = tokio::task::spawn_blocking(move || mailer.send(&email)).await?;

        match result {
            Ok(_) => {
                tracing::info!(to = %to_email, subject = %subject, "Email sent");
                Ok(())
            }
            Err(e) => Err(anyhow::anyhow!("Failed to send email: {}", e)),
        }
    }
}

#[async_trait]
impl NotificationSender for SmtpNotifier {
    async fn send(&self, notification: Notification) -> Result<(), anyhow::Error> {
        match notification {
            Notification::Welcome {
                email,
                first_name,
                username,
            } => {
                let body = format!(
                    "Hi {},\n\nWelcome aboard! Your account \"{}\" is ready.\n\n\
                     Log in any time to pick up your courses where you left off.\n",
                    first_name, username
                );
                self.send_email(&email, "Welcome to the platform", body).await
            }
        }
    }
}

/// Sender that discards everything; used when SMTP is disabled.
#[derive(Clone)]
pub struct NoopNotifier;

#[async_trait]
impl NotificationSender for NoopNotifier {
    async fn send(&self, notification: Notification) -> Result<(), anyhow::Error> {
        tracing::debug!(?notification, "Notification delivery disabled, discarding");
        Ok(())
    }
}
