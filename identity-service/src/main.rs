use identity_service::{
    build_router,
    config::IdentityConfig,
    db::{IdentityStore, MemoryStore},
    services::{
        AuthService, JwtService, NoopNotifier, NotificationQueue, NotificationSender,
        SessionRegistry, SmtpNotifier,
    },
    AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    // Load configuration - fail fast if invalid
    let config = IdentityConfig::from_env()?;

    init_tracing(&config.service_name, &config.log_level);

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting identity service"
    );

    // Key-value store backing the identity records. The in-memory store
    // keeps nothing across restarts; a persistent client plugs in here.
    let db = IdentityStore::new(Arc::new(MemoryStore::new()));
    tracing::info!("Identity store initialized");

    let jwt = JwtService::new(&config.jwt)?;
    tracing::info!("JWT service initialized");

    let notifier: Arc<dyn NotificationSender> = if config.smtp.enabled {
        Arc::new(SmtpNotifier::new(&config.smtp)?)
    } else {
        tracing::info!("SMTP disabled, welcome notifications will be discarded");
        Arc::new(NoopNotifier)
    };
    let notifications = NotificationQueue::start(notifier);

    let sessions = SessionRegistry::new(db.clone(), jwt.clone());
    let auth_service = AuthService::new(db.clone(), jwt.clone(), sessions, notifications);

    let state = AppState {
        config: config.clone(),
        db,
        jwt,
        auth_service,
    };

    let app = build_router(state);

    let addr = SocketAddr::new(config.host.parse()?, config.port);
    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

fn init_tracing(service_name: &str, log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("identity_service={},tower_http=info", log_level))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true),
        )
        .init();

    tracing::info!(service = %service_name, "Tracing initialized");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
