//! SyncTime notification agent
//!
//! Signs the memorized user in, keeps the notification store in sync with
//! the API and the push channel, and logs every change until shut down.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use synctime_api::{ApiClient, HttpCalendarApi, HttpNotificationApi};
use synctime_core::config::AppConfig;
use synctime_core::error::AppError;
use synctime_core::types::filter::TypeFilter;
use synctime_realtime::ChannelHub;
use synctime_service::{FlashLog, Session, SessionContext, SessionDeps};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Agent error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("SYNCTIME_CONFIG").unwrap_or_else(|_| "config/default".to_string());
    let env = std::env::var("SYNCTIME_ENV").unwrap_or_else(|_| "development".to_string());

    AppConfig::load(&config_path, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main agent run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting SyncTime agent v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: API clients ──────────────────────────────────────
    let client = ApiClient::new(&config.api)?;
    tracing::info!("API client ready ({})", client.base_url());

    // ── Step 2: Push channel hub ─────────────────────────────────
    let hub = ChannelHub::websocket(config.realtime.clone());

    // ── Step 3: Session context ──────────────────────────────────
    let flash = Arc::new(FlashLog::new());
    let context = SessionContext::new(SessionDeps {
        notifications: Arc::new(HttpNotificationApi::new(client.clone())),
        calendar: Arc::new(HttpCalendarApi::new(client)),
        hub: hub.clone(),
        flash: flash.clone(),
        mark_read_on_load: config.session.mark_read_on_load,
    });

    // ── Step 4: Sign in and seed ─────────────────────────────────
    let session = context
        .sign_in_from(&config.session.memorized_filter_path)
        .await?;
    session.start().await;
    flash.drain();
    log_summary(&session);

    // ── Step 5: Follow changes until shutdown ────────────────────
    let follower = tokio::spawn(follow(Arc::clone(&session), flash));

    shutdown_signal().await;
    tracing::info!("Shutdown signal received");

    follower.abort();
    context.sign_out();
    tracing::info!(channels = hub.active_channels(), "SyncTime agent stopped");
    Ok(())
}

/// Log store, badge and channel changes as they happen
async fn follow(session: Arc<Session>, flash: Arc<FlashLog>) {
    let mut revisions = session.store().subscribe();
    let mut badge = session.badge().subscribe();
    let Some(mut channel) = session.watch_channel() else {
        return;
    };

    loop {
        tokio::select! {
            changed = revisions.changed() => {
                if changed.is_err() {
                    break;
                }
                log_summary(&session);
            }
            changed = badge.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = *badge.borrow_and_update();
                tracing::info!(unseen = view.unseen, loading = view.loading, "Badge updated");
            }
            changed = channel.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = channel.borrow_and_update().clone();
                tracing::info!(%state, "Push channel state");
            }
        }
        // Flashes are already logged by the sink; only keep the queue bounded.
        flash.drain();
    }
}

fn log_summary(session: &Session) {
    let counts = session.store().counts(&TypeFilter::All);
    let facets: Vec<String> = session
        .store()
        .type_facets()
        .iter()
        .map(ToString::to_string)
        .collect();
    tracing::info!(
        user_id = %session.user_id(),
        total = counts.total,
        unread = counts.unread,
        read = counts.read,
        types = %facets.join(","),
        "Inbox"
    );
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
