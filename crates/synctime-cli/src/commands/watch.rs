//! Watch command: sign in, follow the push channel, print arrivals.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::Args;
use serde::Serialize;
use tracing::{info, warn};

use synctime_api::{ApiClient, HttpCalendarApi, HttpNotificationApi};
use synctime_core::config::AppConfig;
use synctime_core::error::AppError;
use synctime_core::types::id::{NotificationId, UserId};
use synctime_realtime::ChannelHub;
use synctime_service::notification::format_relative;
use synctime_service::{FlashLog, SessionContext, SessionDeps};

use crate::output::{self, OutputFormat};

/// Arguments for the watch command
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this many seconds (runs until Ctrl+C otherwise)
    #[arg(long)]
    pub seconds: Option<u64>,
}

/// One arrival as printed
#[derive(Debug, Serialize)]
struct Arrival<'a> {
    id: &'a str,
    when: String,
    entity: &'a str,
    text: &'a str,
    unseen: u64,
}

/// Execute the watch command
pub async fn execute(
    args: &WatchArgs,
    config: &AppConfig,
    user_id: UserId,
    format: OutputFormat,
) -> Result<(), AppError> {
    let client = ApiClient::new(&config.api)?;
    let flash = Arc::new(FlashLog::new());
    let context = SessionContext::new(SessionDeps {
        notifications: Arc::new(HttpNotificationApi::new(client.clone())),
        calendar: Arc::new(HttpCalendarApi::new(client)),
        hub: ChannelHub::websocket(config.realtime.clone()),
        flash: flash.clone(),
        mark_read_on_load: config.session.mark_read_on_load,
    });

    let session = context.sign_in(user_id)?;
    session.start().await;
    output::print_flashes(&flash.drain());

    let mut known: HashSet<NotificationId> =
        session.store().snapshot().into_iter().map(|r| r.id).collect();
    output::print_kv("Notificações", &known.len().to_string());
    output::print_kv("Não vistas", &session.badge().view().unseen.to_string());

    let mut revisions = session.store().subscribe();
    let stop = stop_signal(args.seconds);
    tokio::pin!(stop);

    loop {
        tokio::select! {
            _ = &mut stop => break,
            changed = revisions.changed() => {
                if changed.is_err() {
                    break;
                }
                let unseen = session.badge().view().unseen;
                for record in session.store().snapshot().iter().rev() {
                    if known.insert(record.id.clone()) {
                        let arrival = Arrival {
                            id: record.id.as_str(),
                            when: format_relative(record.created_at, Utc::now()),
                            entity: &record.entity,
                            text: &record.text,
                            unseen,
                        };
                        print_arrival(&arrival, format);
                    }
                }
                output::print_flashes(&flash.drain());
            }
        }
    }

    context.sign_out();
    info!("Watch stopped");
    Ok(())
}

/// Resolves on Ctrl+C, or once `seconds` have elapsed when given.
async fn stop_signal(seconds: Option<u64>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let deadline = async {
        match seconds {
            Some(seconds) => tokio::time::sleep(Duration::from_secs(seconds)).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = deadline => {},
    }
}

fn print_arrival(arrival: &Arrival<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            if let Ok(line) = serde_json::to_string(arrival) {
                println!("{line}");
            }
        }
        OutputFormat::Table => println!(
            "[{}] {} ({}) · {} não vistas",
            arrival.when, arrival.text, arrival.entity, arrival.unseen
        ),
    }
}
