//! Badge commands: unseen count and mark all seen.

use std::sync::Arc;

use clap::{Args, Subcommand};

use synctime_api::{ApiClient, HttpNotificationApi};
use synctime_core::config::AppConfig;
use synctime_core::error::AppError;
use synctime_service::{BadgeCounter, FlashLog};

use crate::output::{self, OutputFormat};

/// Arguments for badge commands
#[derive(Debug, Args)]
pub struct BadgeArgs {
    /// Badge subcommand
    #[command(subcommand)]
    pub command: BadgeCommand,
}

/// Badge subcommands
#[derive(Debug, Subcommand)]
pub enum BadgeCommand {
    /// Show the unseen count
    Count,
    /// Mark everything seen and reset the badge
    Seen,
}

/// Execute badge commands
pub async fn execute(
    args: &BadgeArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let remote = Arc::new(HttpNotificationApi::new(ApiClient::new(&config.api)?));
    let flash = Arc::new(FlashLog::new());
    let badge = BadgeCounter::new(remote, flash.clone());

    let result = match &args.command {
        BadgeCommand::Count => badge.refresh().await.map(|_| {
            output::print_item(&badge.view(), format);
        }),
        BadgeCommand::Seen => badge.mark_seen().await.map(|()| {
            output::print_success("Notificações marcadas como vistas");
        }),
    };

    output::print_flashes(&flash.drain());
    result
}
