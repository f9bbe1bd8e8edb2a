//! CLI command definitions and dispatch.

pub mod badge;
pub mod inbox;
pub mod watch;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use synctime_api::{ApiClient, HttpCalendarApi, HttpNotificationApi};
use synctime_core::config::AppConfig;
use synctime_core::error::AppError;
use synctime_core::types::id::UserId;
use synctime_service::{
    BadgeCounter, DeepLinkResolver, DropdownPanel, FlashLog, MemorizedFilter,
    NotificationService, NotificationStore,
};

use crate::output::{self, OutputFormat};

/// SyncTime notification inbox from the terminal
#[derive(Debug, Parser)]
#[command(name = "synctime", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay (config/<env>.toml)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Act as this user instead of the memorized sign-in
    #[arg(short, long)]
    pub user: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Inbox listing and actions
    Inbox(inbox::InboxArgs),
    /// Unseen badge counter
    Badge(badge::BadgeArgs),
    /// Follow the push channel and print arriving notifications
    Watch(watch::WatchArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = load_config(&self.config, &self.env)?;

        match &self.command {
            Commands::Inbox(args) => {
                let user_id = resolve_user(self.user.as_deref(), &config).await?;
                inbox::execute(args, &config, user_id, self.format).await
            }
            Commands::Badge(args) => badge::execute(args, &config, self.format).await,
            Commands::Watch(args) => {
                let user_id = resolve_user(self.user.as_deref(), &config).await?;
                watch::execute(args, &config, user_id, self.format).await
            }
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str, env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path, env)
}

/// Helper: the explicit `--user`, else the memorized sign-in
async fn resolve_user(explicit: Option<&str>, config: &AppConfig) -> Result<UserId, AppError> {
    match explicit {
        Some(user) if !user.trim().is_empty() => Ok(UserId::from(user.trim())),
        _ => Ok(MemorizedFilter::load(&config.session.memorized_filter_path)
            .await?
            .id),
    }
}

/// Engine pieces for one-shot commands, without a push channel.
pub struct Workbench {
    pub flash: Arc<FlashLog>,
    pub service: Arc<NotificationService>,
    pub badge: Arc<BadgeCounter>,
    pub panel: DropdownPanel,
}

impl Workbench {
    /// Wire up the HTTP clients for `user_id`.
    pub fn new(config: &AppConfig, user_id: UserId) -> Result<Self, AppError> {
        let client = ApiClient::new(&config.api)?;
        let notifications = Arc::new(HttpNotificationApi::new(client.clone()));
        let calendar = Arc::new(HttpCalendarApi::new(client));
        let flash = Arc::new(FlashLog::new());

        let service = Arc::new(NotificationService::new(
            user_id,
            notifications.clone(),
            NotificationStore::new(),
            flash.clone(),
            config.session.mark_read_on_load,
        ));
        let badge = Arc::new(BadgeCounter::new(notifications, flash.clone()));
        let links = Arc::new(DeepLinkResolver::new(calendar, flash.clone()));
        let panel = DropdownPanel::new(service.clone(), badge.clone(), links);

        Ok(Self {
            flash,
            service,
            badge,
            panel,
        })
    }

    /// Print and clear flashes raised so far.
    pub fn report(&self) {
        output::print_flashes(&self.flash.drain());
    }
}
