//! Inbox commands: list, read, delete, clear read, open.

use chrono::Utc;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use synctime_core::config::AppConfig;
use synctime_core::error::AppError;
use synctime_core::types::filter::{StatusFilter, TypeFilter};
use synctime_core::types::id::{NotificationId, UserId};
use synctime_service::view::NotificationRow;

use super::Workbench;
use crate::output::{self, OutputFormat};

/// Arguments for inbox commands
#[derive(Debug, Args)]
pub struct InboxArgs {
    /// Inbox subcommand
    #[command(subcommand)]
    pub command: InboxCommand,
}

/// Inbox subcommands
#[derive(Debug, Subcommand)]
pub enum InboxCommand {
    /// List notifications
    List {
        /// Read state: all, unread or read
        #[arg(short, long, default_value = "all")]
        status: StatusFilter,
        /// Entity tag, or "all"
        #[arg(short = 't', long = "type", default_value = "all")]
        type_filter: TypeFilter,
    },
    /// Mark one notification read
    Read {
        /// Notification ID
        id: String,
    },
    /// Delete one notification
    Delete {
        /// Notification ID
        id: String,
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
    /// Delete every read notification of a type
    ClearRead {
        /// Entity tag, or "all"
        #[arg(short = 't', long = "type", default_value = "all")]
        type_filter: TypeFilter,
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
    /// Resolve where a notification links to
    Open {
        /// Notification ID
        id: String,
    },
}

/// Notification display row
#[derive(Debug, Serialize, Tabled)]
struct InboxRow {
    /// Notification ID
    id: String,
    /// When
    when: String,
    /// Read
    read: String,
    /// Entity
    entity: String,
    /// Text
    text: String,
}

impl From<NotificationRow> for InboxRow {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: row.id.0,
            when: row.when,
            read: if row.read { "✓" } else { "•" }.to_string(),
            entity: row.entity,
            text: row.text,
        }
    }
}

/// Execute inbox commands
pub async fn execute(
    args: &InboxArgs,
    config: &AppConfig,
    user_id: UserId,
    format: OutputFormat,
) -> Result<(), AppError> {
    let bench = Workbench::new(config, user_id)?;
    let loaded = bench.panel.open().await;
    bench.report();
    loaded?;

    let result = run(args, &bench, format).await;
    bench.report();
    result
}

async fn run(args: &InboxArgs, bench: &Workbench, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        InboxCommand::List {
            status,
            type_filter,
        } => {
            bench.panel.select_status(*status);
            bench.panel.select_type(type_filter.clone());
            let view = bench.panel.view(Utc::now());

            if &view.type_filter != type_filter {
                output::print_warning(&format!("Nenhuma notificação do tipo '{type_filter}'"));
            }

            let rows: Vec<InboxRow> = view.rows.into_iter().map(InboxRow::from).collect();
            output::print_list(&rows, format);

            if format == OutputFormat::Table {
                let facets: Vec<String> = view.facets.iter().map(ToString::to_string).collect();
                output::print_kv("Total", &view.counts.total.to_string());
                output::print_kv("Não lidas", &view.counts.unread.to_string());
                output::print_kv("Lidas", &view.counts.read.to_string());
                output::print_kv("Tipos", &facets.join(", "));
            }
        }
        InboxCommand::Read { id } => {
            let id = NotificationId::from(id.as_str());
            bench.panel.mark_read(&id).await?;
            output::print_success(&format!("Notificação {id} marcada como lida"));
        }
        InboxCommand::Delete { id, force } => {
            let id = NotificationId::from(id.as_str());
            if !force && !confirm(&format!("Excluir a notificação {id}?"))? {
                println!("Cancelado.");
                return Ok(());
            }
            bench.panel.delete(&id).await?;
            output::print_success(&format!("Notificação {id} excluída"));
        }
        InboxCommand::ClearRead { type_filter, force } => {
            let pending = bench.service.store().read_ids_for(type_filter).len();
            if pending == 0 {
                println!("Nenhuma notificação lida para limpar.");
                return Ok(());
            }
            if !force && !confirm(&format!("Excluir {pending} notificações lidas?"))? {
                println!("Cancelado.");
                return Ok(());
            }
            let removed = bench.service.clear_read(type_filter).await?;
            output::print_success(&format!("{removed} notificações excluídas"));
        }
        InboxCommand::Open { id } => {
            let id = NotificationId::from(id.as_str());
            let target = bench.panel.activate(&id).await?;
            output::print_item(&target, format);
            if format == OutputFormat::Table {
                output::print_kv("href", &target.to_href());
            }
        }
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool, AppError> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}
