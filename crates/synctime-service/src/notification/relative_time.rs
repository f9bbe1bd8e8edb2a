//! Coarse "time ago" labels shown next to each notification.

use chrono::{DateTime, Utc};

/// Formats the distance from `created_at` to `now`.
///
/// Both instants are UTC. Timestamps in the future read as "Agora".
pub fn format_relative(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - created_at).num_seconds();
    if seconds < 60 {
        return "Agora".to_string();
    }

    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes} min atrás");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return plural(hours, "hora", "horas");
    }

    plural(hours / 24, "dia", "dias")
}

fn plural(n: i64, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one} atrás")
    } else {
        format!("{n} {many} atrás")
    }
}
