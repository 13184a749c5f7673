pub mod backup;
pub mod config;
pub mod profile;
pub mod ranking;
pub mod stats;
pub mod system;

use crate::cli::registry::{CommandEntry, CommandRegistry};

const ROOT_COMMAND_ORDER: &[&str] = &[
    "submit",
    "profile",
    "recompute",
    "leaderboard",
    "standing",
    "distribution",
    "categories",
    "backups",
    "config",
    "help",
    "version",
    "exit",
];

pub(crate) fn all_entries() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(profile::definitions());
    commands.extend(ranking::definitions());
    commands.extend(stats::definitions());
    commands.extend(backup::definitions());
    commands.extend(config::definitions());
    commands.extend(system::definitions());
    commands
}

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    let mut entries = all_entries();
    entries.sort_by_key(|entry| {
        ROOT_COMMAND_ORDER
            .iter()
            .position(|name| entry.name.eq_ignore_ascii_case(name))
            .unwrap_or(ROOT_COMMAND_ORDER.len())
    });
    for entry in entries {
        registry.register(entry);
    }
}

/// Formats an amount with the configured currency.
pub(crate) fn format_money(amount: f64, currency: &str) -> String {
    let symbol = match currency.to_ascii_uppercase().as_str() {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        _ => return format!("{:.2} {}", amount, currency),
    };
    format!("{}{:.2}", symbol, amount)
}
