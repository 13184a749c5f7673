use std::path::PathBuf;

use brokedash_config::Config;
use brokedash_core::RecomputeStrategy;
use brokedash_domain::RankingPolicy;
use tracing::info;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};

/// Keys accepted by `config set`, in display order.
pub(crate) const SETTING_KEYS: [&str; 9] = [
    "ranking_policy",
    "recompute_strategy",
    "currency",
    "ui_color_enabled",
    "plain_output",
    "high_contrast",
    "quiet",
    "backup_retention",
    "data_root",
];

pub(crate) const CONFIG_ACTIONS: [&str; 4] = ["set", "backup", "backups", "restore"];

const CONFIG_USAGE: &str =
    "config [set <key> <value> | backup [note] | backups | restore <backup-name>]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "Show or change preferences",
        CONFIG_USAGE,
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((action, rest)) = args.split_first() else {
        show_config(context);
        return Ok(());
    };
    match (action.to_ascii_lowercase().as_str(), rest) {
        ("set", [key, value]) => set_value(context, key, value),
        ("backup", note) => {
            let note = (!note.is_empty()).then(|| note.join(" "));
            let name = context
                .config_manager
                .backup(&context.config, note.as_deref())?;
            output::success(format!("Configuration saved as `{}`.", name));
            Ok(())
        }
        ("backups", []) => {
            let backups = context.config_manager.list_backups()?;
            if backups.is_empty() {
                output::info("No configuration backups yet.");
                return Ok(());
            }
            let mut table = Table::new(vec![
                TableColumn::left("Backup"),
                TableColumn::left("Created"),
                TableColumn::left("Note"),
            ]);
            for backup in backups {
                table.push_row(vec![
                    backup.name,
                    backup
                        .created_at
                        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "unknown".into()),
                    backup.note.unwrap_or_default(),
                ]);
            }
            output::raw(table.render());
            Ok(())
        }
        ("restore", [name]) => {
            context.config = context.config_manager.restore(name)?;
            context.reload_services()?;
            output::success(format!("Configuration restored from `{}`.", name));
            Ok(())
        }
        _ => Err(CommandError::InvalidArguments(format!(
            "usage: {}",
            CONFIG_USAGE
        ))),
    }
}

fn show_config(context: &ShellContext) {
    let config = &context.config;
    output::section("Configuration");
    output::two_column(&[
        ("ranking_policy", config.ranking_policy.to_string()),
        ("recompute_strategy", config.recompute_strategy.to_string()),
        ("currency", config.currency.clone()),
        ("ui_color_enabled", config.ui_color_enabled.to_string()),
        ("backup_retention", config.backup_retention.to_string()),
        ("plain_output", config.output.plain_output.to_string()),
        ("high_contrast", config.output.high_contrast.to_string()),
        ("quiet", config.output.quiet.to_string()),
        ("data_root", context.data_root().display().to_string()),
        (
            "config_file",
            context.config_manager.config_path().display().to_string(),
        ),
    ]);
}

fn set_value(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let key = key.to_ascii_lowercase();
    apply_setting(&mut context.config, &key, value)?;
    context.persist_config()?;
    context.reload_services()?;
    info!(key = %key, value, "configuration updated");
    output::success(format!("Set {} = {}.", key, value));
    if matches!(key.as_str(), "ranking_policy" | "policy") {
        output::hint("Run `recompute` to re-rank everyone with the new policy.");
    }
    Ok(())
}

/// Validates and stores one setting on `config`.
pub(crate) fn apply_setting(config: &mut Config, key: &str, value: &str) -> CommandResult {
    match key {
        "ranking_policy" | "policy" => {
            config.ranking_policy = RankingPolicy::parse(value)
                .ok_or_else(|| invalid(key, value, "dense or strict"))?;
        }
        "recompute_strategy" | "strategy" => {
            config.recompute_strategy = RecomputeStrategy::parse(value)
                .ok_or_else(|| invalid(key, value, "global, user or manual"))?;
        }
        "currency" => {
            let code = value.trim();
            if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(invalid(key, value, "a currency code"));
            }
            config.currency = code.to_ascii_uppercase();
        }
        "ui_color_enabled" | "color" => config.ui_color_enabled = parse_bool(key, value)?,
        "plain_output" => config.output.plain_output = parse_bool(key, value)?,
        "high_contrast" => config.output.high_contrast = parse_bool(key, value)?,
        "quiet" => config.output.quiet = parse_bool(key, value)?,
        "backup_retention" | "retention" => {
            config.backup_retention = value
                .parse::<usize>()
                .ok()
                .filter(|count| *count > 0)
                .ok_or_else(|| invalid(key, value, "a positive number"))?;
        }
        "data_root" => {
            config.data_root = match value {
                "" | "default" => None,
                path => Some(PathBuf::from(path)),
            };
        }
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown setting `{}`",
                other
            )))
        }
    }
    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, CommandError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(invalid(key, value, "on or off")),
    }
}

fn invalid(key: &str, value: &str, expected: &str) -> CommandError {
    CommandError::InvalidArguments(format!(
        "invalid value `{}` for {} (expected {})",
        value, key, expected
    ))
}
