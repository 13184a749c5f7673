use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "backups",
        "List or restore leaderboard snapshots saved before each full recompute",
        "backups [restore <backup-id>]",
        cmd_backups,
    )]
}

fn cmd_backups(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => list_backups(context),
        [action, id] if action.eq_ignore_ascii_case("restore") => {
            let entries = context.storage.restore_backup(id)?;
            output::success(format!(
                "Restored `{}` ({} ranked profiles).",
                id,
                entries.len()
            ));
            Ok(())
        }
        _ => Err(CommandError::InvalidArguments(
            "usage: backups [restore <backup-id>]".into(),
        )),
    }
}

fn list_backups(context: &ShellContext) -> CommandResult {
    let backups = context.storage.list_backups()?;
    if backups.is_empty() {
        output::info("No leaderboard backups yet.");
        return Ok(());
    }
    output::section("Leaderboard backups");
    let mut table = Table::new(vec![
        TableColumn::left("Backup"),
        TableColumn::left("Created"),
        TableColumn::right("Size"),
    ]);
    for backup in backups {
        table.push_row(vec![
            backup.id,
            backup
                .created_at
                .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "unknown".into()),
            format!("{} B", backup.size_bytes),
        ]);
    }
    output::raw(table.render());
    Ok(())
}
