use brokedash_core::{
    public_api, storage::snapshot_warnings, LeaderboardQuery, LeaderboardSort, ProfileStorage,
    RankingEngine, SortDirection,
};
use brokedash_domain::{days_till_broke_label, short_id, RankedEntry};
use uuid::Uuid;

use super::format_money;
use crate::cli::core::{
    expect_no_more, parse_positive, CommandError, CommandResult, ShellContext,
};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};

const LEADERBOARD_USAGE: &str = "leaderboard [--sort rank|days|income|spend] [--desc] [page]";
const OWN_ROW_MARKER: &str = "*";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "recompute",
            "Recompute the leaderboard for everyone or a single user",
            "recompute [user <profile-id>]",
            cmd_recompute,
        ),
        CommandEntry::new(
            "leaderboard",
            "Show the stored leaderboard a page at a time, biggest spenders first",
            LEADERBOARD_USAGE,
            cmd_leaderboard,
        ),
        CommandEntry::new(
            "standing",
            "Show where a profile stands against everyone else",
            "standing [profile-id]",
            cmd_standing,
        ),
    ]
}

fn cmd_recompute(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => {
            let summary = public_api::api_recompute_global(&context.service)?;
            output::success(format!(
                "Leaderboard recomputed for {} profiles ({} ranking).",
                summary.updated_count,
                context.policy()
            ));
        }
        [scope, rest @ ..] if scope.eq_ignore_ascii_case("user") => {
            expect_no_more(rest.get(1..).unwrap_or_default(), "recompute user <profile-id>")?;
            let id = context.profile_arg(rest.first().copied())?;
            let entry = public_api::api_recompute_user(&context.service, id)?;
            output::success(format!(
                "Profile {} ranked #{} {} {}.",
                short_id(entry.id),
                entry.rank,
                entry.emoji,
                entry.category
            ));
            output::hint("Other rows keep their previous ranks until the next full recompute.");
        }
        _ => {
            return Err(CommandError::InvalidArguments(
                "usage: recompute [user <profile-id>]".into(),
            ))
        }
    }
    Ok(())
}

fn cmd_leaderboard(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let query = parse_leaderboard_args(args)?;
    let page = public_api::api_leaderboard_page(&context.service, &query)?;
    if page.total == 0 {
        output::info("The leaderboard is empty.");
        output::hint("Submit a profile with `submit <bracket> <spend>` and run `recompute`.");
        return Ok(());
    }

    let own = context.last_profile();
    output::section(format!(
        "Leaderboard page {} of {} ({} ranked)",
        page.page + 1,
        page.page_count,
        page.total
    ));
    output::raw(render_leaderboard(
        &page.entries,
        &context.config.currency,
        own,
    ));
    if page.page + 1 < page.page_count {
        output::hint(format!("Next page: `leaderboard {}`.", page.page + 2));
    }

    if let Some(entry) = own.map(|id| context.service.entry(id)).transpose()?.flatten() {
        let category = RankingEngine::categorize(entry.percentile);
        output::info(format!(
            "You are a {} {} ({} percentile).",
            category.emoji, category.name, category.range
        ));
    }

    let all_entries = context.service.leaderboard(None)?;
    let profiles = context.storage.list_profiles()?;
    for warning in snapshot_warnings(&profiles, &all_entries) {
        output::warning(warning);
    }
    Ok(())
}

fn parse_leaderboard_args(args: &[&str]) -> Result<LeaderboardQuery, CommandError> {
    let usage = || CommandError::InvalidArguments(format!("usage: {}", LEADERBOARD_USAGE));
    let mut query = LeaderboardQuery::default();
    let mut page = None;
    let mut args = args.iter();
    while let Some(arg) = args.next() {
        match arg.to_ascii_lowercase().as_str() {
            "--sort" => {
                let key = args.next().ok_or_else(usage)?;
                query.sort = LeaderboardSort::parse(key).ok_or_else(|| {
                    CommandError::InvalidArguments(format!(
                        "unknown sort key `{}` (expected rank, days, income or spend)",
                        key
                    ))
                })?;
            }
            "--desc" => query.direction = SortDirection::Descending,
            "--asc" => query.direction = SortDirection::Ascending,
            _ if page.is_none() => page = Some(parse_positive(arg)?),
            _ => return Err(usage()),
        }
    }
    query.page = page.map_or(0, |page| page - 1);
    Ok(query)
}

fn cmd_standing(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() > 1 {
        return Err(CommandError::InvalidArguments(
            "usage: standing [profile-id]".into(),
        ));
    }
    let id = context.profile_arg(args.first().copied())?;
    let standing = public_api::api_standing(&context.service, id)?;
    let entry = &standing.entry;

    output::section(format!("Standing of {}", short_id(entry.id)));
    output::two_column(&[
        (
            "Rank",
            format!("#{} of {}", entry.rank, standing.population),
        ),
        ("Percentile", format!("{:.1}", entry.percentile)),
        ("Category", format!("{} {}", entry.emoji, entry.category)),
        ("Days till broke", days_till_broke_label(entry.days_till_broke)),
        (
            "Monthly spend",
            format_money(entry.monthly_spend, &context.config.currency),
        ),
    ]);
    output::info(format!(
        "You spend more than {:.1}% of people relative to your income.",
        standing.spend_more_than
    ));
    Ok(())
}

/// Renders rows as given, marking the row that belongs to `own`.
pub(crate) fn render_leaderboard(
    entries: &[RankedEntry],
    currency: &str,
    own: Option<Uuid>,
) -> String {
    let mut table = Table::new(vec![
        TableColumn::left(""),
        TableColumn::right("Rank"),
        TableColumn::left("Profile"),
        TableColumn::left("Bracket"),
        TableColumn::right("Spend"),
        TableColumn::right("Score"),
        TableColumn::right("Pct"),
        TableColumn::left("Category").max_width(24),
        TableColumn::right("Days"),
    ]);
    for entry in entries {
        let marker = if Some(entry.id) == own { OWN_ROW_MARKER } else { "" };
        table.push_row(vec![
            marker.to_string(),
            entry.rank.to_string(),
            short_id(entry.id),
            entry.income_bracket.to_string(),
            format_money(entry.monthly_spend, currency),
            format!("{:.4}", entry.score),
            format!("{:.1}", entry.percentile),
            format!("{} {}", entry.emoji, entry.category),
            days_till_broke_label(entry.days_till_broke),
        ]);
    }
    table.render()
}
