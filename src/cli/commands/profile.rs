use brokedash_core::{public_api, ProfileService, RankingEngine, RefreshOutcome};
use brokedash_domain::{days_till_broke_label, short_id, IncomeBracket};
use uuid::Uuid;

use super::format_money;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

const SUBMIT_USAGE: &str = "submit <bracket> <monthly-spend> [profile-id]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "submit",
            "Submit or update an income bracket and monthly spend",
            SUBMIT_USAGE,
            cmd_submit,
        ),
        CommandEntry::new(
            "profile",
            "Show a stored profile",
            "profile [profile-id]",
            cmd_profile,
        ),
    ]
}

fn cmd_submit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (bracket_raw, spend_raw, id_raw) = match args {
        [bracket, spend] => (*bracket, *spend, None),
        [bracket, spend, id] => (*bracket, *spend, Some(*id)),
        _ => {
            return Err(CommandError::InvalidArguments(format!(
                "usage: {}",
                SUBMIT_USAGE
            )))
        }
    };

    if IncomeBracket::parse_label(bracket_raw).is_none() {
        output::warning(format!(
            "Unknown bracket `{}`, using `{}`. Known brackets: {}",
            bracket_raw,
            IncomeBracket::default(),
            bracket_labels()
        ));
    }
    let spend = ProfileService::parse_spend(spend_raw)?;
    let id = match id_raw {
        Some(raw) => Some(context.resolve_profile_id(raw)?),
        None => None,
    };

    let submission = public_api::api_submit_profile(
        &context.service,
        id,
        bracket_raw,
        spend,
        context.strategy(),
    )?;
    let profile = &submission.profile;

    if profile.monthly_spend < spend {
        output::warning(format!(
            "Spend capped at {} for the {} bracket.",
            format_money(profile.monthly_spend, &context.config.currency),
            profile.income_bracket
        ));
    }
    output::success(format!(
        "Saved profile {} ({}, {} per month).",
        short_id(profile.id),
        profile.income_bracket,
        format_money(profile.monthly_spend, &context.config.currency)
    ));

    match &submission.refresh {
        RefreshOutcome::Global(summary) => output::info(format!(
            "Leaderboard recomputed for {} profiles.",
            summary.updated_count
        )),
        RefreshOutcome::User(entry) => output::info(format!(
            "Ranked #{} {} {} ({:.1}th percentile).",
            entry.rank, entry.emoji, entry.category, entry.percentile
        )),
        RefreshOutcome::Skipped => {
            output::hint("Ranking deferred. Run `recompute` to refresh the leaderboard.")
        }
    }

    remember_profile(context, profile.id)
}

fn cmd_profile(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() > 1 {
        return Err(CommandError::InvalidArguments(
            "usage: profile [profile-id]".into(),
        ));
    }
    let id = context.profile_arg(args.first().copied())?;
    let profile = ProfileService::get(context.storage.as_ref(), id)?;
    let currency = context.config.currency.clone();
    let days = RankingEngine::days_till_broke(profile.income_bracket, profile.monthly_spend);

    output::section(format!("Profile {}", short_id(profile.id)));
    let mut rows = vec![
        ("Id", profile.id.to_string()),
        ("Bracket", profile.income_bracket.to_string()),
        (
            "Annual income",
            format_money(profile.income_bracket.annual_income(), &currency),
        ),
        ("Monthly spend", format_money(profile.monthly_spend, &currency)),
        ("Score", format!("{:.4}", RankingEngine::score(&profile))),
        ("Days till broke", days_till_broke_label(days)),
        ("Created", profile.created_at.format("%Y-%m-%d %H:%M").to_string()),
        ("Updated", profile.updated_at.format("%Y-%m-%d %H:%M").to_string()),
    ];
    match context.service.entry(id)? {
        Some(entry) => {
            rows.push(("Stored rank", format!("#{}", entry.rank)));
            rows.push(("Category", format!("{} {}", entry.emoji, entry.category)));
            if entry.updated_at < profile.updated_at {
                rows.push(("Note", "ranking is older than this profile".into()));
            }
        }
        None => rows.push(("Stored rank", "not ranked yet".into())),
    }
    output::two_column(&rows);
    Ok(())
}

fn remember_profile(context: &mut ShellContext, id: Uuid) -> CommandResult {
    context.config.last_profile_id = Some(id.to_string());
    context.persist_config()
}

fn bracket_labels() -> String {
    IncomeBracket::ALL
        .iter()
        .map(|bracket| bracket.label())
        .collect::<Vec<_>>()
        .join(", ")
}
