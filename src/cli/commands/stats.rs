use brokedash_core::{public_api, CategoryBucket};
use brokedash_domain::CATEGORIES;

use crate::cli::core::{expect_no_more, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};

const BAR_WIDTH: f64 = 30.0;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "distribution",
            "Show how the leaderboard spreads across categories",
            "distribution",
            cmd_distribution,
        ),
        CommandEntry::new(
            "categories",
            "List the ten leaderboard categories",
            "categories",
            cmd_categories,
        ),
    ]
}

fn cmd_distribution(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_no_more(args, "distribution")?;
    let buckets = public_api::api_distribution(&context.service)?;
    let population: usize = buckets.iter().map(|bucket| bucket.count).sum();

    output::section(format!("Distribution ({} ranked)", population));
    if population == 0 {
        output::info("Nobody has been ranked yet.");
        return Ok(());
    }
    output::raw(render_distribution(&buckets));
    Ok(())
}

fn cmd_categories(_context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_no_more(args, "categories")?;
    output::section("Categories");
    let mut table = Table::new(vec![
        TableColumn::right("#"),
        TableColumn::left("Category"),
        TableColumn::left("Percentile"),
    ]);
    for category in CATEGORIES.iter() {
        table.push_row(vec![
            category.index.to_string(),
            format!("{} {}", category.emoji, category.name),
            category.range.to_string(),
        ]);
    }
    output::raw(table.render());
    output::hint("Lower percentiles spend the largest share of their income.");
    Ok(())
}

fn render_distribution(buckets: &[CategoryBucket]) -> String {
    let mut table = Table::new(vec![
        TableColumn::left("Category"),
        TableColumn::left("Range"),
        TableColumn::right("Count"),
        TableColumn::right("Share"),
        TableColumn::left(""),
    ]);
    for bucket in buckets {
        let bar_len = (bucket.share / 100.0 * BAR_WIDTH).round() as usize;
        table.push_row(vec![
            format!("{} {}", bucket.emoji, bucket.name),
            bucket.range.to_string(),
            bucket.count.to_string(),
            format!("{:.1}%", bucket.share),
            "#".repeat(bar_len),
        ]);
    }
    table.render()
}
