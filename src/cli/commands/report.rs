use super::{required, CommandDefinition};
use crate::cli::context::{CommandResult, ShellContext};
use crate::cli::output;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "summary",
            "Totals by category and by month",
            "summary",
            cmd_summary,
        ),
        CommandDefinition::new(
            "month",
            "Category split of one month with percentages",
            "month <YYYY-MM>",
            cmd_month,
        ),
    ]
}

fn cmd_summary(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let summary = context.api.summary(context.token())?;

    output::section("Summary");
    output::info(format!("  Total       : {}", context.money(summary.total_expense)));
    output::info(format!("  Transactions: {}", summary.total_transactions));
    output::info(format!("  Average     : {}", context.money(summary.average_expense)));

    if summary.total_transactions == 0 {
        return Ok(());
    }

    output::section("By category");
    let rows: Vec<Vec<String>> = summary
        .expenses_by_category
        .iter()
        .map(|row| {
            vec![
                row.category.to_string(),
                context.money(row.amount),
                row.count.to_string(),
            ]
        })
        .collect();
    output::print_table(&["Category", "Amount", "Count"], &rows);

    output::section("By month");
    let rows: Vec<Vec<String>> = summary
        .expenses_by_month
        .iter()
        .map(|row| {
            vec![
                row.label.clone(),
                context.money(row.total),
                row.transaction_count.to_string(),
            ]
        })
        .collect();
    output::print_table(&["Month", "Total", "Count"], &rows);
    Ok(())
}

fn cmd_month(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let month = required(args, 0, "month <YYYY-MM>")?;
    let breakdown = context.api.month_breakdown(context.token(), month)?;

    output::section(format!("{} ({})", breakdown.label, breakdown.period_key));
    if breakdown.categories.is_empty() {
        output::info("No expenses in this month.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = breakdown
        .categories
        .iter()
        .map(|share| {
            vec![
                share.category.to_string(),
                context.money(share.amount),
                format!("{:.1}%", share.percentage),
            ]
        })
        .collect();
    output::print_table(&["Category", "Amount", "Share"], &rows);
    output::info(format!("Total: {}", context.money(breakdown.total)));
    Ok(())
}
