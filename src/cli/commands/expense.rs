use std::{fs, path::Path};

use super::{amount_arg, required, CommandDefinition};
use crate::api::{
    CreateExpenseRequest, DeleteExpenseRequest, EditExpenseRequest, ListExpensesRequest,
};
use crate::cli::context::{short_id, CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::domain::Identifiable;

const ADD_USAGE: &str =
    "add <amount> <category> [--date YYYY-MM-DD] [--note text] [--receipt path]";
const EDIT_USAGE: &str = "edit <id> <amount> <category> <date> [note]";
const DELETE_USAGE: &str = "delete <id>";
const LIST_USAGE: &str =
    "list [--month YYYY-MM] [--category name] [--search text] [--sort date-desc|date-asc|amount-desc|amount-asc]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("add", "Record an expense", ADD_USAGE, cmd_add),
        CommandDefinition::new("edit", "Change an expense", EDIT_USAGE, cmd_edit),
        CommandDefinition::new("delete", "Delete an expense", DELETE_USAGE, cmd_delete),
        CommandDefinition::new("list", "List and filter expenses", LIST_USAGE, cmd_list),
    ]
}

#[derive(Debug, Default, PartialEq)]
struct AddOptions {
    date: Option<String>,
    note: Option<String>,
    receipt: Option<String>,
}

fn parse_add_options(args: &[&str]) -> Result<AddOptions, CommandError> {
    let mut options = AddOptions::default();
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let slot = match *flag {
            "--date" => &mut options.date,
            "--note" => &mut options.note,
            "--receipt" => &mut options.receipt,
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unexpected argument `{}`; usage: {}",
                    other, ADD_USAGE
                )))
            }
        };
        let value = iter.next().ok_or_else(|| {
            CommandError::InvalidArguments(format!("`{}` needs a value", flag))
        })?;
        *slot = Some((*value).to_string());
    }
    Ok(options)
}

fn parse_list_options(args: &[&str]) -> Result<ListExpensesRequest, CommandError> {
    let mut request = ListExpensesRequest::default();
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let slot = match *flag {
            "--month" => &mut request.month,
            "--category" => &mut request.category,
            "--search" => &mut request.search,
            "--sort" => &mut request.sort,
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unexpected argument `{}`; usage: {}",
                    other, LIST_USAGE
                )))
            }
        };
        let value = iter.next().ok_or_else(|| {
            CommandError::InvalidArguments(format!("`{}` needs a value", flag))
        })?;
        *slot = Some((*value).to_string());
    }
    Ok(request)
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let amount = required(args, 0, ADD_USAGE)?;
    let category = required(args, 1, ADD_USAGE)?;
    let options = parse_add_options(&args[2..])?;

    let receipt = match &options.receipt {
        Some(path) => {
            let extension = Path::new(path).extension().and_then(|ext| ext.to_str());
            let bytes = fs::read(path)?;
            Some(context.receipts.store(&bytes, extension)?)
        }
        None => None,
    };

    let request = CreateExpenseRequest {
        amount: amount_arg(amount),
        category: category.to_string(),
        custom_category: None,
        date: options
            .date
            .unwrap_or_else(|| context.today().format("%Y-%m-%d").to_string()),
        description: options.note,
        receipt_url: receipt.as_ref().map(|r| r.url.clone()),
    };

    match context.api.create_expense(context.token(), request) {
        Ok(expense) => {
            output::success(format!(
                "Recorded {} for {} ({}).",
                context.money(expense.amount),
                expense.category,
                short_id(expense.id)
            ));
            if let Some(remaining) = context
                .api
                .current_allowance(context.token())?
                .map(|allowance| allowance.remaining)
            {
                output::info(format!("Remaining budget: {}", context.money(remaining)));
            }
            Ok(())
        }
        Err(err) => {
            // No expense references the upload.
            if let Some(receipt) = receipt {
                if let Err(cleanup) = context.receipts.delete(&receipt.public_id) {
                    tracing::warn!(error = %cleanup, "failed to remove unused receipt");
                }
            }
            Err(err.into())
        }
    }
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = context.resolve_expense_id(required(args, 0, EDIT_USAGE)?)?;
    let request = EditExpenseRequest {
        id,
        amount: amount_arg(required(args, 1, EDIT_USAGE)?),
        category: required(args, 2, EDIT_USAGE)?.to_string(),
        custom_category: None,
        date: required(args, 3, EDIT_USAGE)?.to_string(),
        description: (args.len() > 4).then(|| args[4..].join(" ")),
    };
    let expense = context.api.edit_expense(context.token(), request)?;
    output::success(format!(
        "Updated {}: {} for {}.",
        short_id(expense.id),
        context.money(expense.amount),
        expense.category
    ));
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = context.resolve_expense_id(required(args, 0, DELETE_USAGE)?)?;
    context
        .api
        .delete_expense(context.token(), DeleteExpenseRequest { id })?;
    output::success(format!("Deleted expense {}.", short_id(id)));
    Ok(())
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let request = parse_list_options(args)?;
    let filtered = request != ListExpensesRequest::default();
    let expenses = context.api.query_expenses(context.token(), request)?;
    if expenses.is_empty() {
        if filtered {
            output::info("No expenses match those filters.");
        } else {
            output::info("No expenses recorded yet.");
        }
        return Ok(());
    }
    let rows: Vec<Vec<String>> = expenses
        .iter()
        .map(|expense| {
            vec![
                short_id(expense.id()),
                expense.date.to_string(),
                expense.category.to_string(),
                context.money(expense.amount),
                expense.description.clone().unwrap_or_default(),
                (if expense.receipt_url.is_some() { "yes" } else { "" }).to_string(),
            ]
        })
        .collect();
    output::print_table(
        &["ID", "Date", "Category", "Amount", "Note", "Receipt"],
        &rows,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::context::test_support::{harness, run};
    use crate::errors::LedgerError;

    #[test]
    fn add_options_parse_flags_in_any_order() {
        let options = parse_add_options(&["--note", "nasi goreng", "--date", "2026-10-01"]).unwrap();
        assert_eq!(
            options,
            AddOptions {
                date: Some("2026-10-01".into()),
                note: Some("nasi goreng".into()),
                receipt: None,
            }
        );
        assert!(parse_add_options(&["--date"]).is_err());
        assert!(parse_add_options(&["oops"]).is_err());
    }

    #[test]
    fn add_edit_delete_keep_the_balance_consistent() {
        let mut h = harness();
        run(
            &mut h.context,
            &[
                "budget set 100000",
                "add 30000 Makanan --date 2026-10-18 --note \"nasi padang\"",
            ],
        );
        let expense = h.context.api.list_expenses(None).unwrap().remove(0);
        assert_eq!(expense.description.as_deref(), Some("nasi padang"));
        let remaining = |h: &crate::cli::context::test_support::Harness| {
            h.context
                .api
                .current_allowance(None)
                .unwrap()
                .unwrap()
                .remaining
        };
        assert_eq!(remaining(&h), 70_000);

        let edit = format!("edit {} 45000 Makanan 2026-10-18", short_id(expense.id));
        run(&mut h.context, &[edit.as_str()]);
        assert_eq!(remaining(&h), 55_000);

        let delete = format!("delete {}", short_id(expense.id));
        run(&mut h.context, &[delete.as_str()]);
        assert_eq!(remaining(&h), 100_000);
        assert!(h.context.api.list_expenses(None).unwrap().is_empty());
    }

    #[test]
    fn add_without_budget_reports_no_active_allowance() {
        let mut h = harness();
        let err = h
            .context
            .process_line("add 1000 Transportasi --date 2026-10-18")
            .unwrap_err();
        assert!(matches!(
            err,
            CommandError::Ledger(LedgerError::NoActiveAllowance { .. })
        ));
    }

    #[test]
    fn failed_add_removes_the_uploaded_receipt() {
        let mut h = harness();
        let photo = h._receipts_dir.path().join("photo.jpg");
        fs::write(&photo, b"jpeg").unwrap();
        let line = format!("add 1000 Makanan --receipt {}", photo.display());
        assert!(h.context.process_line(&line).is_err());

        let stored: Vec<_> = fs::read_dir(h._receipts_dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path() != photo)
            .collect();
        assert!(stored.is_empty());
    }

    #[test]
    fn add_defaults_to_the_shell_clock_date() {
        let mut h = harness();
        run(&mut h.context, &["budget set 100000", "add 12000 Makanan"]);
        let expense = h.context.api.list_expenses(None).unwrap().remove(0);
        assert_eq!(expense.date, chrono::NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
    }

    #[test]
    fn list_options_map_onto_the_filter_request() {
        let request = parse_list_options(&[
            "--sort",
            "amount-asc",
            "--month",
            "2026-10",
            "--search",
            "bakso",
        ])
        .unwrap();
        assert_eq!(
            request,
            ListExpensesRequest {
                month: Some("2026-10".into()),
                category: None,
                search: Some("bakso".into()),
                sort: Some("amount-asc".into()),
            }
        );
        assert!(parse_list_options(&["--month"]).is_err());
        assert!(parse_list_options(&["--colour", "red"]).is_err());
    }

    #[test]
    fn list_rejects_bad_filters() {
        let mut h = harness();
        let err = h.context.process_line("list --sort sideways").unwrap_err();
        assert!(matches!(
            err,
            CommandError::Ledger(LedgerError::Validation { field: "sort", .. })
        ));
        assert!(h.context.process_line("list --month 2026-10 --category Makanan").is_ok());
    }
}
