use std::str::FromStr;

use super::{amount_arg, required, CommandDefinition};
use crate::api::SetAllowanceRequest;
use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::domain::{allowance::AllowancePeriod, period::Frequency};

const USAGE: &str = "budget show | budget set <amount> [monthly|weekly] | budget ensure <amount> [monthly|weekly]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "budget",
        "Show or set the allowance for the current period",
        USAGE,
        cmd_budget,
    )]
}

fn cmd_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let action = args.first().map(|a| a.to_lowercase());
    match action.as_deref() {
        None | Some("show") => show(context),
        Some("set") => {
            let request = request(context, &args[1..])?;
            let allowance = context.api.set_allowance(context.token(), request)?;
            output::success(format!(
                "Budget for {} set to {}.",
                allowance.period,
                context.money(allowance.amount)
            ));
            Ok(())
        }
        Some("ensure") => {
            let request = request(context, &args[1..])?;
            let allowance = context.api.ensure_allowance(context.token(), request)?;
            print_allowance(context, &allowance);
            Ok(())
        }
        Some(other) => Err(CommandError::InvalidArguments(format!(
            "unknown budget action `{}`; usage: {}",
            other, USAGE
        ))),
    }
}

fn request(context: &ShellContext, args: &[&str]) -> Result<SetAllowanceRequest, CommandError> {
    let amount = required(args, 0, USAGE)?;
    let frequency = match args.get(1) {
        Some(raw) => Frequency::from_str(raw)?,
        None => context.config.default_frequency,
    };
    Ok(SetAllowanceRequest {
        amount: amount_arg(amount),
        frequency,
    })
}

fn show(context: &ShellContext) -> CommandResult {
    match context.api.current_allowance(context.token())? {
        Some(allowance) => print_allowance(context, &allowance),
        None => {
            output::warning("No budget set for the current period.");
            output::hint("Set one with `budget set <amount> [monthly|weekly]`.");
        }
    }
    Ok(())
}

fn print_allowance(context: &ShellContext, allowance: &AllowancePeriod) {
    output::section(format!("Budget {} ({})", allowance.period, allowance.frequency));
    output::info(format!("  Amount   : {}", context.money(allowance.amount)));
    output::info(format!("  Spent    : {}", context.money(allowance.spent())));
    output::info(format!("  Remaining: {}", context.money(allowance.remaining)));
}

#[cfg(test)]
mod tests {
    use crate::cli::context::test_support::{harness, run};
    use crate::domain::period::Frequency;

    #[test]
    fn set_then_ensure_keeps_the_first_amount_until_reset() {
        let mut h = harness();
        run(&mut h.context, &["budget ensure 100000", "budget ensure 500000"]);
        let current = h.context.api.current_allowance(None).unwrap().unwrap();
        assert_eq!(current.amount, 100_000);

        run(&mut h.context, &["budget set \"Rp 250.000\" weekly"]);
        let current = h.context.api.current_allowance(None).unwrap().unwrap();
        // Monthly still wins the lookup.
        assert_eq!(current.frequency, Frequency::Monthly);

        run(&mut h.context, &["budget set 250000"]);
        let current = h.context.api.current_allowance(None).unwrap().unwrap();
        assert_eq!(current.amount, 250_000);
        assert_eq!(current.remaining, 250_000);
    }

    #[test]
    fn bad_frequency_is_rejected() {
        let mut h = harness();
        let err = h.context.process_line("budget set 1000 daily").unwrap_err();
        assert!(err.to_string().contains("frequency"));
    }
}
