mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;

fn cli(base: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("allowance_core_cli").unwrap();
    cmd.env("ALLOWANCE_CORE_CLI_SCRIPT", "1")
        .env("ALLOWANCE_CORE_HOME", base)
        .env("NO_COLOR", "1")
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn script_mode_runs_basic_flow() {
    let base = common::temp_base();
    let input = "budget set 100000\nadd 30000 Makanan --note \"nasi padang\"\nbudget show\nlist\nexit\n";

    cli(&base)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Recorded Rp 30.000 for Makanan"))
        .stdout(contains("Remaining: Rp 70.000"))
        .stdout(contains("nasi padang"));

    assert!(base.join("ledger.sqlite3").exists());
    assert!(base.join("config").join("config.json").exists());
}

#[test]
fn state_persists_between_runs() {
    let base = common::temp_base();
    cli(&base)
        .write_stdin("budget set 50000 weekly\nadd 20000 Transportasi\n")
        .assert()
        .success();

    cli(&base)
        .write_stdin("budget show\nsummary\n")
        .assert()
        .success()
        .stdout(contains("Remaining: Rp 30.000"))
        .stdout(contains("Transactions: 1"));
}

#[test]
fn rejected_expense_is_reported_and_script_continues() {
    let base = common::temp_base();
    cli(&base)
        .write_stdin("budget set 20000\nadd 50000 Makanan\nbudget show\n")
        .assert()
        .success()
        .stdout(contains("Not enough remaining budget: Rp 20.000 left, Rp 50.000 requested."))
        .stdout(contains("Remaining: Rp 20.000"));
}

#[test]
fn unknown_commands_get_a_suggestion() {
    let base = common::temp_base();
    cli(&base)
        .write_stdin("sumary\n")
        .assert()
        .success()
        .stdout(contains("Unknown command `sumary`"))
        .stdout(contains("Suggestion: `summary`?"));
}

#[test]
fn adding_without_a_budget_prompts_for_one() {
    let base = common::temp_base();
    cli(&base)
        .write_stdin("add 1000 Makanan\n")
        .assert()
        .success()
        .stdout(contains("No budget set for"))
        .stdout(contains("budget set <amount>"));
}

#[test]
fn list_filters_narrow_the_table() {
    let base = common::temp_base();
    let input = "budget set 100000\n\
        add 10000 Makanan --date 2026-01-05 --note \"bakso urat\"\n\
        add 7000 Transportasi --date 2026-02-01 --note \"bus kota\"\n\
        list --search bakso\n";
    cli(&base)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("bakso urat"))
        .stdout(contains("bus kota").not());
}
