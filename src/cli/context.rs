//! Shell state, dispatch, and error reporting.

use std::{io, sync::Arc};

use chrono::NaiveDate;
use strsim::levenshtein;
use uuid::Uuid;

use crate::{
    api::LedgerApi,
    config::{Config, ConfigError, ConfigManager},
    core::{
        identity::LocalIdentity,
        receipts::{LocalReceiptStore, ReceiptStore},
        services::{LedgerServices, MonthLabels},
        time::{Clock, SystemClock},
    },
    currency::{format_currency, MoneyFormat},
    errors::LedgerError,
    storage::SqliteStore,
};

use super::commands::{CommandDefinition, COMMANDS};
use super::output;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("exit requested")]
    ExitRequested,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub api: LedgerApi,
    pub config: Config,
    pub money: MoneyFormat,
    pub receipts: Arc<dyn ReceiptStore>,
    clock: Arc<dyn Clock>,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    /// Opens the configured data directory and ledger database.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let manager = ConfigManager::new()?;
        let mut config = manager.load()?;
        let owner = manager.ensure_local_owner(&mut config)?;
        let store = SqliteStore::open(&manager.database_path(&config))?;
        let receipts = LocalReceiptStore::new(manager.receipts_dir(&config));
        tracing::debug!(base = %manager.base_dir().display(), "shell opened data directory");

        Ok(Self::with_parts(
            mode,
            config,
            store,
            Arc::new(SystemClock),
            Arc::new(receipts),
            LocalIdentity::new(owner),
        ))
    }

    pub fn with_parts(
        mode: CliMode,
        config: Config,
        store: SqliteStore,
        clock: Arc<dyn Clock>,
        receipts: Arc<dyn ReceiptStore>,
        identity: LocalIdentity,
    ) -> Self {
        let services = LedgerServices::new(
            store,
            clock.clone(),
            MonthLabels::for_locale(&config.locale),
        );
        Self {
            mode,
            api: LedgerApi::new(Arc::new(identity), services),
            money: config.money_format(),
            config,
            receipts,
            clock,
            last_command: None,
            running: true,
        }
    }

    /// The CLI always acts as the local profile; the identity layer ignores the token.
    pub(crate) fn token(&self) -> Option<&str> {
        None
    }

    /// The calendar date the ledger services treat as today.
    pub(crate) fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub(crate) fn money(&self, amount: i64) -> String {
        format_currency(amount, &self.money)
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        COMMANDS.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&'static CommandDefinition> {
        COMMANDS.get(name)
    }

    pub(crate) fn prompt(&self) -> String {
        "allowance> ".to_string()
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(definition) = COMMANDS.get(command) {
            match (definition.handler)(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match super::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                output::warning(err);
                return Ok(LoopControl::Continue);
            }
        };

        let Some(raw) = tokens.first() else {
            return Ok(LoopControl::Continue);
        };
        let command = raw.to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.last_command = Some(line.trim().to_string());

        match self.dispatch(&command, raw, &args) {
            Ok(LoopControl::Exit) => {
                self.running = false;
                Ok(LoopControl::Exit)
            }
            other => other,
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let best = COMMANDS
            .names()
            .map(|name| (levenshtein(name, &needle), name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::info(format!("Suggestion: `{}`?", name));
            }
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            CommandError::Ledger(LedgerError::NoActiveAllowance { period }) => {
                output::error(format!("No budget set for {}.", period));
                output::hint("Set one with `budget set <amount> [monthly|weekly]`.");
            }
            CommandError::Ledger(LedgerError::InsufficientBalance {
                current_balance,
                requested_amount,
            }) => {
                output::error(format!(
                    "Not enough remaining budget: {} left, {} requested.",
                    self.money(current_balance),
                    self.money(requested_amount)
                ));
            }
            CommandError::Ledger(LedgerError::Storage(_)) => {
                output::error("Storage failure. See the log for details.");
            }
            other => output::error(other),
        }
    }

    /// Resolves a full expense id or a unique prefix of one from `list`.
    pub(crate) fn resolve_expense_id(&self, raw: &str) -> Result<Uuid, CommandError> {
        if let Ok(id) = Uuid::parse_str(raw) {
            return Ok(id);
        }
        let prefix = raw.trim().to_ascii_lowercase();
        if prefix.is_empty() {
            return Err(CommandError::InvalidArguments("expense id is required".into()));
        }
        let matches: Vec<Uuid> = self
            .api
            .list_expenses(self.token())?
            .into_iter()
            .map(|expense| expense.id)
            .filter(|id| id.simple().to_string().starts_with(&prefix))
            .collect();
        match matches.as_slice() {
            [id] => Ok(*id),
            [] => Err(CommandError::InvalidArguments(format!(
                "no expense matches `{}`",
                raw
            ))),
            _ => Err(CommandError::InvalidArguments(format!(
                "`{}` matches more than one expense; use more characters",
                raw
            ))),
        }
    }
}

pub(crate) fn short_id(id: Uuid) -> String {
    let mut short = id.simple().to_string();
    short.truncate(8);
    short
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::core::time::FixedClock;
    use crate::domain::owner::OwnerId;

    pub(crate) struct Harness {
        pub context: ShellContext,
        pub _receipts_dir: tempfile::TempDir,
    }

    pub(crate) fn harness() -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let context = ShellContext::with_parts(
            CliMode::Script,
            Config::default(),
            SqliteStore::open_in_memory().unwrap(),
            Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap())),
            Arc::new(LocalReceiptStore::new(dir.path())),
            LocalIdentity::new(OwnerId::random()),
        );
        Harness {
            context,
            _receipts_dir: dir,
        }
    }

    pub(crate) fn run(context: &mut ShellContext, lines: &[&str]) {
        for line in lines {
            match context.process_line(line) {
                Ok(LoopControl::Continue) => {}
                Ok(LoopControl::Exit) => break,
                Err(err) => context.report_error(err),
            }
        }
    }
}
