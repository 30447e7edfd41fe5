use std::collections::HashMap;

use once_cell::sync::Lazy;

pub mod budget;
pub mod expense;
pub mod report;
pub mod system;

use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::currency::AmountInput;

/// Command table shared by dispatch, help, and completion.
pub(crate) static COMMANDS: Lazy<CommandRegistry> =
    Lazy::new(|| CommandRegistry::new(all_definitions()));

pub(crate) fn all_definitions() -> Vec<CommandDefinition> {
    let mut commands = Vec::new();
    commands.extend(budget::definitions());
    commands.extend(expense::definitions());
    commands.extend(report::definitions());
    commands.extend(system::definitions());
    commands
}

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDefinition>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new(definitions: Vec<CommandDefinition>) -> Self {
        let mut commands = HashMap::new();
        let mut order = Vec::new();
        for definition in definitions {
            order.push(definition.name);
            commands.insert(definition.name, definition);
        }
        Self { commands, order }
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.order
            .iter()
            .filter_map(move |name| self.commands.get(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }
}

/// Plain numbers (including decimals) are rounded; anything else is treated as
/// formatted currency text such as `Rp 1.250.000`.
pub(crate) fn amount_arg(raw: &str) -> AmountInput {
    match raw.trim().parse::<f64>() {
        Ok(value) => AmountInput::Number(value),
        Err(_) => AmountInput::Text(raw.to_string()),
    }
}

pub(crate) fn required<'a>(
    args: &[&'a str],
    index: usize,
    usage: &str,
) -> Result<&'a str, CommandError> {
    args.get(index)
        .copied()
        .ok_or_else(|| CommandError::InvalidArguments(format!("usage: {}", usage)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_keeps_definition_order_and_unique_names() {
        let names: Vec<&str> = COMMANDS.names().collect();
        assert_eq!(names.first(), Some(&"budget"));
        assert!(names.contains(&"summary"));
        let mut deduped = names.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), names.len());
    }

    #[test]
    fn amount_args_accept_plain_and_formatted_numbers() {
        assert_eq!(amount_arg("150000.75").canonical().unwrap(), 150_001);
        assert_eq!(amount_arg("Rp 1.250.000").canonical().unwrap(), 1_250_000);
        assert_eq!(amount_arg("1.250.000").canonical().unwrap(), 1_250_000);
    }
}
