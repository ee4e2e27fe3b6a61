// 🎛️ Dispatcher - command line → registry → operation → history
// Turns one line of input into a Reply; never prints, never exits

use crate::error::{CalcError, Result};
use crate::history::{parse_entry_id, HistoryEntry, HistoryStore};
use crate::menu::{render_help, render_history, render_menu};
use crate::number::{validate_all, validate_pair, RawOperand};
use crate::operations::Arity;
use crate::registry::OperationRegistry;
use rust_decimal::Decimal;
use tracing::{error, info, warn};

// ============================================================================
// COMMANDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Empty,
    Menu,
    Help,
    Exit,
    History,
    /// Clear needs a yes/no confirmation when chosen from the menu
    ConfirmClear,
    Clear,
    /// Remove chosen from the menu, id still to be asked
    PromptRemove,
    Remove(u64),
    Reload,
    Browse,
    Calculate {
        operation: String,
        operands: Vec<String>,
    },
}

/// Parse one input line (already trimmed or not; case is ignored)
pub fn parse_command(line: &str) -> Result<Command> {
    let lowered = line.trim().to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();

    let command = match tokens.as_slice() {
        [] => Command::Empty,
        ["menu"] => Command::Menu,
        ["help"] => Command::Help,
        ["exit"] | ["quit"] | ["5"] => Command::Exit,
        ["history"] | ["1"] => Command::History,
        ["clear"] => Command::Clear,
        ["2"] => Command::ConfirmClear,
        ["3"] => Command::PromptRemove,
        ["remove", id] => match parse_entry_id(id) {
            Some(id) => Command::Remove(id),
            None => {
                return Err(CalcError::MalformedInput(format!(
                    "'{}' is not a valid entry ID. Expected: remove <id>",
                    id
                )))
            }
        },
        ["remove", ..] => {
            return Err(CalcError::MalformedInput("Expected: remove <id>".to_string()))
        }
        ["reload"] | ["4"] => Command::Reload,
        ["browse"] => Command::Browse,
        [operation, operands @ ..] => {
            if operands.len() < 2 {
                return Err(CalcError::MalformedInput(
                    "Expected: operation num1 num2 [...]".to_string(),
                ));
            }
            Command::Calculate {
                operation: operation.to_string(),
                operands: operands.iter().map(|s| s.to_string()).collect(),
            }
        }
    };

    Ok(command)
}

// ============================================================================
// REPLIES
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Nothing to show
    Silent,
    Text(String),
    Calculated {
        operation: String,
        result: Decimal,
        history_id: Option<u64>,
    },
    /// Ask the user before clearing
    ConfirmClear,
    /// Ask the user which entry to remove
    PromptRemove(String),
    Browse(Vec<HistoryEntry>),
    Exit,
}

// ============================================================================
// DISPATCHER
// ============================================================================

/// Dispatcher - owns the registry and the history store
pub struct Dispatcher {
    registry: OperationRegistry,
    history: HistoryStore,
}

impl Dispatcher {
    pub fn new(registry: OperationRegistry, history: HistoryStore) -> Self {
        Dispatcher { registry, history }
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    pub fn history(&mut self) -> &mut HistoryStore {
        &mut self.history
    }

    /// Parse and execute one line
    pub fn handle_line(&mut self, line: &str) -> Result<Reply> {
        let command = parse_command(line)?;
        self.execute(command)
    }

    pub fn execute(&mut self, command: Command) -> Result<Reply> {
        match command {
            Command::Empty => Ok(Reply::Silent),
            Command::Menu => {
                info!("menu displayed");
                Ok(Reply::Text(render_menu(&self.registry.names())))
            }
            Command::Help => Ok(Reply::Text(render_help(&self.registry))),
            Command::Exit => {
                info!("exiting calculator");
                Ok(Reply::Exit)
            }
            Command::History => {
                let entries = self.history.list();
                if entries.is_empty() {
                    warn!("no calculations found");
                } else {
                    info!(count = entries.len(), "calculation history viewed");
                }
                Ok(Reply::Text(render_history(entries)))
            }
            Command::ConfirmClear => Ok(Reply::ConfirmClear),
            Command::Clear => {
                self.history.clear()?;
                Ok(Reply::Text("✅ History cleared successfully!".to_string()))
            }
            Command::PromptRemove => {
                let entries = self.history.list();
                if entries.is_empty() {
                    warn!("no history available to remove");
                    return Ok(Reply::Text("⚠️ No history available to remove.".to_string()));
                }
                Ok(Reply::PromptRemove(render_history(entries)))
            }
            Command::Remove(id) => {
                if self.history.remove(id)? {
                    Ok(Reply::Text(format!("✅ Entry {} removed successfully.", id)))
                } else {
                    Ok(Reply::Text(format!("⚠️ Entry with ID {} not found.", id)))
                }
            }
            Command::Reload => {
                let count = self.history.reload().len();
                Ok(Reply::Text(format!("🔄 History reloaded successfully ({} entries).", count)))
            }
            Command::Browse => Ok(Reply::Browse(self.history.list().to_vec())),
            Command::Calculate { operation, operands } => {
                let raw: Vec<RawOperand> = operands.into_iter().map(RawOperand::Str).collect();
                let (result, history_id) = self.calculate(&operation, &raw)?;
                Ok(Reply::Calculated {
                    operation,
                    result,
                    history_id,
                })
            }
        }
    }

    /// Validate, run and record one computation
    ///
    /// History is only written after the operation succeeds.
    pub fn calculate(&mut self, name: &str, raw: &[RawOperand]) -> Result<(Decimal, Option<u64>)> {
        let operation = self.registry.get(name)?;
        let key = operation.name().to_string();

        info!(operation = %key, inputs = ?raw.iter().map(|r| r.to_string()).collect::<Vec<_>>(), "running operation");

        let operands = match operation.arity() {
            Arity::Binary => match raw {
                [a, b] => {
                    let (a, b) = validate_pair(a, b)?;
                    vec![a, b]
                }
                _ => {
                    return Err(CalcError::MalformedInput(format!(
                        "Expected: {} num1 num2",
                        key
                    )))
                }
            },
            Arity::Variadic => validate_all(raw)?,
        };

        let result = operation.execute(&operands).map_err(|err| {
            if let CalcError::Internal(ref msg) = err {
                error!(operation = %key, error = %msg, "operation failed unexpectedly");
            }
            err
        })?;

        let history_id = self.history.add(&key, &operands, result)?;
        info!(operation = %key, result = %result, "operation successful");

        Ok((result, history_id))
    }
}

/// User-facing text for an error
pub fn describe_error(err: &CalcError) -> String {
    match err {
        CalcError::DivideByZero => format!("❌ {}.", err),
        CalcError::NotFound { name } => {
            format!("❌ Unknown operation: '{}'. Type 'menu' for options.", name)
        }
        CalcError::Type { .. } => format!("⚠️ Invalid input: {}", err),
        CalcError::MalformedInput(_) => format!("❌ Error: ⚠️ {}", err),
        CalcError::Duplicate { .. } | CalcError::Internal(_) | CalcError::Persistence(_) => {
            format!("🚨 Unexpected error: {}", err)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
