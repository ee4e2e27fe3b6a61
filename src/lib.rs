// Decimal Calculator - Core Library
// Exposes the registry, operations and history store for the REPL binary and tests

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod history;
pub mod logging;
pub mod menu;
pub mod number;
pub mod operations;
pub mod registry;
pub mod repl;

// Only compile the history browser when the TUI feature is enabled
#[cfg(feature = "tui")]
pub mod ui;

// Re-export commonly used types
pub use config::AppConfig;
pub use dispatcher::{describe_error, parse_command, Command, Dispatcher, Reply};
pub use error::{CalcError, Result};
pub use history::{load_history, save_history, HistoryEntry, HistoryStore, HISTORY_HEADERS};
pub use menu::{render_help, render_history, render_menu};
pub use number::{round_aggregate, validate_all, validate_number, validate_pair, RawOperand};
pub use operations::{Arity, Builtin, Operation};
pub use registry::{register_builtin_operations, OperationRegistry};
pub use repl::{Input, LineEditor, Prompt};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
