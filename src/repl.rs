// 🔁 REPL - blocking prompt loop around the dispatcher
// One command is handled to completion before the next is read

use crate::dispatcher::{describe_error, Command, Dispatcher, Reply};
use crate::history::parse_entry_id;
use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::Write;
use tracing::{debug, info, warn};

/// What one prompt produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    /// Ctrl-C
    Interrupted,
    /// Ctrl-D / end of input
    Eof,
}

/// Source of input lines
pub trait Prompt {
    fn read_line(&mut self, prompt: &str) -> Result<Input>;
}

/// rustyline-backed prompt with in-session line history
pub struct LineEditor {
    editor: DefaultEditor,
}

impl LineEditor {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().context("Failed to create line editor")?;
        Ok(LineEditor { editor })
    }
}

impl Prompt for LineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<Input> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(err) = self.editor.add_history_entry(line.as_str()) {
                        debug!(error = %err, "line not added to editor history");
                    }
                }
                Ok(Input::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
            Err(ReadlineError::Eof) => Ok(Input::Eof),
            Err(err) => Err(err).context("Failed to read input"),
        }
    }
}

pub const PROMPT: &str = "👉 Enter command: ";

/// Print the banner
pub fn print_banner<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "\n✨ Welcome to the Interactive Calculator! ✨")?;
    writeln!(out, "🔹 Type 'menu' to see available options.")?;
    writeln!(out, "🔹 Type 'exit' to quit the calculator.")?;
    writeln!(out, "🔹 To calculate: Enter operation followed by numbers (e.g., 'add 2 3').\n")?;
    Ok(())
}

/// Run until exit, EOF or interrupt
///
/// Errors from a command are reported and the loop continues; only I/O
/// failures on the prompt or output end it.
pub fn run<P: Prompt, W: Write>(dispatcher: &mut Dispatcher, prompt: &mut P, out: &mut W) -> Result<()> {
    info!("calculator started");

    loop {
        let line = match prompt.read_line(PROMPT)? {
            Input::Line(line) => line,
            Input::Interrupted | Input::Eof => {
                writeln!(out, "👋 Exiting calculator. Goodbye!")?;
                info!("input closed, exiting calculator");
                return Ok(());
            }
        };

        info!(command = %line.trim(), "user entered command");

        if !handle_reply(dispatcher, prompt, out, &line)? {
            return Ok(());
        }
    }
}

/// Evaluate a single line and print the reply (used by `--eval`)
pub fn run_once<W: Write>(dispatcher: &mut Dispatcher, line: &str, out: &mut W) -> Result<()> {
    match dispatcher.handle_line(line) {
        Ok(reply) => print_reply(out, &reply),
        Err(err) => {
            warn!(kind = err.kind(), error = %err, "command failed");
            writeln!(out, "{}", describe_error(&err))?;
            Ok(())
        }
    }
}

fn handle_reply<P: Prompt, W: Write>(
    dispatcher: &mut Dispatcher,
    prompt: &mut P,
    out: &mut W,
    line: &str,
) -> Result<bool> {
    let reply = match dispatcher.handle_line(line) {
        Ok(reply) => reply,
        Err(err) => {
            warn!(kind = err.kind(), error = %err, "command failed");
            writeln!(out, "{}", describe_error(&err))?;
            return Ok(true);
        }
    };

    let follow_up = match reply {
        Reply::Exit => {
            writeln!(out, "👋 Exiting calculator. Goodbye!")?;
            return Ok(false);
        }
        Reply::ConfirmClear => {
            match prompt.read_line("🛑 Are you sure you want to clear history? (yes/no): ")? {
                Input::Line(answer) if answer.trim().eq_ignore_ascii_case("yes") => Some(Command::Clear),
                _ => {
                    info!("history clear cancelled");
                    writeln!(out, "🚫 History clear operation cancelled.")?;
                    None
                }
            }
        }
        Reply::PromptRemove(table) => {
            writeln!(out, "{}", table)?;
            match prompt.read_line("🔢 Enter the ID of the entry to remove: ")? {
                Input::Line(answer) => match parse_entry_id(&answer) {
                    Some(id) => Some(Command::Remove(id)),
                    None => {
                        warn!(input = %answer.trim(), "non-numeric entry ID entered");
                        writeln!(out, "❌ Invalid input. Please enter a numeric ID.")?;
                        None
                    }
                },
                _ => None,
            }
        }
        Reply::Browse(entries) => {
            browse(out, entries)?;
            None
        }
        other => {
            print_reply(out, &other)?;
            None
        }
    };

    if let Some(command) = follow_up {
        match dispatcher.execute(command) {
            Ok(reply) => print_reply(out, &reply)?,
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "command failed");
                writeln!(out, "{}", describe_error(&err))?;
            }
        }
    }

    Ok(true)
}

fn print_reply<W: Write>(out: &mut W, reply: &Reply) -> Result<()> {
    match reply {
        Reply::Silent => {}
        Reply::Text(text) => writeln!(out, "{}", text)?,
        Reply::Calculated { result, .. } => writeln!(out, "✅ Result: {}", result)?,
        Reply::ConfirmClear => writeln!(out, "Use 'clear' to clear the history.")?,
        Reply::PromptRemove(table) => {
            writeln!(out, "{}", table)?;
            writeln!(out, "Use 'remove <id>' to remove an entry.")?;
        }
        Reply::Browse(_) => writeln!(out, "'browse' is only available in the interactive prompt.")?,
        Reply::Exit => writeln!(out, "👋 Exiting calculator. Goodbye!")?,
    }
    Ok(())
}

#[cfg(feature = "tui")]
fn browse<W: Write>(_out: &mut W, entries: Vec<crate::history::HistoryEntry>) -> Result<()> {
    let mut app = crate::ui::App::new(entries);
    crate::ui::run_ui(&mut app)
}

#[cfg(not(feature = "tui"))]
fn browse<W: Write>(out: &mut W, _entries: Vec<crate::history::HistoryEntry>) -> Result<()> {
    writeln!(out, "❌ History browser not available. Rebuild with: cargo build --features tui")?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryStore;
    use crate::registry::OperationRegistry;
    use std::collections::VecDeque;
    use tempfile::TempDir;

    /// Feeds canned input, then EOF
    struct Scripted {
        lines: VecDeque<Input>,
    }

    impl Scripted {
        fn new(lines: &[&str]) -> Self {
            Scripted {
                lines: lines.iter().map(|l| Input::Line(l.to_string())).collect(),
            }
        }
    }

    impl Prompt for Scripted {
        fn read_line(&mut self, _prompt: &str) -> Result<Input> {
            Ok(self.lines.pop_front().unwrap_or(Input::Eof))
        }
    }

    fn run_script(lines: &[&str]) -> (TempDir, Dispatcher, String) {
        let dir = TempDir::new().unwrap();
        let registry = OperationRegistry::with_builtins().unwrap();
        let history = HistoryStore::new(dir.path().join("history.csv"));
        let mut dispatcher = Dispatcher::new(registry, history);

        let mut out = Vec::new();
        run(&mut dispatcher, &mut Scripted::new(lines), &mut out).unwrap();
        (dir, dispatcher, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_end_to_end_session() {
        let (_dir, mut dispatcher, output) =
            run_script(&["add 2 3", "divide 10 0", "bogus 1 2", "multiply 4 5", "exit", "add 9 9"]);

        assert!(output.contains("✅ Result: 5\n"));
        assert!(output.contains("Division by zero"));
        assert!(output.contains("Unknown operation: 'bogus'"));
        assert!(output.contains("✅ Result: 20\n"));
        assert!(output.contains("Goodbye"));
        assert!(!output.contains("Result: 18"));

        let ops: Vec<String> = dispatcher.history().list().iter().map(|e| e.operation.clone()).collect();
        assert_eq!(ops, vec!["add", "multiply"]);
    }

    #[test]
    fn test_eof_ends_loop_cleanly() {
        let (_dir, _dispatcher, output) = run_script(&["add 1 1"]);
        assert!(output.contains("✅ Result: 2"));
        assert!(output.ends_with("👋 Exiting calculator. Goodbye!\n"));
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let (_dir, mut dispatcher, output) = run_script(&["add 1 1", "2", "no"]);
        assert!(output.contains("cancelled"));
        assert_eq!(dispatcher.history().len(), 1);

        let (_dir, mut dispatcher, output) = run_script(&["add 1 1", "2", "yes"]);
        assert!(output.contains("History cleared"));
        assert!(dispatcher.history().is_empty());
    }

    #[test]
    fn test_remove_by_prompted_id() {
        let (_dir, mut dispatcher, output) = run_script(&["add 1 1", "add 2 2", "3", "1"]);
        assert!(output.contains("Entry 1 removed successfully"));
        let ids: Vec<u64> = dispatcher.history().list().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2]);

        let (_dir, _dispatcher, output) = run_script(&["add 1 1", "3", "abc"]);
        assert!(output.contains("Please enter a numeric ID"));
    }

    #[test]
    fn test_interrupt_exits() {
        let dir = TempDir::new().unwrap();
        let registry = OperationRegistry::with_builtins().unwrap();
        let mut dispatcher = Dispatcher::new(registry, HistoryStore::new(dir.path().join("h.csv")));

        let mut prompt = Scripted {
            lines: VecDeque::from(vec![Input::Interrupted, Input::Line("add 1 1".to_string())]),
        };
        let mut out = Vec::new();
        run(&mut dispatcher, &mut prompt, &mut out).unwrap();

        assert!(dispatcher.history().is_empty());
    }

    #[test]
    fn test_run_once() {
        let dir = TempDir::new().unwrap();
        let registry = OperationRegistry::with_builtins().unwrap();
        let mut dispatcher = Dispatcher::new(registry, HistoryStore::new(dir.path().join("h.csv")));

        let mut out = Vec::new();
        run_once(&mut dispatcher, "median 1 2 3 4", &mut out).unwrap();
        run_once(&mut dispatcher, "add 1", &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("✅ Result: 2.50"));
        assert!(text.contains("Invalid format"));
    }
}
