// 📋 Menu Rendering - static text built from registry names and history entries
// Pure functions: nothing here touches the registry or the store

use crate::history::HistoryEntry;
use crate::registry::OperationRegistry;

/// Menu listing every registered operation plus the history shortcuts
pub fn render_menu(names: &[String]) -> String {
    let mut sorted = names.to_vec();
    sorted.sort();

    let mut out = String::new();
    out.push_str("\n📜 Calculator Menu:\n");
    out.push_str("==============================\n");
    out.push_str("🔹 Available Operations:\n");
    out.push_str(&sorted.join(", "));
    out.push_str("\n\n🔸 Menu Options:\n");
    out.push_str("1 - View Calculation History\n");
    out.push_str("2 - Clear Calculation History\n");
    out.push_str("3 - Remove Entry by ID\n");
    out.push_str("4 - Reload History from CSV\n");
    out.push_str("5 - Exit Calculator\n");
    out.push_str("==============================\n");
    out
}

/// History as an aligned text table
pub fn render_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "⚠️ No calculations found.".to_string();
    }

    let rows: Vec<[String; 4]> = entries
        .iter()
        .map(|e| {
            let operands: Vec<String> = e.operands.iter().map(|d| d.to_string()).collect();
            [
                e.id.to_string(),
                e.operation.clone(),
                format!("[{}]", operands.join(", ")),
                e.result.to_string(),
            ]
        })
        .collect();

    let headers = ["ID", "Operation", "Operands", "Result"];
    let mut widths = headers.map(|h| h.len());
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let format_row = |cells: [&str; 4]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:>width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut out = String::from("📜 Calculation History:\n");
    out.push_str(&format_row(headers));
    for row in &rows {
        out.push('\n');
        out.push_str(&format_row([row[0].as_str(), row[1].as_str(), row[2].as_str(), row[3].as_str()]));
    }
    out
}

/// Usage text with one line per registered operation
pub fn render_help(registry: &OperationRegistry) -> String {
    let mut out = String::new();
    out.push_str("🔹 Type 'menu' to see available options.\n");
    out.push_str("🔹 Type 'exit' or 'quit' to leave the calculator.\n");
    out.push_str("🔹 To calculate: <operation> <num1> <num2> [...] (e.g. 'add 2 3', 'mean 1 2 3 4').\n");
    out.push_str("🔹 History: 'history', 'clear', 'remove <id>', 'reload'.\n");
    if cfg!(feature = "tui") {
        out.push_str("🔹 Browse history interactively: 'browse'.\n");
    }
    out.push_str("\nOperations:\n");
    for (name, op) in registry.iter() {
        out.push_str(&format!("  {:<10} {:<9} {}\n", name, op.arity().as_str(), op.description()));
    }
    out
}
