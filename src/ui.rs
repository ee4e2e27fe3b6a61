use crate::history::HistoryEntry;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    History,
    Summary,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::History => Page::Summary,
            Page::Summary => Page::History,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::History => "History",
            Page::Summary => "Summary",
        }
    }
}

pub struct App {
    pub entries: Vec<HistoryEntry>,
    pub filtered: Vec<HistoryEntry>,
    pub state: TableState,
    pub current_page: Page,
    pub show_detail: bool,
    /// Operation the table is restricted to, if any
    pub operation_filter: Option<String>,
}

impl App {
    pub fn new(entries: Vec<HistoryEntry>) -> Self {
        let mut state = TableState::default();
        if !entries.is_empty() {
            state.select(Some(0));
        }

        let filtered = entries.clone();

        Self {
            entries,
            filtered,
            state,
            current_page: Page::History,
            show_detail: false,
            operation_filter: None,
        }
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn selected_entry(&self) -> Option<&HistoryEntry> {
        self.state.selected().and_then(|i| self.filtered.get(i))
    }

    /// Distinct operations present in the history, sorted
    pub fn operations(&self) -> Vec<String> {
        let mut ops: Vec<String> = self.entries.iter().map(|e| e.operation.clone()).collect();
        ops.sort();
        ops.dedup();
        ops
    }

    /// Step the filter: none → first operation → ... → last → none
    pub fn cycle_filter(&mut self) {
        let ops = self.operations();
        let next = match &self.operation_filter {
            None => ops.first().cloned(),
            Some(current) => ops
                .iter()
                .position(|op| op == current)
                .and_then(|i| ops.get(i + 1))
                .cloned(),
        };
        self.apply_filter(next);
    }

    pub fn apply_filter(&mut self, filter: Option<String>) {
        self.filtered = match &filter {
            None => self.entries.clone(),
            Some(op) => self
                .entries
                .iter()
                .filter(|e| &e.operation == op)
                .cloned()
                .collect(),
        };
        self.operation_filter = filter;

        if self.filtered.is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(0));
        }
    }

    pub fn next(&mut self) {
        let len = self.filtered.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.filtered.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    /// (operation, count, sum of results) per operation
    pub fn operation_summary(&self) -> Vec<(String, usize, Decimal)> {
        let mut summary: BTreeMap<String, (usize, Decimal)> = BTreeMap::new();

        for entry in &self.entries {
            let slot = summary.entry(entry.operation.clone()).or_insert((0, Decimal::ZERO));
            slot.0 += 1;
            slot.1 = slot.1.saturating_add(entry.result);
        }

        let mut result: Vec<_> = summary
            .into_iter()
            .map(|(op, (count, total))| (op, count, total))
            .collect();

        result.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        result
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
                KeyCode::Enter => app.toggle_detail(),
                KeyCode::Tab => app.current_page = app.current_page.next(),
                KeyCode::Char('f') => app.cycle_filter(),
                KeyCode::Char('c') => app.apply_filter(None),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Home => {
                    if !app.filtered.is_empty() {
                        app.state.select(Some(0));
                    }
                }
                KeyCode::End => {
                    if !app.filtered.is_empty() {
                        app.state.select(Some(app.filtered.len() - 1));
                    }
                }
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    let page = app.current_page;
    match page {
        Page::History if app.show_detail => {
            let content_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[1]);

            render_table(f, content_chunks[0], app);
            render_detail_panel(f, content_chunks[1], app);
        }
        Page::History => render_table(f, chunks[1], app),
        Page::Summary => render_summary(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        " 🧮 Calculator History ",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];

    for page in [Page::History, Page::Summary] {
        spans.push(Span::raw(" │ "));
        let style = if page == app.current_page {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(page.title().to_string(), style));
    }

    spans.push(Span::raw(format!("   {} entries", app.entries.len())));

    let header = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::White)));
    f.render_widget(header, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["ID", "Operation", "Operands", "Result"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.filtered.iter().map(|entry| {
        let color = if entry.result.is_sign_negative() { Color::Red } else { Color::Green };
        let operands: Vec<String> = entry.operands.iter().map(|d| d.to_string()).collect();

        Row::new(vec![
            Cell::from(entry.id.to_string()),
            Cell::from(entry.operation.clone()),
            Cell::from(truncate(&format!("[{}]", operands.join(", ")), 40)),
            Cell::from(entry.result.to_string()).style(Style::default().fg(color)),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(12),
            Constraint::Length(42),
            Constraint::Min(12),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Calculations "),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_summary(f: &mut Frame, area: Rect, app: &App) {
    let header = Row::new(["Operation", "Count", "Sum of Results"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    }))
    .style(Style::default().bg(Color::DarkGray));

    let rows = app.operation_summary().into_iter().map(|(op, count, total)| {
        Row::new(vec![
            Cell::from(op),
            Cell::from(count.to_string()),
            Cell::from(total.to_string()),
        ])
    });

    let table = Table::new(rows, [Constraint::Length(14), Constraint::Length(8), Constraint::Min(16)])
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" By Operation "),
        );

    f.render_widget(table, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, app.filtered.len()),
        Style::default().fg(Color::Cyan),
    )];

    if let Some(op) = &app.operation_filter {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(format!("Filter: {}", op), Style::default().fg(Color::Green)));
        status_spans.push(Span::raw(" ("));
        status_spans.push(Span::styled("c", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" clear)"));
    }

    for (key, label) in [("Enter", " Details"), ("Tab", " Page"), ("f", " Filter"), ("↑/↓", " Nav")] {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(key, Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(label));
    }
    status_spans.push(Span::raw(" | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Back"));

    let status_bar = Paragraph::new(Line::from(status_spans))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::White)));

    f.render_widget(status_bar, area);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Entry Details ");

    let entry = match app.selected_entry() {
        Some(e) => e,
        None => {
            f.render_widget(Paragraph::new("No entry selected").block(block), area);
            return;
        }
    };

    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

    let mut content = vec![
        Line::from(""),
        Line::from(vec![Span::styled("  ID: ", label), Span::raw(entry.id.to_string())]),
        Line::from(""),
        Line::from(vec![Span::styled("  Operation: ", label), Span::raw(entry.operation.clone())]),
        Line::from(""),
        Line::from(vec![Span::styled("  Result: ", label), Span::raw(entry.result.to_string())]),
        Line::from(""),
        Line::from("  ─────────────────────────────────────"),
        Line::from(vec![Span::styled(
            "  OPERANDS",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )]),
    ];

    for (i, operand) in entry.operands.iter().enumerate() {
        content.push(Line::from(vec![
            Span::styled(format!("  {:>3}. ", i + 1), Style::default().fg(Color::DarkGray)),
            Span::raw(operand.to_string()),
        ]));
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "  Press Enter to close",
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
