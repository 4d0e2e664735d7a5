//! Terminal UI (C12, external to the discovery core): a scrollable,
//! sortable host table plus a one-line status bar. Column layout, key
//! bindings, and the sort comparator mirror the termbox-based table
//! this replaces; the terminal backend itself (ratatui/crossterm) is a
//! direct modern substitute for that library.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as TermEvent, KeyCode, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table};
use ratatui::{Frame, Terminal};
use tokio::sync::{mpsc, oneshot};

use crate::events::{Event, HostRow};
use crate::vendor;

const COLUMNS: [&str; 7] = ["last seen", "mac", "ip", "vendor", "dns", "nbns", "mdns"];
const TICK: Duration = Duration::from_secs(1);

struct UiState {
    rows: Vec<HostRow>,
    sort_column: usize,
    sort_ascending: bool,
    selected: usize,
}

impl UiState {
    fn new() -> Self {
        Self {
            rows: Vec::new(),
            sort_column: 1, // "mac", matching the default sort key
            sort_ascending: true,
            selected: 0,
        }
    }

    fn cell(row: &HostRow, column: usize) -> &str {
        match column {
            0 => &row.last_seen,
            1 => &row.mac_addr,
            2 => &row.ip,
            3 => &row.vendor,
            4 => &row.dns,
            5 => &row.nbns,
            _ => &row.mdns,
        }
    }

    fn resort(&mut self) {
        let column = self.sort_column;
        let ascending = self.sort_ascending;
        self.rows.sort_by(|a, b| {
            let ordering = if column == 2 {
                parse_ipv4(&a.ip).cmp(&parse_ipv4(&b.ip))
            } else {
                Self::cell(a, column).cmp(Self::cell(b, column))
            };
            let ordering = if ascending { ordering } else { ordering.reverse() };
            ordering.then_with(|| parse_ipv4(&a.ip).cmp(&parse_ipv4(&b.ip)))
        });
        if !self.rows.is_empty() {
            self.selected = self.selected.min(self.rows.len() - 1);
        } else {
            self.selected = 0;
        }
    }

    fn toggle_sort(&mut self, column: usize) {
        if self.sort_column == column {
            self.sort_ascending = !self.sort_ascending;
        } else {
            self.sort_column = column;
            self.sort_ascending = true;
        }
        self.resort();
    }
}

fn parse_ipv4(s: &str) -> u32 {
    let mut octets = [0u8; 4];
    for (i, part) in s.split('.').take(4).enumerate() {
        octets[i] = part.parse().unwrap_or(0);
    }
    u32::from_be_bytes(octets)
}

async fn fetch_rows(events: &mpsc::Sender<Event>) -> Vec<HostRow> {
    let (reply_tx, reply_rx) = oneshot::channel();
    let (ack_tx, ack_rx) = oneshot::channel();
    if events.send(Event::SnapshotRequest { reply: reply_tx, ack: ack_rx }).await.is_err() {
        return Vec::new();
    }
    let snapshot = match reply_rx.await {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };
    let _ = ack_tx.send(());

    let now_wall = chrono::Local::now();
    let now_mono = Instant::now();
    snapshot
        .iter()
        .map(|(key, host)| HostRow::from_host(key, host, vendor::lookup(&key.mac), now_wall, now_mono))
        .collect()
}

/// Run the terminal UI until the user quits. `interface_name` and
/// `passive` feed the status line; `events` is used for snapshot polls.
pub async fn run(events: mpsc::Sender<Event>, interface_name: String, passive: bool) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = UiState::new();
    state.rows = fetch_rows(&events).await;
    state.resort();
    let mut last_update = chrono::Local::now();
    let mut last_tick = Instant::now();

    let result = loop {
        terminal.draw(|f| render(f, &state, &interface_name, passive, last_update))?;

        let timeout = TICK.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let TermEvent::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Esc | KeyCode::Char('q') => break Ok(()),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break Ok(()),
                    KeyCode::Char('x') if key.modifiers.contains(KeyModifiers::CONTROL) => break Ok(()),
                    KeyCode::Up => state.selected = state.selected.saturating_sub(1),
                    KeyCode::Down => {
                        if !state.rows.is_empty() {
                            state.selected = (state.selected + 1).min(state.rows.len() - 1);
                        }
                    }
                    KeyCode::PageUp => state.selected = state.selected.saturating_sub(10),
                    KeyCode::PageDown => {
                        if !state.rows.is_empty() {
                            state.selected = (state.selected + 10).min(state.rows.len() - 1);
                        }
                    }
                    KeyCode::Left => {
                        state.sort_column = state.sort_column.saturating_sub(1);
                    }
                    KeyCode::Right => {
                        state.sort_column = (state.sort_column + 1).min(COLUMNS.len() - 1);
                    }
                    KeyCode::Enter | KeyCode::Char(' ') => {
                        let column = state.sort_column;
                        state.toggle_sort(column);
                    }
                    _ => {}
                }
            }
        }

        if last_tick.elapsed() >= TICK {
            state.rows = fetch_rows(&events).await;
            state.resort();
            last_update = chrono::Local::now();
            last_tick = Instant::now();
        }
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    result
}

fn render(f: &mut Frame, state: &UiState, interface_name: &str, passive: bool, last_update: chrono::DateTime<chrono::Local>) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(f.size());

    let status = format!(
        "interface: {}{}    entries: {}    last update: {}",
        interface_name,
        if passive { " (passive mode)" } else { "" },
        state.rows.len(),
        last_update.format("%H:%M:%S"),
    );
    f.render_widget(ratatui::widgets::Paragraph::new(status), layout[0]);

    let header_cells = COLUMNS.iter().enumerate().map(|(i, name)| {
        let label = if i == state.sort_column {
            format!("{name} {}", if state.sort_ascending { "▲" } else { "▼" })
        } else {
            name.to_string()
        };
        Cell::from(label).style(Style::default().fg(Color::Cyan))
    });
    let header = Row::new(header_cells);

    let rows = state.rows.iter().enumerate().map(|(i, row)| {
        let cells = [&row.last_seen, &row.mac_addr, &row.ip, &row.vendor, &row.dns, &row.nbns, &row.mdns]
            .into_iter()
            .map(|c| Cell::from(c.clone()));
        let style = if i == state.selected {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        Row::new(cells).style(style)
    });

    let widths = [
        Constraint::Length(20),
        Constraint::Length(18),
        Constraint::Length(15),
        Constraint::Length(20),
        Constraint::Length(20),
        Constraint::Length(16),
        Constraint::Length(16),
    ];
    let table = Table::new(rows, widths).header(header).block(Block::default().borders(Borders::ALL).title("lanwatch"));
    f.render_widget(table, layout[1]);
}
