use std::io;

use chrono::{DateTime, Local};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame, Terminal,
};
use scraper::{ElementRef, Html};
use tracing::warn;

use crate::render::{render, render_unavailable, Slot};
use crate::report::Source;
use crate::sink::SlotMap;
use crate::status::Icons;

const MISSING: &str = "--";

/// One loaded report, reduced to terminal text.
struct Preview {
    slots: SlotMap,
    loaded_at: DateTime<Local>,
    error: Option<String>,
}

impl Preview {
    fn load(source: &Source, icons: &Icons) -> Self {
        let mut slots = SlotMap::new();
        let error = match source.load() {
            Ok(document) => {
                render(&document, &mut slots, icons);
                None
            }
            Err(err) => {
                warn!("preview load failed: {err}");
                if let Err(err) = render_unavailable(&mut slots) {
                    warn!("could not mark preview unavailable: {err}");
                }
                Some(err.to_string())
            }
        };
        Self {
            slots,
            loaded_at: Local::now(),
            error,
        }
    }

    fn text(&self, slot: Slot) -> String {
        match self.slots.get(slot.id()).map(plain) {
            Some(text) if !text.is_empty() => text,
            _ => MISSING.to_string(),
        }
    }
}

pub fn run(source: &Source) -> anyhow::Result<()> {
    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, source);

    // restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, source: &Source) -> anyhow::Result<()> {
    let icons = Icons::glyphs();
    let mut preview = Preview::load(source, &icons);
    loop {
        terminal.draw(|f| ui(f, &preview))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char('r') => preview = Preview::load(source, &icons),
                _ => {}
            }
        }
    }
}

/// Reduce slot markup to text: facility headings become `name: status`
/// lines and remaining tags are dropped.
fn plain(markup: &str) -> String {
    let fragment = Html::parse_fragment(markup);
    let mut out = String::with_capacity(markup.len());
    push_text(&mut out, fragment.root_element());
    out.trim().to_string()
}

fn push_text(out: &mut String, element: ElementRef<'_>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            push_text(out, child);
        }
    }
    match element.value().name() {
        "h3" => out.push(' '),
        "br" => out.push('\n'),
        _ => {}
    }
}

fn rounded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Yellow),
        ))
        .title_alignment(Alignment::Left)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(BorderType::Rounded)
}

fn display_headline(preview: &Preview) -> Paragraph<'_> {
    let mut lines = vec![Line::from(vec![
        Span::raw(" "),
        Span::styled(
            preview.text(Slot::FieldStatus),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" : updated "),
        Span::styled(preview.text(Slot::LastUpdated), Style::default().fg(Color::Blue)),
    ])];
    let footer = match &preview.error {
        Some(err) => Span::styled(format!(" {err}"), Style::default().fg(Color::Red)),
        None => Span::raw(format!(
            " loaded {}  (r refresh, q quit)",
            preview.loaded_at.format("%d-%m-%Y %H:%M")
        )),
    };
    lines.push(Line::from(footer));
    Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .border_type(BorderType::Rounded),
    )
}

fn display_conditions(preview: &Preview) -> Table<'_> {
    let rows: Vec<Row> = Slot::ALL
        .into_iter()
        .filter(|slot| {
            !matches!(
                slot,
                Slot::LastUpdated | Slot::FieldStatus | Slot::Facilities
            )
        })
        .map(|slot| {
            Row::new(vec![
                Cell::from(format!(" {}", slot.title())),
                Cell::from(preview.text(slot)).style(Style::default().fg(Color::Green)),
            ])
        })
        .collect();

    Table::new(rows, [Constraint::Length(18), Constraint::Min(10)])
        .block(rounded("Conditions"))
}

fn ui(f: &mut Frame, preview: &Preview) {
    let vert_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(f.area());

    f.render_widget(display_headline(preview), vert_layout[0]);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(vert_layout[1]);

    f.render_widget(display_conditions(preview), chunks[0]);

    let facilities = Paragraph::new(preview.text(Slot::Facilities))
        .style(Style::default().fg(Color::Green))
        .wrap(Wrap { trim: true })
        .block(rounded("Facilities"));
    f.render_widget(facilities, chunks[1]);
}
