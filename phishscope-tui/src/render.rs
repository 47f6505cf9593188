// Frame layout shared by every page: navigation bar, page body, log panel, key hints

use crate::{App, Focus, LogLevel, dashboard_page, home_page, search_page};
use phishscope_core::Page;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

const LOG_PANEL_HEIGHT: u16 = 7;

pub fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                // Navigation
            Constraint::Min(10),                  // Page body
            Constraint::Length(LOG_PANEL_HEIGHT), // Logs
            Constraint::Length(1),                // Hints
        ])
        .split(f.area());

    render_nav(f, chunks[0], app);

    match app.shell().current() {
        Page::Home => home_page::render(f, chunks[1], app),
        Page::Dashboard => dashboard_page::render(f, chunks[1], app),
        Page::Search => search_page::render(f, chunks[1], app),
        other => render_placeholder(f, chunks[1], other),
    }

    render_logs(f, chunks[2], app);
    render_hints(f, chunks[3], app);
}

pub(crate) fn key_hint(key: &str) -> Span<'static> {
    Span::styled(format!(" {} ", key), Style::default().fg(Color::Black).bg(Color::Gray))
}

pub(crate) fn panel(title: impl Into<String>, color: Color) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title.into()))
        .border_style(Style::default().fg(color))
}

fn render_nav(f: &mut Frame, area: Rect, app: &App) {
    let current = app.shell().current();
    let mut spans = vec![Span::styled(
        " PhishScope ",
        Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];

    for (i, page) in Page::NAVIGABLE.iter().enumerate() {
        let style = if *page == current {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(format!("{} {}", i + 1, page.title()), style));
    }

    if !current.has_view() {
        spans.push(Span::raw("  │ "));
        spans.push(Span::styled(current.title(), Style::default().fg(Color::Yellow)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_placeholder(f: &mut Frame, area: Rect, page: Page) {
    let block = panel(page.title(), Color::DarkGray);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut text = vec![
        Line::from(""),
        Line::from(Span::styled(
            page.title(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    if let Some(description) = page.placeholder() {
        text.push(Line::from(Span::styled(description, Style::default().fg(Color::Gray))));
    }
    text.push(Line::from(""));
    text.push(Line::from(Span::styled(
        "Press 1 to return home",
        Style::default().fg(Color::DarkGray),
    )));

    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, inner);
}

fn render_logs(f: &mut Frame, area: Rect, app: &App) {
    let block = panel("Logs", Color::Magenta);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let height = inner.height as usize;
    let logs = app.logs();
    let items: Vec<ListItem> = logs
        .iter()
        .skip(logs.len().saturating_sub(height))
        .map(|(level, message)| {
            let (prefix, style) = match level {
                LogLevel::Info => ("INFO ", Style::default().fg(Color::Blue)),
                LogLevel::Warn => ("WARN ", Style::default().fg(Color::Yellow)),
                LogLevel::Error => ("ERROR", Style::default().fg(Color::Red)),
            };
            ListItem::new(format!("[{}] {}", prefix, message)).style(style)
        })
        .collect();

    f.render_widget(List::new(items), inner);
}

fn render_hints(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();
    match app.focus() {
        Focus::Query | Focus::DomainFilter => {
            spans.extend([key_hint("Enter"), Span::raw(" Apply  "), key_hint("Esc"), Span::raw(" Done")]);
        }
        Focus::Goto(name) => {
            spans.extend([
                Span::styled("Go to page: ", Style::default().fg(Color::Yellow)),
                Span::styled(format!("{}█", name), Style::default().fg(Color::White)),
                Span::raw("  "),
                key_hint("Enter"),
                Span::raw(" Go  "),
                key_hint("Esc"),
                Span::raw(" Cancel"),
            ]);
        }
        Focus::Navigation => {
            spans.extend([key_hint("q/ESC"), Span::raw(" Exit  "), key_hint("1-3"), Span::raw(" Pages  ")]);
            spans.extend([key_hint("g"), Span::raw(" Go to  ")]);
            match app.shell().current() {
                Page::Home => spans.extend([key_hint("/"), Span::raw(" Filter")]),
                Page::Dashboard => spans.extend([key_hint("r"), Span::raw(" Refresh")]),
                Page::Search => spans.extend([
                    key_hint("/"),
                    Span::raw(" Query  "),
                    key_hint("↑/↓ Space"),
                    Span::raw(" Sources  "),
                    key_hint("c"),
                    Span::raw(" Clear  "),
                    key_hint("←/→"),
                    Span::raw(" Page  "),
                    key_hint("s"),
                    Span::raw(" Page size  "),
                    key_hint("e"),
                    Span::raw(" Example"),
                ]),
                _ => {}
            }
        }
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black).fg(Color::Gray));
    f.render_widget(paragraph, area);
}
