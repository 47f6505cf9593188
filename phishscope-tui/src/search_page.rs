use crate::render::panel;
use crate::{ALL_UT1_SOURCE, App, Focus};
use phishscope_core::format::{format_short_timestamp, truncate};
use phishscope_core::search::{SearchState, ThreatLevel, headline, threat_level};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph, Wrap},
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(40)])
        .split(area);

    render_sources(f, columns[0], app);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Query
            Constraint::Length(4), // Summary + cards
            Constraint::Min(5),    // Results
        ])
        .split(columns[1]);

    render_query(f, right[0], app);
    render_summary(f, right[1], app);
    render_results(f, right[2], app);
}

fn render_query(f: &mut Frame, area: Rect, app: &App) {
    let editing = *app.focus() == Focus::Query;
    let block = panel("Search", if editing { Color::Yellow } else { Color::Cyan });
    let inner = block.inner(area);
    f.render_widget(block, area);

    let query = app.search().query();
    let line = if query.is_empty() && !editing {
        Line::from(Span::styled(
            "Press / to enter a domain, URL or keyword",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Yellow)),
            Span::styled(query.to_string(), Style::default().fg(Color::White)),
            Span::raw(if editing { "█" } else { "" }),
        ])
    };
    f.render_widget(Paragraph::new(line), inner);
}

fn render_sources(f: &mut Frame, area: Rect, app: &App) {
    let filter = app.search().filter();
    let title = if filter.is_empty() {
        "Sources (all)".to_string()
    } else {
        format!("Sources ({} selected)", filter.len())
    };
    let block = panel(title, Color::Blue);

    let options = app.source_options();
    if options.is_empty() {
        f.render_widget(
            Paragraph::new("Loading sources...")
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            area,
        );
        return;
    }

    let inner_height = area.height.saturating_sub(2) as usize;
    let skip = app.source_cursor().saturating_sub(inner_height.saturating_sub(1));
    let items: Vec<ListItem> = options
        .iter()
        .enumerate()
        .skip(skip)
        .take(inner_height)
        .map(|(i, source)| {
            let mark = if filter.contains(source) { "[x]" } else { "[ ]" };
            let mut style = Style::default().fg(if filter.contains(source) { Color::Green } else { Color::Gray });
            if i == app.source_cursor() {
                style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
            }
            let label = if source == ALL_UT1_SOURCE { "All UT1 categories" } else { source.as_str() };
            ListItem::new(format!("{} {}", mark, label)).style(style)
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}

fn render_summary(f: &mut Frame, area: Rect, app: &App) {
    let search = app.search();
    let block = panel(
        format!(
            "Results (page {}/{}, {} per page)",
            search.current_page(),
            search.max_pages().max(1),
            search.page_size().get()
        ),
        Color::Cyan,
    );

    let text = match search.state() {
        SearchState::Idle => vec![Line::from(Span::styled(
            "No search yet",
            Style::default().fg(Color::DarkGray),
        ))],
        SearchState::Loading => vec![Line::from(Span::styled(
            "⠋ Searching...",
            Style::default().fg(Color::Yellow),
        ))],
        SearchState::Error(message) => vec![Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))],
        SearchState::Success(_) => {
            let mut cards = Vec::new();
            for card in search.category_cards() {
                cards.push(Span::styled(
                    format!(" {} ", card.count),
                    Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
                ));
                cards.push(Span::raw(format!(" {}   ", card.label)));
            }
            vec![
                Line::from(Span::styled(
                    search.summary_line().unwrap_or_default(),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                )),
                Line::from(cards),
            ]
        }
    };

    f.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: true }), area);
}

fn threat_style(level: ThreatLevel) -> Style {
    let color = match level {
        ThreatLevel::High => Color::Red,
        ThreatLevel::Medium => Color::Yellow,
        ThreatLevel::Low => Color::Green,
    };
    Style::default().fg(color)
}

fn render_results(f: &mut Frame, area: Rect, app: &App) {
    let block = panel("Matches", Color::DarkGray);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let width = inner.width.saturating_sub(40).max(20) as usize;
    let mut lines: Vec<ListItem> = Vec::new();

    for bucket in app.search().buckets() {
        let range = bucket
            .showing
            .map(|(first, last)| format!("showing {}-{} of {}", first, last, bucket.total))
            .unwrap_or_else(|| format!("no results on this page ({} total)", bucket.total));
        lines.push(
            ListItem::new(format!("{} ({})", bucket.label, range))
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        );

        for result in bucket.results {
            let level = threat_level(result);
            let mut spans = vec![
                Span::styled(format!("  {:<12}", level.label()), threat_style(level)),
                Span::raw(truncate(headline(result), width)),
                Span::styled(format!("  {}", result.source()), Style::default().fg(Color::Blue)),
                Span::styled(
                    format!("  {}", format_short_timestamp(result.created_at())),
                    Style::default().fg(Color::DarkGray),
                ),
            ];
            if let Some(target) = result.target() {
                spans.push(Span::styled(format!("  target: {}", target), Style::default().fg(Color::Magenta)));
            }
            if let Some(domains) = result.domains() {
                spans.push(Span::styled(
                    format!("  [{}]", truncate(domains, 30)),
                    Style::default().fg(Color::Gray),
                ));
            }
            lines.push(ListItem::new(Line::from(spans)));
        }
    }

    if lines.is_empty() {
        if let Some(sources) = app.search().available_sources()
            && !sources.usage_examples.is_empty()
        {
            lines.push(ListItem::new("Examples:").style(Style::default().fg(Color::Gray)));
            for (name, example) in sources.usage_examples.iter() {
                lines.push(ListItem::new(format!(
                    "  {:<18} {}",
                    name,
                    phishscope_core::search::example_query(example)
                )));
            }
        }
    }

    f.render_widget(List::new(lines), inner);
}
