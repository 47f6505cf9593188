use crate::App;
use crate::render::panel;
use phishscope_core::dashboard::{Metric, TOP_CATEGORIES_DETAIL, TOP_CATEGORIES_SUMMARY};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph, Wrap},
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let view = app.dashboard();

    if view.is_loading() {
        let block = panel("Threat Intelligence Dashboard", Color::Cyan);
        let inner = block.inner(area);
        f.render_widget(block, area);
        f.render_widget(
            Paragraph::new("⠋ Loading statistics...").style(Style::default().fg(Color::Yellow)),
            inner,
        );
        return;
    }

    let has_error = view.error().is_some();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(if has_error { 3 } else { 0 }), // Error banner
            Constraint::Length(3),                               // Header
            Constraint::Length(6),                               // Metric cards
            Constraint::Min(6),                                  // Sources + categories
        ])
        .split(area);

    if let Some(error) = view.error() {
        let banner = Paragraph::new(error)
            .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
            .block(panel("Error", Color::Red))
            .wrap(Wrap { trim: true });
        f.render_widget(banner, chunks[0]);
    }

    render_header(f, chunks[1], app);

    let metric_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[2]);
    render_metrics(f, metric_chunks[0], "SSL Certificates", &view.certificate_metrics(), Color::Cyan);
    render_metrics(f, metric_chunks[1], "Phishing Intelligence", &view.phishing_metrics(), Color::Red);

    let lower = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(35),
            Constraint::Percentage(35),
        ])
        .split(chunks[3]);
    render_sources(f, lower[0], app);
    render_categories(f, lower[1], app, TOP_CATEGORIES_SUMMARY, "Top UT1 Categories");
    render_categories(f, lower[2], app, TOP_CATEGORIES_DETAIL, "UT1 Category Breakdown");
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let view = app.dashboard();
    let db_color = if view.is_database_connected() { Color::Green } else { Color::Red };
    let updated = view
        .last_updated()
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());
    let (latest, oldest) = view.certificate_dates();

    let line = Line::from(vec![
        Span::styled("● ", Style::default().fg(db_color)),
        Span::styled(view.database_label(), Style::default().fg(db_color)),
        Span::raw("   Total intelligence: "),
        Span::styled(
            view.grand_total(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("   Certificates {} to {}", oldest, latest),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(format!("   Updated {}", updated), Style::default().fg(Color::DarkGray)),
    ]);

    let polling = if app.is_dashboard_polling() { "auto-refresh 30s" } else { "stopped" };
    f.render_widget(
        Paragraph::new(line).block(panel(format!("Threat Intelligence Dashboard ({})", polling), Color::Cyan)),
        area,
    );
}

fn render_metrics(f: &mut Frame, area: Rect, title: &str, metrics: &[Metric], color: Color) {
    let block = panel(title, color);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, metrics.len().max(1) as u32); metrics.len()])
        .split(inner);

    for (metric, column) in metrics.iter().zip(columns.iter()) {
        let text = vec![
            Line::from(Span::styled(metric.label, Style::default().fg(Color::Gray))),
            Line::from(Span::styled(
                metric.value.clone(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(metric.caption, Style::default().fg(Color::DarkGray))),
        ];
        f.render_widget(Paragraph::new(text), *column);
    }
}

fn render_sources(f: &mut Frame, area: Rect, app: &App) {
    let view = app.dashboard();
    let mut items: Vec<ListItem> = view
        .primary_sources()
        .into_iter()
        .map(|(name, count)| ListItem::new(format!("{:<16} {:>10}", name, count)))
        .collect();
    items.push(
        ListItem::new(format!("{:<16} {:>10}", "ut1_blacklists", view.ut1_total()))
            .style(Style::default().fg(Color::Yellow)),
    );

    f.render_widget(List::new(items).block(panel("Sources", Color::Blue)), area);
}

fn render_categories(f: &mut Frame, area: Rect, app: &App, limit: usize, title: &str) {
    let categories = app.dashboard().top_ut1_categories(limit);
    let block = panel(title, Color::Magenta);

    if categories.is_empty() {
        f.render_widget(
            Paragraph::new("No UT1 data").style(Style::default().fg(Color::DarkGray)).block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = categories
        .into_iter()
        .enumerate()
        .map(|(i, (name, count))| ListItem::new(format!("{:>2}. {:<18} {:>8}", i + 1, name, count)))
        .collect();
    f.render_widget(List::new(items).block(block), area);
}
