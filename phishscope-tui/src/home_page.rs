use crate::render::panel;
use crate::{App, Focus};
use phishscope_core::domains::{ConfidenceBand, DomainStatus};
use phishscope_core::format::format_short_timestamp;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    render_filter(f, chunks[0], app);
    render_table(f, chunks[1], app);
}

fn render_filter(f: &mut Frame, area: Rect, app: &App) {
    let editing = *app.focus() == Focus::DomainFilter;
    let block = panel("Filter by domain or brand", if editing { Color::Yellow } else { Color::DarkGray });
    let inner = block.inner(area);
    f.render_widget(block, area);

    let filter = app.domains().filter();
    let line = if filter.is_empty() && !editing {
        Line::from(Span::styled("Press / to filter", Style::default().fg(Color::DarkGray)))
    } else {
        Line::from(vec![
            Span::styled(filter.to_string(), Style::default().fg(Color::White)),
            Span::raw(if editing { "█" } else { "" }),
        ])
    };
    f.render_widget(Paragraph::new(line), inner);
}

fn confidence_color(band: ConfidenceBand) -> Color {
    match band {
        ConfidenceBand::High => Color::Red,
        ConfidenceBand::Medium => Color::Yellow,
        ConfidenceBand::Low => Color::Green,
    }
}

fn status_color(status: DomainStatus) -> Color {
    match status {
        DomainStatus::Active => Color::Red,
        DomainStatus::Investigating => Color::Yellow,
        DomainStatus::Inactive => Color::DarkGray,
    }
}

fn render_table(f: &mut Frame, area: Rect, app: &App) {
    let visible = app.domains().visible();
    let live = if app.is_simulating() { "● live" } else { "paused" };
    let title = format!(
        "Live Phishing Detections ({} of {}) {}",
        visible.len(),
        app.domains().len(),
        live
    );

    let header = Row::new(["Domain", "Target", "Type", "Confidence", "Source", "IP", "Country", "Status", "First seen"])
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = visible
        .iter()
        .map(|d| {
            Row::new(vec![
                Cell::from(d.domain.clone()),
                Cell::from(d.target_brand.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(d.threat_type.to_string()),
                Cell::from(format!("{}%", d.confidence))
                    .style(Style::default().fg(confidence_color(d.confidence_band()))),
                Cell::from(d.source.clone()),
                Cell::from(d.ip_address.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(d.country.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(d.status.to_string()).style(Style::default().fg(status_color(d.status))),
                Cell::from(format_short_timestamp(&d.first_seen.to_rfc3339())),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(24),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(11),
        Constraint::Length(11),
        Constraint::Length(15),
        Constraint::Length(8),
        Constraint::Length(14),
        Constraint::Length(14),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(panel(title, Color::Cyan));
    f.render_widget(table, area);
}
