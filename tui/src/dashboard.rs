//! Dashboard view: renders the service table and a summary footer.
//!
//! Rows follow config order and never move. Each row is looked up by name in
//! the status table; a service with no entry yet shows its port with blank
//! status and branch cells.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use svcwatch_core::monitor::aggregator::StatusTable;
use svcwatch_core::types::service::{rfc3339, ServiceDescriptor, ServiceStatus};

use crate::theme::Theme;


/// Render the dashboard view: service table + summary line.
pub fn render_dashboard(
    frame: &mut Frame,
    area: Rect,
    services: &[ServiceDescriptor],
    table: &StatusTable,
    theme: &Theme,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // service table
            Constraint::Length(1), // summary
        ])
        .split(area);

    render_service_table(frame, chunks[0], services, table, theme);
    render_summary(frame, chunks[1], services, table, theme);
}


fn render_service_table(
    frame: &mut Frame,
    area: Rect,
    services: &[ServiceDescriptor],
    table: &StatusTable,
    theme: &Theme,
) {
    let header = Row::new(vec!["NAME", "PORT", "STATUS", "BRANCH"]).style(theme.header_style());

    let rows: Vec<Row> = services
        .iter()
        .map(|service| service_row(service, table, theme))
        .collect();

    let widget = Table::new(
        rows,
        [
            Constraint::Length(name_column_width(services)), // Name
            Constraint::Length(7),                           // Port
            Constraint::Length(9),                           // Status
            Constraint::Fill(1),                             // Branch
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border))
            .title("Services"),
    );

    frame.render_widget(widget, area);
}


/// Widest name plus two cells of padding, at least 12, capped at `u16::MAX`.
fn name_column_width(services: &[ServiceDescriptor]) -> u16 {
    let longest = services
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(10);
    u16::try_from(longest).unwrap_or(u16::MAX).saturating_add(2)
}


/// Build one table row. Port always comes from the descriptor.
fn service_row<'a>(service: &'a ServiceDescriptor, table: &StatusTable, theme: &Theme) -> Row<'a> {
    let entry = table.get(&service.name);

    let status = match entry {
        Some(e) => Cell::from(e.status.as_str()).style(theme.status_style(e.status)),
        None => Cell::from(""),
    };
    let branch = entry
        .map(|e| e.revision.label().to_string())
        .unwrap_or_default();

    Row::new(vec![
        Cell::from(service.name.as_str()).style(Style::default().fg(theme.name)),
        Cell::from(service.port.to_string()).style(Style::default().fg(theme.port)),
        status,
        Cell::from(branch).style(Style::default().fg(theme.branch)),
    ])
}


/// One-line summary: running count, newest check time, quit hint.
pub fn summary_line(services: &[ServiceDescriptor], table: &StatusTable) -> String {
    let running = table.count(ServiceStatus::Running);
    let checked = table
        .last_checked()
        .map(|t| rfc3339(&t))
        .unwrap_or_else(|| "--".into());
    format!(
        "{}/{} running  last check {}  q: quit",
        running,
        services.len(),
        checked
    )
}


fn render_summary(
    frame: &mut Frame,
    area: Rect,
    services: &[ServiceDescriptor],
    table: &StatusTable,
    theme: &Theme,
) {
    let text = summary_line(services, table);
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(theme.footer)),
        area,
    );
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
