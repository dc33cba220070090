//! Common UI components: header bar, status bar and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::format::format_timestamp;
use crate::data::{format_interval, parse_refresh_interval};
use crate::source::RefreshState;

/// Spinner frames for the busy indicator.
const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Render the header bar.
///
/// Displays: refresh state, panel title and kind, date range, busy spinner.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let source = app.source();
    let request = source.request();
    let state = source.state();

    let refresh = match state {
        RefreshState::Polling => format!(
            "LIVE {}",
            format_interval(parse_refresh_interval(&request.refresh))
        ),
        other => other.label().to_uppercase(),
    };

    let mut spans = vec![
        Span::styled(" ● ", app.theme.refresh_style(state)),
        Span::styled(
            format!("{} ", title_or_default(&request.panel.title)),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("({}) │ ", request.panel.kind.label())),
        Span::raw(range_label(app)),
        Span::raw(" │ "),
        Span::styled(refresh, app.theme.refresh_style(state)),
    ];

    if app.range_pending() {
        spans.push(Span::styled(
            " │ zoom pending",
            Style::default().fg(app.theme.highlight),
        ));
    }

    if source.chart().is_busy() {
        let frame_index = (std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() / 100)
            .unwrap_or(0) as usize)
            % SPINNER.len();
        spans.push(Span::styled(
            format!(" {}", SPINNER[frame_index]),
            Style::default().fg(app.theme.highlight),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn title_or_default(title: &str) -> &str {
    if title.is_empty() {
        "PANEL"
    } else {
        title
    }
}

/// The date range as shown in the header: tokens for relative ranges,
/// timestamps for absolute ones.
fn range_label(app: &App) -> String {
    let range = &app.source().request().range;
    if !app.range_pending() && !range.is_absolute() {
        return format!("{} → {}", range.from, range.to);
    }
    match app.visible_window() {
        Some(view) => format!(
            "{} → {}",
            format_timestamp(view.start_ms),
            format_timestamp(view.end_ms)
        ),
        None => format!("{} → {}", range.from, range.to),
    }
}

/// Render the status bar at the bottom.
///
/// Shows: backend, time since last update, available controls.
/// Also displays temporary status messages and the last fetch error.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let chart = app.source().chart();
    let controls = "+/-:zoom ←/→:pan Esc:reset t:live r:refresh ?:help q:quit";

    let (status, style) = if let Some(ref err) = chart.error {
        (
            format!(" Error: {} | {}", err, controls),
            Style::default().fg(app.theme.error),
        )
    } else if let Some(updated) = chart.last_updated {
        (
            format!(
                " {} | Updated {:.1}s ago | {}",
                app.source_description(),
                updated.elapsed().as_secs_f64(),
                controls
            ),
            Style::default().add_modifier(Modifier::DIM),
        )
    } else {
        (
            format!(" {} | Loading... | q:quit", app.source_description()),
            Style::default().add_modifier(Modifier::DIM),
        )
    };

    frame.render_widget(Paragraph::new(status).style(style), area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the panel.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Date range",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  + / -       Zoom in/out"),
        Line::from("  ←/→ h/l     Pan back/forward"),
        Line::from("  Esc         Restore configured range"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Refresh",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  t           Toggle live tail"),
        Line::from("  r           Refresh now"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ?           Toggle help"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Zoom and pan apply after 1s and turn live tail off",
            Style::default().add_modifier(Modifier::DIM),
        )]),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 56u16.min(area.width.saturating_sub(4));
    let help_height = 21u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
