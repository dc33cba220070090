//! Gauge panels: the latest value of the first series, over a sparkline of
//! that series when the panel asks for one.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Sparkline},
    Frame,
};

use panelwatch_types::Series;

use crate::app::App;
use crate::data::{format_value, gauge_ratio};

use super::theme::parse_css_color;
use super::SERVER_ERROR;

/// Bar height of the largest sample in a sparkline.
const SPARKLINE_MAX: u64 = 100;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let source = app.source();
    let panel = &source.request().panel;
    let chart = source.chart();
    let unit = panel.unit();

    let block = Block::default()
        .title(format!(" {} ", panel.title))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if panel.shows_sparkline() {
        render_sparkline(frame, app, inner);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1), // Value
        Constraint::Length(1),
        Constraint::Length(1), // Bar
        Constraint::Min(1),
        Constraint::Length(1), // Error
    ])
    .split(inner);

    let value = chart.latest_value();
    let text = match value {
        Some(v) => format_value(v, unit),
        None if chart.is_busy() => "Loading...".to_string(),
        None => "No data".to_string(),
    };
    let color = chart
        .series()
        .next()
        .map(|(slot, _)| app.theme.series_color(slot))
        .unwrap_or(app.theme.highlight);
    let paragraph = Paragraph::new(Line::from(Span::styled(
        text.clone(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(paragraph, chunks[1]);

    if let Some(ratio) = value.and_then(|v| gauge_ratio(v, unit)) {
        let bar_area = centered(chunks[3], 60);
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(color))
            .ratio(ratio)
            .label(text);
        frame.render_widget(gauge, bar_area);
    }

    if chart.error.is_some() {
        let line = Line::from(Span::styled(SERVER_ERROR, Style::default().fg(app.theme.error)));
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), chunks[5]);
    }
}

/// The latest value drawn over an axis-less area chart of the first series.
fn render_sparkline(frame: &mut Frame, app: &App, area: Rect) {
    let source = app.source();
    let panel = &source.request().panel;
    let chart = source.chart();
    let first = chart.series().next();

    let slot_color = first
        .map(|(slot, _)| app.theme.series_color(slot))
        .unwrap_or(app.theme.highlight);
    let (line, fill) = sparkline_colors(panel.sparkline.as_ref().and_then(|s| s.colors()))
        .unwrap_or((slot_color, slot_color));

    let chunks = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);

    if let Some((_, series)) = first {
        let bars = sparkline_bars(series, usize::from(chunks[0].width));
        let sparkline = Sparkline::default()
            .data(bars)
            .max(SPARKLINE_MAX)
            .style(Style::default().fg(fill));
        frame.render_widget(sparkline, chunks[0]);
    }

    let text = match chart.latest_value() {
        Some(v) if v.is_finite() => format_value(v, panel.unit()),
        Some(_) => String::new(),
        None if chart.is_busy() => "Loading...".to_string(),
        None => "No data".to_string(),
    };
    if !text.is_empty() {
        let middle = Rect::new(chunks[0].x, chunks[0].y + chunks[0].height / 2, chunks[0].width, 1);
        let value = Paragraph::new(Line::from(Span::styled(
            format!(" {} ", text),
            Style::default().fg(line).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(value, middle);
    }

    if chart.error.is_some() {
        let line = Line::from(Span::styled(SERVER_ERROR, Style::default().fg(app.theme.error)));
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), chunks[1]);
    }
}

/// Configured line and fill colors, when both parse.
fn sparkline_colors(colors: Option<(&str, &str)>) -> Option<(Color, Color)> {
    let (line, fill) = colors?;
    Some((parse_css_color(line)?, parse_css_color(fill)?))
}

/// Bar heights for the last `width` samples, scaled between the series'
/// smallest and largest value. Gaps become empty bars.
fn sparkline_bars(series: &Series, width: usize) -> Vec<Option<u64>> {
    let skip = series.points.len().saturating_sub(width);
    let points = &series.points[skip..];

    let Some((lo, hi)) = points
        .iter()
        .map(|p| p.y)
        .filter(|y| y.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, y| match acc {
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
            None => Some((y, y)),
        })
    else {
        return vec![None; points.len()];
    };

    points
        .iter()
        .map(|p| {
            if !p.y.is_finite() {
                return None;
            }
            if hi <= lo {
                return Some(SPARKLINE_MAX / 2);
            }
            // The lowest sample keeps a sliver so the line stays visible
            let scaled = (p.y - lo) / (hi - lo) * (SPARKLINE_MAX - 1) as f64;
            Some(scaled.round() as u64 + 1)
        })
        .collect()
}

/// A horizontally centered slice of `area`, `percent` wide.
fn centered(area: Rect, percent: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(percent.min(100)) / 100) as u16;
    Rect::new(area.x + (area.width - width) / 2, area.y, width, area.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered() {
        let area = Rect::new(10, 2, 100, 1);
        assert_eq!(centered(area, 60), Rect::new(30, 2, 60, 1));
        assert_eq!(centered(area, 150), area);
    }

    fn series(values: &[f64]) -> Series {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, v)| panelwatch_types::Point::new(i as i64 * 1000, *v))
            .collect();
        Series::new("s", points)
    }

    #[test]
    fn test_sparkline_bars_scale_to_range() {
        let bars = sparkline_bars(&series(&[10.0, 20.0, f64::NAN, 15.0]), 80);
        assert_eq!(bars, vec![Some(1), Some(100), None, Some(51)]);
    }

    #[test]
    fn test_sparkline_bars_keep_latest_samples() {
        let bars = sparkline_bars(&series(&[1.0, 2.0, 3.0, 4.0]), 2);
        assert_eq!(bars, vec![Some(1), Some(100)]);

        assert_eq!(sparkline_bars(&series(&[5.0, 5.0]), 10), vec![Some(50), Some(50)]);
        assert_eq!(sparkline_bars(&series(&[f64::NAN]), 10), vec![None]);
    }

    #[test]
    fn test_sparkline_colors_need_both() {
        assert_eq!(
            sparkline_colors(Some(("#ff0000", "rgba(0, 0, 255, 0.2)"))),
            Some((Color::Rgb(255, 0, 0), Color::Rgb(0, 0, 255)))
        );
        assert_eq!(sparkline_colors(Some(("#ff0000", "not a color"))), None);
        assert_eq!(sparkline_colors(None), None);
    }
}
