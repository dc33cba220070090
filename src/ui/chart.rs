//! Line chart for time series panels.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph},
    Frame,
};

use panelwatch_types::Series;

use crate::app::App;
use crate::data::format::format_axis_time;
use crate::data::{format_value, ChartState};

use super::SERVER_ERROR;

/// Render the chart, with an error line below it when the last fetch failed.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let source = app.source();
    let panel = &source.request().panel;
    let chart = source.chart();

    let (chart_area, error_area) = if chart.error.is_some() {
        let chunks = Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).split(area);
        (chunks[0], Some(chunks[1]))
    } else {
        (area, None)
    };

    let block = Block::default()
        .title(format!(" {} ", panel.title))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let series = chart.display_series(panel.stack);
    let points: Vec<(usize, &str, Vec<(f64, f64)>)> = series
        .iter()
        .map(|(slot, s)| (*slot, s.label.as_str(), chart_points(s)))
        .collect();

    let window = app
        .visible_window()
        .map(|v| (v.start_ms, v.end_ms))
        .or_else(|| chart.x_bounds());

    match (window, points.iter().any(|(_, _, p)| !p.is_empty())) {
        (Some((x_min, x_max)), true) => {
            let show_legend = chart.show_legend(panel.kind);
            let datasets: Vec<Dataset> = points
                .iter()
                .map(|(slot, label, data)| {
                    Dataset::default()
                        .name(if show_legend { label.to_string() } else { String::new() })
                        .graph_type(GraphType::Line)
                        .marker(symbols::Marker::Braille)
                        .style(Style::default().fg(app.theme.series_color(*slot)))
                        .data(data)
                })
                .collect();

            let (y_min, y_max) = y_bounds(&series);
            let unit = panel.unit();
            let span = x_max - x_min;
            let axis_style = Style::default().fg(app.theme.border);

            let x_axis = Axis::default()
                .style(axis_style)
                .bounds([x_min as f64, x_max as f64])
                .labels([
                    Span::styled(
                        format_axis_time(x_min, span),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(format_axis_time(x_min + span / 2, span)),
                    Span::styled(
                        format_axis_time(x_max, span),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]);

            let mut y_axis = Axis::default()
                .style(axis_style)
                .bounds([y_min, y_max])
                .labels([
                    Span::raw(format_value(y_min, unit)),
                    Span::raw(format_value((y_min + y_max) / 2.0, unit)),
                    Span::raw(format_value(y_max, unit)),
                ]);
            if let Some(label) = panel.value_axis().and_then(|a| a.label.clone()) {
                y_axis = y_axis.title(label);
            }

            let widget = Chart::new(datasets)
                .block(block)
                .x_axis(x_axis)
                .y_axis(y_axis)
                .legend_position(show_legend.then_some(LegendPosition::TopRight))
                .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)));
            frame.render_widget(widget, chart_area);
        }
        _ => {
            let text = placeholder(chart);
            let paragraph = Paragraph::new(text)
                .alignment(Alignment::Center)
                .style(Style::default().add_modifier(Modifier::DIM))
                .block(block);
            frame.render_widget(paragraph, chart_area);
        }
    }

    if let Some(area) = error_area {
        let line = Line::from(Span::styled(
            format!(" {} ", SERVER_ERROR),
            Style::default().fg(app.theme.error),
        ));
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Points ratatui can draw. Gaps (NaN) are dropped.
fn chart_points(series: &Series) -> Vec<(f64, f64)> {
    series
        .points
        .iter()
        .filter(|p| p.y.is_finite())
        .map(|p| (p.x as f64, p.y))
        .collect()
}

/// Value bounds with a little headroom, never empty.
fn y_bounds(series: &[(usize, Series)]) -> (f64, f64) {
    match ChartState::y_bounds(series) {
        Some((lo, hi)) if hi > lo => {
            let pad = (hi - lo) * 0.05;
            let lo = if lo >= 0.0 { (lo - pad).max(0.0) } else { lo - pad };
            (lo, hi + pad)
        }
        Some((v, _)) => (v - 1.0, v + 1.0),
        None => (0.0, 1.0),
    }
}

fn placeholder(chart: &ChartState) -> &'static str {
    if chart.is_busy() {
        "Loading..."
    } else if chart.error.is_some() {
        ""
    } else {
        "No data"
    }
}

#[cfg(test)]
mod tests {
    use panelwatch_types::Point;

    use super::*;

    fn series(values: &[f64]) -> (usize, Series) {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, v)| Point::new(i as i64 * 1000, *v))
            .collect();
        (0, Series::new("s", points))
    }

    #[test]
    fn test_chart_points_skip_gaps() {
        let (_, s) = series(&[1.0, f64::NAN, 3.0]);
        assert_eq!(chart_points(&s), vec![(0.0, 1.0), (2000.0, 3.0)]);
    }

    #[test]
    fn test_y_bounds() {
        assert_eq!(y_bounds(&[]), (0.0, 1.0));
        assert_eq!(y_bounds(&[series(&[5.0, 5.0])]), (4.0, 6.0));

        let (lo, hi) = y_bounds(&[series(&[0.0, 10.0])]);
        assert_eq!(lo, 0.0);
        assert!((hi - 10.5).abs() < 1e-9);

        let (lo, _) = y_bounds(&[series(&[-10.0, 10.0])]);
        assert!((lo + 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_placeholder() {
        let mut chart = ChartState::new();
        assert_eq!(placeholder(&chart), "No data");
        chart.begin_batch(1);
        assert_eq!(placeholder(&chart), "Loading...");
    }
}
