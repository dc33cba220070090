//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use std::str::FromStr;

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::source::RefreshState;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for fetch errors.
    pub error: Color,
    /// Color for the live tail indicator.
    pub live: Color,
    /// Color for borders, axes and separators.
    pub border: Color,
    /// Style for the panel title and overlay headings.
    pub header: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
    /// Series colors, assigned by slot.
    pub palette: Vec<Color>,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            error: Color::Red,
            live: Color::Green,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
            palette: vec![
                Color::Green,
                Color::Yellow,
                Color::LightBlue,
                Color::LightRed,
                Color::Cyan,
                Color::Magenta,
                Color::LightGreen,
                Color::LightYellow,
                Color::Blue,
                Color::White,
            ],
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            error: Color::Red,
            live: Color::Green,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
            palette: vec![
                Color::Green,
                Color::Blue,
                Color::Red,
                Color::Magenta,
                Color::Cyan,
                Color::DarkGray,
                Color::LightBlue,
                Color::Yellow,
                Color::LightRed,
                Color::Black,
            ],
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Color for a chart slot. Wraps around the palette.
    pub fn series_color(&self, slot: usize) -> Color {
        if self.palette.is_empty() {
            return self.highlight;
        }
        self.palette[slot % self.palette.len()]
    }

    /// Style for the refresh state indicator.
    pub fn refresh_style(&self, state: RefreshState) -> Style {
        match state {
            RefreshState::Polling => Style::default().fg(self.live).add_modifier(Modifier::BOLD),
            RefreshState::OneShot => Style::default().fg(self.highlight),
            RefreshState::Idle => Style::default().add_modifier(Modifier::DIM),
        }
    }
}

/// Parse a dashboard CSS color: `rgb(r, g, b)`, `rgba(r, g, b, a)`, or
/// anything ratatui understands (`#rrggbb`, named colors).
///
/// Alpha is ignored; terminals have no blending.
pub fn parse_css_color(css: &str) -> Option<Color> {
    let css = css.trim();
    let channels = css
        .strip_prefix("rgba(")
        .or_else(|| css.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'));

    match channels {
        Some(channels) => {
            let mut parts = channels.split(',').map(|c| c.trim().parse::<u8>());
            let r = parts.next()?.ok()?;
            let g = parts.next()?.ok()?;
            let b = parts.next()?.ok()?;
            Some(Color::Rgb(r, g, b))
        }
        None => Color::from_str(css).ok(),
    }
}
