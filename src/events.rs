use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};

use crate::app::App;

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }

    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('?') => app.toggle_help(),

        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('t') => app.toggle_live_tail(),

        // Date range
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') => app.zoom_out(),
        KeyCode::Left | KeyCode::Char('h') => app.pan_left(),
        KeyCode::Right | KeyCode::Char('l') => app.pan_right(),
        KeyCode::Esc => app.reset_range(),

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use crossterm::event::KeyModifiers;
    use panelwatch_query::{
        Panel, QueryError, QueryRangeRequest, QueryRangeResponse, RangeQuery, TimeRange,
    };
    use tokio::runtime::Handle;

    use super::*;
    use crate::source::{PanelRequest, PanelSource};
    use crate::ui::Theme;

    #[derive(Debug)]
    struct Unreachable;

    #[async_trait]
    impl RangeQuery for Unreachable {
        async fn query_range(
            &self,
            _request: &QueryRangeRequest,
        ) -> Result<QueryRangeResponse, QueryError> {
            Err(QueryError::Connection("refused".to_string()))
        }

        fn description(&self) -> String {
            "unreachable".to_string()
        }
    }

    fn app() -> App {
        let panel = Panel::builder().target(|t| t.expr("up")).build();
        let request = PanelRequest::new(panel).with_range(TimeRange::new("now-1h", "now"));
        let source = PanelSource::new(Arc::new(Unreachable), request, Handle::current());
        let mut app = App::with_theme(source, Theme::dark());
        app.mount();
        app
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[tokio::test]
    async fn test_help_swallows_next_key() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);

        press(&mut app, KeyCode::Char('q'));
        assert!(!app.show_help);
        assert!(app.running);

        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[tokio::test]
    async fn test_zoom_keys_queue_range() {
        let mut app = app();
        press(&mut app, KeyCode::Char('+'));
        assert!(app.range_pending());

        press(&mut app, KeyCode::Esc);
        assert!(!app.range_pending());
    }

    #[tokio::test]
    async fn test_live_tail_key() {
        let mut app = app();
        press(&mut app, KeyCode::Char('t'));
        assert!(app.source().request().live_tail);
        assert_eq!(app.source().active_timers(), 1);
    }
}
