use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing::info;
use tracing_subscriber::{
    fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use panelwatch::settings::{load_panel, Settings};
use panelwatch::source::{PanelRequest, PanelSource};
use panelwatch::{events, ui, App};
use panelwatch_query::{QueryBackend, QueryClient};

#[derive(Parser, Debug)]
#[command(name = "panelwatch")]
#[command(about = "Render a Grafana-style dashboard panel in the terminal")]
struct Args {
    /// Panel or dashboard JSON file
    #[arg(short, long)]
    panel: PathBuf,

    /// Which panel to show when --panel is a dashboard
    #[arg(long)]
    index: Option<usize>,

    /// Settings file (TOML, JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the query API
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Query backend behind the endpoint (prometheus or grafana)
    #[arg(long)]
    backend: Option<QueryBackend>,

    /// Start of the date range (e.g. "now-6h", "now/d", epoch millis)
    #[arg(long)]
    from: Option<String>,

    /// End of the date range
    #[arg(long)]
    to: Option<String>,

    /// Polling period while live tail is on (e.g. "30s", "5m")
    #[arg(short, long)]
    refresh: Option<String>,

    /// Poll for new data on the refresh period
    #[arg(short, long)]
    live_tail: bool,

    /// Template variable, repeatable
    #[arg(long = "var", value_name = "KEY=VALUE")]
    vars: Vec<String>,

    /// Log file (the terminal belongs to the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Fetch once, print the series as JSON and exit
    #[arg(long)]
    once: bool,
}

impl Args {
    /// Layer command line flags over loaded settings.
    fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(index) = self.index {
            settings.panel_index = index;
        }
        if let Some(ref endpoint) = self.endpoint {
            settings.endpoint = endpoint.clone();
        }
        if let Some(backend) = self.backend {
            settings.backend = backend;
        }
        if let Some(ref from) = self.from {
            settings.from = from.clone();
        }
        if let Some(ref to) = self.to {
            settings.to = to.clone();
        }
        if let Some(ref refresh) = self.refresh {
            settings.refresh = refresh.clone();
        }
        if self.live_tail {
            settings.live_tail = true;
        }
        settings.vars.extend(self.vars.iter().cloned());
        if let Some(ref log_file) = self.log_file {
            settings.log_file = log_file.clone();
        }
        settings
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;
    let settings = args.apply(settings);

    init_logging(&settings, args.once)?;

    let panel = load_panel(&args.panel, settings.panel_index)
        .with_context(|| format!("Failed to load panel from {}", args.panel.display()))?;
    info!(
        "Loaded panel '{}' with {} targets from {}",
        panel.title,
        panel.targets.len(),
        args.panel.display()
    );

    let client = QueryClient::builder()
        .endpoint(settings.endpoint.clone())
        .backend(settings.backend)
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()?;

    let request = PanelRequest::new(panel)
        .with_range(settings.range())
        .with_vars(settings.template_vars())
        .with_refresh(settings.refresh.clone())
        .with_live_tail(settings.live_tail);

    // Fetches and the polling timer run here; the UI loop stays on this thread
    let rt = tokio::runtime::Runtime::new()?;
    let source = PanelSource::new(Arc::new(client), request, rt.handle().clone());

    if args.once {
        let deadline = Duration::from_secs(settings.timeout_secs.saturating_add(5));
        return rt.block_on(print_once(source, deadline));
    }

    run_tui(source)
}

/// Send logs to a file, or to stderr in one-shot mode.
fn init_logging(settings: &Settings, once: bool) -> Result<()> {
    let writer = if once {
        BoxMakeWriter::new(io::stderr)
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&settings.log_file)
            .with_context(|| format!("Failed to open log file {}", settings.log_file.display()))?;
        BoxMakeWriter::new(Mutex::new(file))
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("panelwatch=info,panelwatch_query=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .init();
    Ok(())
}

/// Fetch every target once and print the chart series as JSON.
async fn print_once(mut source: PanelSource, deadline: Duration) -> Result<()> {
    source.mount();
    if tokio::time::timeout(deadline, source.wait_idle()).await.is_err() {
        anyhow::bail!("Timed out waiting for {}", source.description());
    }
    source.unmount();

    let chart = source.chart();
    let series: Vec<_> = chart
        .display_series(source.request().panel.stack)
        .into_iter()
        .map(|(_, s)| s)
        .collect();
    let output = serde_json::json!({
        "title": source.request().panel.title,
        "range": {
            "from": source.request().range.from,
            "to": source.request().range.to,
        },
        "error": chart.error,
        "series": series,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Run the TUI around a panel source
fn run_tui(source: PanelSource) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let mut app = App::new(source);
    app.mount();

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 40;
    const MIN_HEIGHT: u16 = 10;

    while app.running {
        app.tick();

        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(
                    0,
                    (area.height / 2).saturating_sub(2),
                    area.width,
                    5.min(area.height),
                );
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Min(6),    // Panel
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::render_panel(frame, app, chunks[1]);
            ui::common::render_status_bar(frame, app, chunks[2]);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout
        if let Some(Event::Key(key)) = events::poll_event(Duration::from_millis(100))? {
            events::handle_key_event(app, key);
        }
    }

    Ok(())
}
