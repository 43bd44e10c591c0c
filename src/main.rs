use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tunnelwatch::app::write_export;
use tunnelwatch::config::{Overrides, Settings, DEFAULT_CONFIG_FILE};
use tunnelwatch::{
    events, ui, App, DataSource, FileSource, HostLabels, HttpApi, MetricStore, MonitorApi, Poller,
    Snapshot, StatusBoard,
};

#[derive(Parser, Debug)]
#[command(name = "tunnelwatch")]
#[command(about = "Terminal dashboard for VPN tunnel latency and recovery")]
struct Args {
    /// Path to the TOML config file (optional)
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Base URL of the ping-monitor service
    #[arg(long)]
    endpoint: Option<String>,

    /// Timeout for polls (e.g., "3s", "1500ms"); resets use `reset_timeout`
    #[arg(short, long)]
    timeout: Option<String>,

    /// Replay a ping_results JSON file instead of polling the service
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Log file (the terminal belongs to the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Export the current per-host summary to JSON and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = Overrides {
        endpoint: args.endpoint.clone(),
        request_timeout: args.timeout.clone(),
        log_file: args.log_file.clone(),
    };
    let settings = Settings::load(&args.config, &overrides)?;
    init_logging(&settings.log_file, args.verbose)?;

    let api: Arc<dyn MonitorApi> = Arc::new(
        HttpApi::builder()
            .endpoint(settings.endpoint.clone())
            .timeout(settings.request_timeout()?)
            .reset_timeout(settings.reset_timeout()?)
            .build()?,
    );

    let runtime = tokio::runtime::Runtime::new()?;

    // Handle export mode (non-interactive)
    if let Some(export_path) = args.export {
        let snapshot = match args.file {
            Some(ref path) => load_snapshot(path)?,
            None => runtime
                .block_on(api.fetch_snapshot())
                .with_context(|| format!("Failed to fetch snapshot from {}", settings.endpoint))?,
        };
        return export_to_file(&snapshot, &settings.hosts, &export_path);
    }

    // The UI loop stays on this thread; background tasks run on the runtime
    let _guard = runtime.enter();

    let source: Box<dyn DataSource> = match args.file {
        Some(path) => Box::new(FileSource::new(path)),
        None => Box::new(Poller::spawn(api.clone())),
    };
    info!(source = source.description(), endpoint = %settings.endpoint, "starting dashboard");

    run_tui(source, api, settings.hosts)
}

/// Send logs to a file, with `RUST_LOG` taking precedence over `--verbose`.
fn init_logging(path: &Path, verbose: bool) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Run the TUI with the given data source
fn run_tui(source: Box<dyn DataSource>, api: Arc<dyn MonitorApi>, labels: HostLabels) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(source, api, labels);

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 14;

    while app.running {
        app.tick();

        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5.min(area.height));
                frame.render_widget(paragraph, centered);
                return;
            }

            ui::render(frame, app);
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                _ => {}
            }
        }
    }

    Ok(())
}

fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Snapshot::from_json(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Export one snapshot's per-host summary to a JSON file
fn export_to_file(snapshot: &Snapshot, labels: &HostLabels, export_path: &Path) -> Result<()> {
    let mut store = MetricStore::new();
    store.update(snapshot, labels);

    let mut status = StatusBoard::new();
    status.apply_snapshot(snapshot, tokio::time::Instant::now());

    write_export(export_path, &store, &status)?;

    println!("Exported tunnel summary to: {}", export_path.display());
    Ok(())
}
