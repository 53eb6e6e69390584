use clap::Parser;
use color_eyre::Result;
use ratatui::DefaultTerminal;
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::Duration;
use tourism_dash::chart_export::{export_dashboard, ChartExportFormat, ExportPalette};
use tourism_dash::logging::{default_log_path, init_tracing, LogTarget};
use tourism_dash::{
    build_view, load_banner, App, AppConfig, AppEvent, Args, ConfigManager, DashboardState,
    ExportSettings, OpenOptions, Theme, TourismTable, APP_NAME,
};
use tracing::info;

fn open_options(config: &AppConfig) -> OpenOptions {
    let mut opts = OpenOptions::new();
    if let Some(delimiter) = config.data.delimiter {
        opts = opts.with_delimiter(delimiter);
    }
    opts
}

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, mut app: App, poll_interval: Duration) -> Result<()> {
    let (tx, rx) = channel::<AppEvent>();
    render(&mut terminal, &mut app)?;
    tx.send(AppEvent::Rerun)?;

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        match ConfigManager::new(APP_NAME) {
            Ok(manager) => match manager.write_default_config(args.force) {
                Ok(path) => {
                    println!("Configuration file written to {}", path.display());
                    return Ok(Some(()));
                }
                Err(e) => {
                    eprintln!("Error writing config file: {}", e);
                    std::process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("Error initializing config manager: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(None)
}

/// `--export DIR`: render the charts for the starting widget values and exit.
fn export_headless(config: &AppConfig, state: &DashboardState, args: &Args) -> Result<()> {
    init_tracing(&config.logging, &LogTarget::Stderr)?;
    let Some(dir) = &args.export else {
        return Ok(());
    };

    let table = TourismTable::from_csv(&config.data.path, &open_options(config))?;
    let view = build_view(&table, state)?;
    let paths = export_dashboard(
        &view,
        dir,
        ChartExportFormat::from(args.export_format),
        &ExportPalette::from_colors(&config.theme.colors),
    )?;
    for path in &paths {
        println!("{}", path.display());
    }
    info!(count = paths.len(), dir = %dir.display(), "charts exported");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;

    let mut config = AppConfig::load(APP_NAME)?;
    config.apply_args(&args);
    config.validate()?;
    let state = DashboardState::from_args_and_config(&args, &config.dashboard);

    if args.export.is_some() {
        if let Err(e) = export_headless(&config, &state, &args) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return Ok(());
    }

    let log_path = default_log_path(&config.logging, APP_NAME)?;
    init_tracing(&config.logging, &LogTarget::File(log_path))?;

    let table = TourismTable::from_csv(&config.data.path, &open_options(&config))?;
    info!(
        path = %config.data.path.display(),
        rows = table.height(),
        "tourism table loaded"
    );
    let theme = Theme::from_config(&config.theme)?;
    let mut app = App::new(Arc::new(table), state, theme)
        .with_banner(load_banner(&config.data.banner))
        .with_export(ExportSettings {
            dir: std::env::current_dir()?,
            format: ChartExportFormat::from(args.export_format),
            palette: ExportPalette::from_colors(&config.theme.colors),
        });
    if config.debug.enabled {
        app.enable_debug();
    }

    let poll_interval = Duration::from_millis(config.performance.event_poll_interval_ms);
    let terminal = ratatui::init();
    let result = run(terminal, app, poll_interval);
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_delimiter_to_open_options() {
        let mut config = AppConfig::default();
        config.data.delimiter = Some(b';');
        let opts = open_options(&config);
        assert_eq!(opts.delimiter, Some(b';'));
    }
}
