pub mod app;
pub mod cli;
pub mod fx;
pub mod ui;

#[cfg(test)]
mod test_support;

use std::{
    fs::File,
    io::{self, Stdout},
    path::Path,
    sync::atomic::{AtomicBool, Ordering},
};

use anyhow::{Context, Result, bail};
use app::{
    events::{AppEvent, spawn_input_task},
    settings::load_runtime_settings,
    state::{AppMode, AppState},
};
use cli::Cli;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use fx::surface::Viewport;
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;

/// Set by the panic hook. A panic in any task has already restored the
/// terminal, so the event loop must stop drawing.
static PANICKED: AtomicBool = AtomicBool::new(false);

pub async fn run(cli: Cli) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_inner(&mut terminal, cli).await;
    restore_terminal(&mut terminal)?;
    result
}

async fn run_inner(terminal: &mut Terminal<CrosstermBackend<Stdout>>, cli: Cli) -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<AppEvent>(256);
    let input_stream = spawn_input_task();
    tokio::pin!(input_stream);

    let (settings, settings_path) = load_runtime_settings(&cli, !cli.ephemeral);
    let size = terminal.size()?;
    let mut app = AppState::new(
        &cli,
        settings,
        settings_path,
        Viewport::for_cells(size.width, size.height),
    );

    tx.send(AppEvent::Bootstrap).await?;

    while app.running {
        tokio::select! {
            maybe_input = input_stream.next() => {
                if let Some(input) = maybe_input {
                    app.handle_event(AppEvent::Input(input), &tx).await?;
                }
            }
            maybe_event = rx.recv() => {
                if let Some(event) = maybe_event {
                    app.handle_event(event, &tx).await?;
                }
            }
        }

        halt_after_panic(&mut app)?;
        terminal.draw(|frame| ui::render(frame, &app))?;

        if app.mode == AppMode::Quit {
            app.running = false;
        }
    }

    app.teardown();
    Ok(())
}

fn halt_after_panic(app: &mut AppState) -> Result<()> {
    if PANICKED.load(Ordering::SeqCst) {
        app.teardown();
        app.running = false;
        bail!("a background task panicked; see the message above");
    }
    Ok(())
}

/// Routes `log` output to `log_file` when given. Without one, output goes
/// to stderr and stays off unless `RUST_LOG` asks for it, since the
/// terminal belongs to the animation.
pub fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let default_filter = if log_file.is_some() { "info" } else { "off" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("creating log file {} failed", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.try_init().context("initializing logger failed")
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    install_panic_hook();
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn install_panic_hook() {
    let existing = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        PANICKED.store(true, Ordering::SeqCst);
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
        existing(panic);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app::settings::RuntimeSettings, cli::EffectArg};

    #[tokio::test(start_paused = true)]
    async fn panic_flag_tears_down_and_stops_the_loop() {
        let (tx, _rx) = mpsc::channel(256);
        let cli = crate::test_support::test_cli();
        let settings = RuntimeSettings {
            effect: EffectArg::Thunder,
            ..RuntimeSettings::default()
        };
        let mut app = AppState::new(&cli, settings, None, Viewport::for_cells(40, 12));
        app.handle_event(AppEvent::Bootstrap, &tx).await.expect("bootstrap");

        assert!(halt_after_panic(&mut app).is_ok());
        assert!(app.mount().is_some());

        PANICKED.store(true, Ordering::SeqCst);
        let halted = halt_after_panic(&mut app);
        PANICKED.store(false, Ordering::SeqCst);

        assert!(halted.is_err());
        assert!(app.mount().is_none());
        assert!(!app.running);
    }
}
