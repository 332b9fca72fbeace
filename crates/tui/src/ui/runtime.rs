//! Runtime: terminal lifecycle and the single event loop of the form editor.
//!
//! Responsibilities
//! - Own the terminal lifecycle (raw mode, alternate screen).
//! - Multiplex terminal input, navigation steps, ticks and Ctrl+C in one
//!   `tokio::select!` loop.
//! - Route input to the main view and apply the returned `Effect`s before the
//!   next frame is drawn.
use std::io::Stdout;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ichub_types::{Effect, Msg, NavigationEvent};
use ichub_util::FormsConfig;
use ratatui::{Terminal, prelude::CrosstermBackend};
use tokio::{
    signal,
    sync::mpsc,
    time::{self, MissedTickBehavior},
};
use tracing::{info, warn};

use crate::app::{App, FormSession};
use crate::ui::components::component::Component;
use crate::ui::main_component::MainView;

const TICK_INTERVAL: Duration = Duration::from_millis(250);
const INPUT_POLL: Duration = Duration::from_millis(50);

/// Forward terminal input from a blocking reader onto a channel.
///
/// `poll()` and `read()` stay on the same blocking thread; the thread exits
/// once the receiver is dropped.
fn spawn_input_thread() -> mpsc::Receiver<Event> {
    let (sender, receiver) = mpsc::channel(256);
    tokio::task::spawn_blocking(move || {
        loop {
            if sender.is_closed() {
                break;
            }
            match event::poll(INPUT_POLL) {
                Ok(true) => match event::read() {
                    Ok(event) => {
                        if sender.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(error) => {
                        warn!(%error, "failed to read terminal event");
                        break;
                    }
                },
                Ok(false) => {}
                Err(error) => {
                    warn!(%error, "failed to poll terminal events");
                    break;
                }
            }
        }
    });
    receiver
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("creating terminal")
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn handle_input_event(app: &mut App, main_view: &mut MainView, input_event: Event) -> Vec<Effect> {
    match input_event {
        Event::Key(key_event) if key_event.kind != KeyEventKind::Release => main_view.handle_key_events(app, key_event),
        Event::Resize(width, height) => main_view.handle_message(app, &Msg::Resize(width, height)),
        _ => Vec::new(),
    }
}

/// Entry point: sets up the terminal, runs the loop and restores the terminal
/// even when the loop fails.
pub async fn run_app(session: FormSession, config: FormsConfig) -> Result<()> {
    let (navigation_sender, mut navigation_receiver) = mpsc::unbounded_channel();
    let mut app = App::new(session, config, navigation_sender)?;
    let mut main_view = MainView::default();

    let mut terminal = setup_terminal()?;
    let outcome = event_loop(&mut terminal, &mut app, &mut main_view, &mut navigation_receiver).await;
    // Stop pending navigation timers before the terminal goes away.
    app.navigation.cancel();
    let cleanup = cleanup_terminal(&mut terminal);
    outcome?;
    cleanup?;
    if app.dirty {
        info!("form closed with unsaved changes");
    }
    Ok(())
}

fn draw(terminal: &mut Terminal<CrosstermBackend<Stdout>>, main_view: &mut MainView, app: &mut App) -> Result<()> {
    terminal.draw(|frame| {
        let area = frame.area();
        main_view.render(frame, area, app);
    })?;
    Ok(())
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    main_view: &mut MainView,
    navigation_receiver: &mut mpsc::UnboundedReceiver<NavigationEvent>,
) -> Result<()> {
    let mut input_receiver = spawn_input_thread();
    let mut ticker = time::interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    draw(terminal, main_view, app)?;
    loop {
        let mut needs_render = false;
        tokio::select! {
            maybe_event = input_receiver.recv() => {
                let Some(event) = maybe_event else {
                    break;
                };
                if let Event::Key(key_event) = &event
                    && key_event.code == KeyCode::Char('c')
                    && key_event.modifiers.contains(KeyModifiers::CONTROL)
                {
                    break;
                }
                let effects = handle_input_event(app, main_view, event);
                app.apply_effects(effects);
                needs_render = true;
            }
            Some(step) = navigation_receiver.recv() => {
                let effects = main_view.handle_message(app, &Msg::Navigation(step));
                app.apply_effects(effects);
                needs_render = true;
            }
            _ = ticker.tick() => {
                let effects = main_view.handle_message(app, &Msg::Tick);
                needs_render = !effects.is_empty();
                app.apply_effects(effects);
            }
            _ = signal::ctrl_c() => {
                break;
            }
        }
        if app.should_quit {
            break;
        }
        if needs_render {
            draw(terminal, main_view, app)?;
        }
    }
    Ok(())
}
