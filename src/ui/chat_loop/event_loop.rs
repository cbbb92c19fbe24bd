use std::error::Error;
use std::time::{Duration, Instant};

use chrono::Local;
use ratatui::crossterm::event::{self, Event};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::executors::CommandExecutor;
use super::keybindings::handle_event;
use super::lifecycle::{restore_terminal, setup_terminal, ChatTerminal};
use crate::core::app::{apply_actions, App, AppAction, AppActionDispatcher, AppOptions};
use crate::core::context::AppContext;
use crate::ui::renderer::ui;

const MAX_FPS: u64 = 60;

enum UiEvent {
    Crossterm(Event),
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        debug!(error = %err, "failed to read terminal event");
                        continue;
                    }
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

/// Run the full-screen chat until the user quits.
pub async fn run_chat(context: AppContext, options: AppOptions) -> Result<(), Box<dyn Error>> {
    let mut app = App::new(context, options, Local::now());
    info!(
        provider = %app.provider(),
        session = %app.store().session_file().display(),
        "starting chat"
    );

    let mut terminal = setup_terminal()?;
    let result = main_loop(&mut app, &mut terminal).await;
    let restored = restore_terminal(&mut terminal);
    result?;
    restored
}

async fn main_loop(app: &mut App, terminal: &mut ChatTerminal) -> Result<(), Box<dyn Error>> {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<AppAction>();
    let dispatcher = AppActionDispatcher::new(action_tx);
    let mut executor = CommandExecutor::new(dispatcher.clone());

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx);

    let frame_duration = Duration::from_millis(1000 / MAX_FPS);
    let mut last_draw = Instant::now() - frame_duration;
    let mut request_redraw = true;

    let result = loop {
        if app.exit_requested() {
            break Ok(());
        }

        if let Err(err) = try_draw_frame(
            app,
            terminal,
            &mut request_redraw,
            &mut last_draw,
            frame_duration,
        ) {
            break Err(err);
        }

        let events_processed = process_ui_events(app, &mut event_rx, &dispatcher);
        let actions_applied = drain_action_queue(app, &mut executor, &mut action_rx);
        if events_processed || actions_applied {
            request_redraw = true;
        }

        if !events_processed && !actions_applied {
            let wait = if request_redraw {
                frame_duration.saturating_sub(last_draw.elapsed())
            } else {
                frame_duration
            };
            tokio::time::sleep(wait.max(Duration::from_millis(1))).await;
        }
    };

    event_reader_handle.abort();
    executor.stop_typewriter();
    result
}

fn try_draw_frame(
    app: &mut App,
    terminal: &mut ChatTerminal,
    request_redraw: &mut bool,
    last_draw: &mut Instant,
    frame_duration: Duration,
) -> Result<(), Box<dyn Error>> {
    if !*request_redraw || last_draw.elapsed() < frame_duration {
        return Ok(());
    }
    terminal.draw(|f| ui(f, app))?;
    *last_draw = Instant::now();
    *request_redraw = false;
    Ok(())
}

fn process_ui_events(
    app: &mut App,
    event_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
    dispatcher: &AppActionDispatcher,
) -> bool {
    let mut processed = false;
    while let Ok(UiEvent::Crossterm(ev)) = event_rx.try_recv() {
        processed = true;
        let actions = handle_event(app, ev);
        dispatcher.dispatch_many(actions);
    }
    processed
}

fn drain_action_queue(
    app: &mut App,
    executor: &mut CommandExecutor,
    action_rx: &mut mpsc::UnboundedReceiver<AppAction>,
) -> bool {
    let mut pending = Vec::new();
    while let Ok(action) = action_rx.try_recv() {
        pending.push(action);
    }
    if pending.is_empty() {
        return false;
    }

    for command in apply_actions(app, pending) {
        executor.execute(command);
    }
    true
}
