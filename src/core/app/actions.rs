use std::time::Duration;

use tokio::sync::mpsc;

use super::{App, RequestParams};
use crate::core::providers::{ProviderId, ProviderReply};

pub enum AppAction {
    SubmitInput,
    SubmitMessage {
        message: String,
    },
    ProcessCommand {
        input: String,
    },
    RequestStarted {
        request_id: u64,
    },
    ResponseReceived {
        request_id: u64,
        provider: ProviderId,
        reply: Result<ProviderReply, String>,
    },
    TypewriterTick,
    SkipTypewriter,
    CycleProvider,
    ToggleTheme,
    ToggleLanguage,
    ShowHelp,
    ShowHistory,
    CloseOverlay,
    ScrollUp {
        rows: u16,
    },
    ScrollDown {
        rows: u16,
    },
    Quit,
}

/// Cloneable sender half of the action queue. Background tasks hold one.
#[derive(Clone)]
pub struct AppActionDispatcher {
    tx: mpsc::UnboundedSender<AppAction>,
}

impl AppActionDispatcher {
    pub fn new(tx: mpsc::UnboundedSender<AppAction>) -> Self {
        Self { tx }
    }

    /// Returns false once the event loop has gone away.
    pub fn dispatch(&self, action: AppAction) -> bool {
        self.tx.send(action).is_ok()
    }

    pub fn dispatch_many<I>(&self, actions: I)
    where
        I: IntoIterator<Item = AppAction>,
    {
        for action in actions {
            let _ = self.tx.send(action);
        }
    }
}

/// Side effects the event loop carries out on the controller's behalf.
pub enum AppCommand {
    SpawnRequest(RequestParams),
    StartTypewriter { interval: Duration },
    StopTypewriter,
}

pub fn apply_actions(
    app: &mut App,
    actions: impl IntoIterator<Item = AppAction>,
) -> Vec<AppCommand> {
    let mut commands = Vec::new();
    for action in actions {
        if let Some(cmd) = apply_action(app, action) {
            commands.push(cmd);
        }
    }
    commands
}

pub fn apply_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::SubmitInput => app.submit_input(),
        AppAction::SubmitMessage { message } => app.submit_message(message),
        AppAction::ProcessCommand { input } => {
            app.process_command(&input);
            None
        }
        AppAction::RequestStarted { request_id } => {
            app.mark_request_in_flight(request_id);
            None
        }
        AppAction::ResponseReceived {
            request_id,
            provider,
            reply,
        } => app.receive_reply(request_id, provider, reply),
        AppAction::TypewriterTick => app.typewriter_tick(),
        AppAction::SkipTypewriter => app.skip_typewriter(),
        AppAction::CycleProvider => {
            app.cycle_provider();
            None
        }
        AppAction::ToggleTheme => {
            app.toggle_theme();
            None
        }
        AppAction::ToggleLanguage => {
            app.toggle_language();
            None
        }
        AppAction::ShowHelp => {
            app.open_help();
            None
        }
        AppAction::ShowHistory => {
            app.open_history();
            None
        }
        AppAction::CloseOverlay => {
            app.close_overlay();
            None
        }
        AppAction::ScrollUp { rows } => {
            app.scroll_up(rows);
            None
        }
        AppAction::ScrollDown { rows } => {
            app.scroll_down(rows);
            None
        }
        AppAction::Quit => {
            app.request_exit();
            None
        }
    }
}
