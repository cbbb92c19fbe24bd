//! Background work requested by the controller: provider calls and the
//! typewriter ticker. Both report back through the action queue only.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::core::app::{AppAction, AppActionDispatcher, AppCommand, RequestParams};

pub struct CommandExecutor {
    dispatcher: AppActionDispatcher,
    typewriter: Option<CancellationToken>,
}

impl CommandExecutor {
    pub fn new(dispatcher: AppActionDispatcher) -> Self {
        Self {
            dispatcher,
            typewriter: None,
        }
    }

    pub fn execute(&mut self, command: AppCommand) {
        match command {
            AppCommand::SpawnRequest(params) => {
                spawn_provider_request(self.dispatcher.clone(), params);
            }
            AppCommand::StartTypewriter { interval } => {
                self.stop_typewriter();
                let token = CancellationToken::new();
                spawn_typewriter(self.dispatcher.clone(), token.clone(), interval);
                self.typewriter = Some(token);
            }
            AppCommand::StopTypewriter => self.stop_typewriter(),
        }
    }

    pub fn stop_typewriter(&mut self) {
        if let Some(token) = self.typewriter.take() {
            token.cancel();
        }
    }
}

impl Drop for CommandExecutor {
    fn drop(&mut self) {
        self.stop_typewriter();
    }
}

/// Call the provider on its own task. A panic inside the client surfaces as
/// an `Err` reply instead of taking the loop down.
pub fn spawn_provider_request(
    dispatcher: AppActionDispatcher,
    params: RequestParams,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let RequestParams {
            request_id,
            provider,
            client,
            message,
        } = params;
        dispatcher.dispatch(AppAction::RequestStarted { request_id });

        let call = tokio::spawn(async move { client.get_response(&message).await });
        let reply = match call.await {
            Ok(reply) => Ok(reply),
            Err(err) => {
                error!(request_id, %provider, error = %err, "provider task failed");
                Err(format!("provider task failed: {err}"))
            }
        };
        debug!(request_id, "dispatching provider reply");
        dispatcher.dispatch(AppAction::ResponseReceived {
            request_id,
            provider,
            reply,
        });
    })
}

pub fn spawn_typewriter(
    dispatcher: AppActionDispatcher,
    token: CancellationToken,
    interval: Duration,
) -> JoinHandle<()> {
    let interval = interval.max(Duration::from_millis(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    if !dispatcher.dispatch(AppAction::TypewriterTick) {
                        break;
                    }
                }
            }
        }
    })
}
