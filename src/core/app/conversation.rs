use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::{App, AppCommand, ChatPhase};
use crate::core::message::{Message, Sender};
use crate::core::providers::{ProviderClient, ProviderId, ProviderReply};
use crate::ui::presenter::{present, render_plain, PresentStatus, Presentation};

/// Everything the request executor needs to call a provider off the event
/// loop.
pub struct RequestParams {
    pub request_id: u64,
    pub provider: ProviderId,
    pub client: Arc<dyn ProviderClient>,
    pub message: String,
}

impl App {
    /// Take the input box contents: slash commands are handled locally,
    /// anything else is sent to the current provider.
    pub fn submit_input(&mut self) -> Option<AppCommand> {
        if !self.phase.accepts_input() {
            debug!(phase = ?self.phase, "input submitted while busy; ignored");
            return None;
        }
        let text = self.input_text();
        if text.trim().is_empty() {
            return None;
        }
        self.clear_input();
        if text.trim_start().starts_with('/') {
            self.process_command(text.trim());
            return None;
        }
        self.submit_message(text)
    }

    /// Append `text` as a user message and ask the current provider for a
    /// reply. Refused unless idle.
    pub fn submit_message(&mut self, text: String) -> Option<AppCommand> {
        if !self.phase.accepts_input() {
            debug!(phase = ?self.phase, "submission ignored while busy");
            return None;
        }
        if text.trim().is_empty() {
            return None;
        }

        self.clear_status();
        let message = Message::new(Sender::User, text.clone());
        present(&message, self.renderer.as_ref(), self.language, &mut self.view);
        self.transcript.push(message);

        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.pending_request = Some(request_id);
        self.phase = ChatPhase::Sending;
        info!(request_id, provider = %self.provider, "sending message");

        match self.context.client(self.provider) {
            Some(client) => Some(AppCommand::SpawnRequest(RequestParams {
                request_id,
                provider: self.provider,
                client,
                message: text,
            })),
            None => {
                let reply = ProviderReply::failed(self.language, "no client for provider");
                self.receive_reply(request_id, self.provider, Ok(reply))
            }
        }
    }

    /// The request task picked the work up.
    pub fn mark_request_in_flight(&mut self, request_id: u64) {
        if self.pending_request == Some(request_id) && self.phase == ChatPhase::Sending {
            self.phase = ChatPhase::AwaitingResponse;
        }
    }

    /// Present a provider reply. `Err` means the request task itself died.
    pub fn receive_reply(
        &mut self,
        request_id: u64,
        provider: ProviderId,
        reply: Result<ProviderReply, String>,
    ) -> Option<AppCommand> {
        if self.pending_request != Some(request_id) {
            warn!(request_id, "reply for a request that is no longer pending");
            return None;
        }
        self.pending_request = None;

        let message = match reply {
            Ok(reply) if reply.is_answer() => Message::new(Sender::Assistant(provider), reply.text),
            Ok(reply) => Message::new(Sender::Error, reply.text),
            Err(detail) => {
                warn!(request_id, error = %detail, "provider task failed");
                Message::new(Sender::Error, self.language.strings().error_text(&detail))
            }
        };
        debug!(request_id, sender = ?message.sender, "reply received");

        let mut presentation = Presentation::for_message(
            &message,
            self.renderer.as_ref(),
            self.typing_effect,
            self.language,
        );
        let typed = self.typing_effect && message.sender.is_assistant();
        self.transcript.push(message);
        self.phase = ChatPhase::Presenting;

        if typed {
            self.presentation = Some(presentation);
            let interval = Duration::from_millis(self.context.config().typing_interval_ms());
            Some(AppCommand::StartTypewriter { interval })
        } else {
            presentation.finish(&mut self.view);
            self.complete_exchange();
            None
        }
    }

    /// Reveal the next few graphemes of the message being typed.
    pub fn typewriter_tick(&mut self) -> Option<AppCommand> {
        let Some(presentation) = self.presentation.as_mut() else {
            return Some(AppCommand::StopTypewriter);
        };
        let budget = self.context.config().chars_per_tick();
        match presentation.advance(&mut self.view, budget) {
            PresentStatus::InProgress => None,
            PresentStatus::Complete => {
                self.presentation = None;
                self.complete_exchange();
                Some(AppCommand::StopTypewriter)
            }
        }
    }

    /// Show the rest of the message being typed at once.
    pub fn skip_typewriter(&mut self) -> Option<AppCommand> {
        let mut presentation = self.presentation.take()?;
        presentation.finish(&mut self.view);
        self.complete_exchange();
        Some(AppCommand::StopTypewriter)
    }

    /// Back to idle, then rewrite the session file with the whole transcript.
    fn complete_exchange(&mut self) {
        self.phase = ChatPhase::Idle;
        self.persist_transcript();
    }

    pub(crate) fn persist_transcript(&mut self) {
        let contents = render_plain(&self.transcript, self.renderer.as_ref(), self.language);
        if let Err(err) = self.store.save(&contents) {
            warn!(error = %err, "failed to persist transcript");
            self.status = Some(format!("{}: {}", self.language.strings().save_failed, err));
        }
    }

    /// Post a System message immediately.
    pub(crate) fn post_system(&mut self, text: impl Into<String>) {
        let message = Message::new(Sender::System, text);
        present(&message, self.renderer.as_ref(), self.language, &mut self.view);
        self.transcript.push(message);
    }
}
