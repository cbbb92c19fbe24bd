//! The chat session controller.
//!
//! [`App`] owns every piece of UI state: the transcript, the transcript view,
//! the input box and the in-flight presentation. It is only ever mutated from
//! the event loop; background tasks talk to it through [`actions`].

pub mod actions;
mod conversation;
mod settings;

#[cfg(test)]
mod tests;

use chrono::{DateTime, Local};
use tui_textarea::TextArea;

use crate::core::context::AppContext;
use crate::core::history::TranscriptStore;
use crate::core::i18n::Language;
use crate::core::message::Transcript;
use crate::core::providers::ProviderId;
use crate::ui::chat_view::ChatView;
use crate::ui::math::{MathRenderer, UnicodeMathRenderer};
use crate::ui::presenter::Presentation;
use crate::ui::theme::Theme;

pub use actions::{apply_action, apply_actions, AppAction, AppActionDispatcher, AppCommand};
pub use conversation::RequestParams;

/// Where the current exchange is. Input is accepted in `Idle` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    Idle,
    Sending,
    AwaitingResponse,
    Presenting,
}

impl ChatPhase {
    pub fn accepts_input(self) -> bool {
        self == ChatPhase::Idle
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Help,
    History(String),
}

/// Command-line overrides applied on top of the saved config.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppOptions {
    pub provider: Option<ProviderId>,
    pub typing_effect: Option<bool>,
}

pub struct App {
    pub(crate) context: AppContext,
    pub(crate) provider: ProviderId,
    pub(crate) language: Language,
    pub(crate) theme: Theme,
    pub(crate) typing_effect: bool,
    pub(crate) transcript: Transcript,
    pub view: ChatView,
    pub input: TextArea<'static>,
    pub(crate) phase: ChatPhase,
    pub(crate) presentation: Option<Presentation>,
    pub(crate) store: TranscriptStore,
    pub(crate) overlay: Option<Overlay>,
    pub overlay_scroll: u16,
    pub(crate) status: Option<String>,
    pub(crate) exit_requested: bool,
    pub(crate) next_request_id: u64,
    pub(crate) pending_request: Option<u64>,
    pub(crate) renderer: Box<dyn MathRenderer>,
}

impl App {
    pub fn new(context: AppContext, options: AppOptions, started_at: DateTime<Local>) -> Self {
        let config = context.config();
        let theme = Theme::from_name(config.theme_name()).unwrap_or_else(Theme::dark_default);
        let history_dir = context.history_dir();
        let view = ChatView::new(theme.clone(), config.syntax_enabled());

        Self {
            provider: options.provider.unwrap_or_else(|| config.default_provider()),
            language: config.language(),
            typing_effect: options
                .typing_effect
                .unwrap_or_else(|| config.typing_effect()),
            theme,
            transcript: Transcript::new(),
            view,
            input: TextArea::default(),
            phase: ChatPhase::Idle,
            presentation: None,
            store: TranscriptStore::new(history_dir, started_at),
            overlay: None,
            overlay_scroll: 0,
            status: None,
            exit_requested: false,
            next_request_id: 0,
            pending_request: None,
            renderer: Box::new(UnicodeMathRenderer),
            context,
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn typing_effect(&self) -> bool {
        self.typing_effect
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn store(&self) -> &TranscriptStore {
        &self.store
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Current contents of the input box, lines joined with `\n`.
    pub fn input_text(&self) -> String {
        self.input.lines().join("\n")
    }

    pub fn clear_input(&mut self) {
        self.input = TextArea::default();
    }

    pub fn open_help(&mut self) {
        self.overlay = Some(Overlay::Help);
        self.overlay_scroll = 0;
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
        self.overlay_scroll = 0;
    }

    pub fn scroll_up(&mut self, rows: u16) {
        if self.overlay.is_some() {
            self.overlay_scroll = self.overlay_scroll.saturating_sub(rows);
        } else {
            self.view.scroll_up(rows as usize);
        }
    }

    pub fn scroll_down(&mut self, rows: u16) {
        if self.overlay.is_some() {
            self.overlay_scroll = self.overlay_scroll.saturating_add(rows);
        } else {
            self.view.scroll_down(rows as usize);
        }
    }
}
