//! Terminal events to controller actions.
//!
//! Editing keys go straight to the input box; everything that changes the
//! session goes through an [`AppAction`].

use ratatui::crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};

use crate::core::app::{App, AppAction, ChatPhase};

const PAGE_ROWS: u16 = 10;
const WHEEL_ROWS: u16 = 3;

pub fn handle_event(app: &mut App, event: Event) -> Vec<AppAction> {
    match event {
        Event::Key(key) => handle_key(app, key),
        Event::Mouse(mouse) => handle_mouse(mouse),
        Event::Paste(text) => {
            if app.phase().accepts_input() && app.overlay().is_none() {
                app.input.insert_str(text);
            }
            Vec::new()
        }
        _ => Vec::new(),
    }
}

pub fn handle_key(app: &mut App, key: KeyEvent) -> Vec<AppAction> {
    if key.kind != KeyEventKind::Press {
        return Vec::new();
    }

    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('d'))
    {
        return vec![AppAction::Quit];
    }

    match key.code {
        KeyCode::F(1) => return vec![AppAction::ShowHelp],
        KeyCode::F(2) => return vec![AppAction::CycleProvider],
        KeyCode::F(3) => return vec![AppAction::ShowHistory],
        KeyCode::F(4) => return vec![AppAction::ToggleTheme],
        KeyCode::F(5) => return vec![AppAction::ToggleLanguage],
        KeyCode::PageUp => return vec![AppAction::ScrollUp { rows: PAGE_ROWS }],
        KeyCode::PageDown => return vec![AppAction::ScrollDown { rows: PAGE_ROWS }],
        _ => {}
    }

    if app.overlay().is_some() {
        return match key.code {
            KeyCode::Esc | KeyCode::Char('q') => vec![AppAction::CloseOverlay],
            KeyCode::Up => vec![AppAction::ScrollUp { rows: 1 }],
            KeyCode::Down => vec![AppAction::ScrollDown { rows: 1 }],
            _ => Vec::new(),
        };
    }

    if key.code == KeyCode::Esc {
        return match app.phase() {
            ChatPhase::Presenting => vec![AppAction::SkipTypewriter],
            _ => Vec::new(),
        };
    }

    if !app.phase().accepts_input() {
        return Vec::new();
    }

    match key.code {
        KeyCode::Enter
            if key
                .modifiers
                .intersects(KeyModifiers::ALT | KeyModifiers::SHIFT) =>
        {
            app.input.insert_newline();
            Vec::new()
        }
        KeyCode::Enter => vec![AppAction::SubmitInput],
        _ => {
            app.input.input(key);
            Vec::new()
        }
    }
}

fn handle_mouse(mouse: MouseEvent) -> Vec<AppAction> {
    match mouse.kind {
        MouseEventKind::ScrollUp => vec![AppAction::ScrollUp { rows: WHEEL_ROWS }],
        MouseEventKind::ScrollDown => vec![AppAction::ScrollDown { rows: WHEEL_ROWS }],
        _ => Vec::new(),
    }
}
