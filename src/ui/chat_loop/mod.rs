//! The terminal side of the chat: setup and teardown, the event loop, key
//! handling and the background executors.

pub mod event_loop;
pub mod executors;
pub mod keybindings;
pub mod lifecycle;

pub use event_loop::run_chat;
