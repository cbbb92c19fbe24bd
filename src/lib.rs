//! Palaver is a terminal chat client for DeepSeek, OpenAI and Claude.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the chat session: messages and transcript, configuration,
//!   the provider clients, transcript history and the session controller.
//! - [`ui`] turns responses into something to look at: the markdown/math
//!   segmenter, the Unicode math typesetter, the typewriter presenter, and the
//!   terminal event loop that drives it all.
//! - [`api`] defines the request/response payloads sent to provider APIs.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod logging;
pub mod ui;
pub mod utils;
