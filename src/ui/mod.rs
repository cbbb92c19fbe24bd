pub mod chat_loop;
pub mod chat_view;
pub mod markdown;
pub mod math;
pub mod presenter;
pub mod renderer;
pub mod theme;
