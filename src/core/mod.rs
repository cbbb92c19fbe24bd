pub mod app;
pub mod config;
pub mod context;
pub mod history;
pub mod i18n;
pub mod message;
pub mod providers;
