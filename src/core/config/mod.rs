pub mod data;
pub mod io;

pub use data::{path_display, Config, ProviderConfig, ProviderOverride};
pub use io::{default_config_path, ConfigError};
