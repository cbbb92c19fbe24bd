//! Non-interactive settings commands: API keys and the provider listing.

use std::error::Error;
use std::io::{BufRead, Write};

use crate::core::config::path_display;
use crate::core::context::AppContext;
use crate::core::providers::ProviderId;

/// Prompt on `prompt` and read one line from `input`.
pub fn read_key<R: BufRead, W: Write>(
    provider: ProviderId,
    input: &mut R,
    prompt: &mut W,
) -> Result<String, Box<dyn Error>> {
    write!(prompt, "{} API key: ", provider.display_name())?;
    prompt.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    let key = line.trim();
    if key.is_empty() {
        return Err("no API key entered".into());
    }
    Ok(key.to_string())
}

pub fn set_key<W: Write>(
    context: &mut AppContext,
    provider: ProviderId,
    key: &str,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    let key = key.trim();
    if key.is_empty() {
        return Err(
            format!("empty API key; use 'palaver unset-key {provider}' to remove it").into(),
        );
    }
    context.save_settings(|config| config.set_api_key(provider, key))?;
    writeln!(
        out,
        "✅ {} API key saved to {}",
        provider.display_name(),
        path_display(context.config_path())
    )?;
    Ok(())
}

pub fn unset_key<W: Write>(
    context: &mut AppContext,
    provider: ProviderId,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    if context.config().api_key(provider).is_none() {
        writeln!(out, "No {} API key was set", provider.display_name())?;
        return Ok(());
    }
    context.save_settings(|config| config.set_api_key(provider, ""))?;
    writeln!(out, "✅ {} API key removed", provider.display_name())?;
    Ok(())
}

pub fn list_providers<W: Write>(context: &AppContext, out: &mut W) -> Result<(), Box<dyn Error>> {
    let config = context.config();
    let default = config.default_provider();

    writeln!(out, "{:<10} {:<12} {:<20} {:<4} URL", "ID", "NAME", "MODEL", "KEY")?;
    for id in ProviderId::ALL {
        let provider = config.provider_config(id);
        let marker = if id == default { "*" } else { "" };
        let key = if provider.is_configured() { "✅" } else { "❌" };
        writeln!(
            out,
            "{:<10} {:<12} {:<20} {:<4} {}",
            format!("{}{marker}", id.as_str()),
            id.display_name(),
            provider.model,
            key,
            provider.base_url
        )?;
    }
    writeln!(out, "\n* = default provider")?;
    Ok(())
}
