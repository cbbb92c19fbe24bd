use std::error::Error;
use std::io::Write;

use tracing::info;

use crate::core::context::AppContext;
use crate::core::message::{Message, Sender};
use crate::core::providers::ProviderId;
use crate::ui::math::UnicodeMathRenderer;
use crate::ui::presenter::{present, PlainTextSurface};

/// Ask `provider` (or the configured default) once and print the rendered
/// reply. Returns whether the provider actually answered.
pub async fn run<W: Write>(
    context: &AppContext,
    provider: Option<ProviderId>,
    prompt: &str,
    out: &mut W,
) -> Result<bool, Box<dyn Error>> {
    let provider = provider.unwrap_or_else(|| context.config().default_provider());
    let client = context
        .client(provider)
        .ok_or_else(|| format!("no client for {provider}"))?;

    info!(%provider, "one-shot request");
    let reply = client.get_response(prompt).await;
    let answered = reply.is_answer();
    let sender = if answered {
        Sender::Assistant(provider)
    } else {
        Sender::Error
    };

    let mut surface = PlainTextSurface::new();
    present(
        &Message::new(sender, reply.text),
        &UnicodeMathRenderer,
        context.config().language(),
        &mut surface,
    );
    out.write_all(surface.as_str().as_bytes())?;
    out.flush()?;
    Ok(answered)
}
