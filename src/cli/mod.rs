//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod history;
pub mod say;
pub mod settings;

use std::error::Error;
use std::io;
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::core::app::AppOptions;
use crate::core::context::AppContext;
use crate::core::providers::ProviderId;
use crate::logging::{init_tracing, LogTarget};
use crate::ui::chat_loop::run_chat;

#[derive(Parser)]
#[command(name = "palaver", version)]
#[command(about = "A terminal chat client for DeepSeek, OpenAI and Claude")]
#[command(
    long_about = "Palaver is a full-screen terminal chat client. Replies are rendered with \
headings, lists, highlighted code blocks and Unicode-typeset math, and are typed out as \
they arrive.\n\n\
Providers:\n\
  deepseek          DeepSeek AI\n\
  openai            ChatGPT\n\
  claude            Claude\n\n\
Set a key with 'palaver set-key <provider>' or '/key <provider> <key>' inside the chat.\n\n\
Controls:\n\
  Enter             Send the message\n\
  Alt+Enter         Insert a newline\n\
  Esc               Skip the typing effect / close an overlay\n\
  PgUp/PgDn/Mouse   Scroll the transcript\n\
  F1..F5            Help, provider, history, theme, language\n\
  Ctrl+C            Quit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat {
        /// Provider to start with
        #[arg(short = 'p', long, value_name = "PROVIDER")]
        provider: Option<ProviderId>,
        /// Show replies at once instead of typing them out
        #[arg(long)]
        no_typing: bool,
    },
    /// Send one message and print the rendered reply
    Say {
        /// Provider to ask (defaults to the configured one)
        #[arg(short = 'p', long, value_name = "PROVIDER")]
        provider: Option<ProviderId>,
        /// The message
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Print the most recent saved transcripts
    History {
        /// How many transcripts to show
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Store an API key (read from stdin when omitted)
    SetKey {
        provider: ProviderId,
        key: Option<String>,
    },
    /// Remove a stored API key
    UnsetKey { provider: ProviderId },
    /// List providers, their models and whether a key is set
    Providers,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let command = args.command.unwrap_or(Commands::Chat {
        provider: None,
        no_typing: false,
    });

    // The chat owns the terminal, so it logs to a file.
    let target = match command {
        Commands::Chat { .. } => LogTarget::File,
        _ => LogTarget::Stderr,
    };
    init_tracing(args.verbose, target);

    tokio::runtime::Runtime::new()?.block_on(async_main(command, args.config))
}

async fn async_main(command: Commands, config: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let mut context = AppContext::load(config)?;

    match command {
        Commands::Chat {
            provider,
            no_typing,
        } => {
            let options = AppOptions {
                provider,
                typing_effect: no_typing.then_some(false),
            };
            run_chat(context, options).await
        }
        Commands::Say { provider, prompt } => {
            let answered =
                say::run(&context, provider, &prompt.join(" "), &mut io::stdout()).await?;
            if !answered {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::History { limit } => history::show(&context, limit, &mut io::stdout()),
        Commands::SetKey { provider, key } => {
            let key = match key {
                Some(key) => key,
                None => settings::read_key(provider, &mut io::stdin().lock(), &mut io::stderr())?,
            };
            settings::set_key(&mut context, provider, &key, &mut io::stdout())
        }
        Commands::UnsetKey { provider } => {
            settings::unset_key(&mut context, provider, &mut io::stdout())
        }
        Commands::Providers => settings::list_providers(&context, &mut io::stdout()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_chat() {
        let args = Args::try_parse_from(["palaver"]).unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn chat_flags_parse() {
        let args = Args::try_parse_from(["palaver", "-vv", "chat", "-p", "claude", "--no-typing"])
            .unwrap();
        assert_eq!(args.verbose, 2);
        match args.command {
            Some(Commands::Chat {
                provider,
                no_typing,
            }) => {
                assert_eq!(provider, Some(ProviderId::Claude));
                assert!(no_typing);
            }
            _ => panic!("expected chat"),
        }
    }

    #[test]
    fn say_collects_the_whole_prompt() {
        let args = Args::try_parse_from([
            "palaver",
            "--config",
            "/tmp/p.toml",
            "say",
            "what",
            "is",
            "-1?",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/tmp/p.toml")));
        match args.command {
            Some(Commands::Say { provider, prompt }) => {
                assert_eq!(provider, None);
                assert_eq!(prompt, vec!["what", "is", "-1?"]);
            }
            _ => panic!("expected say"),
        }
    }

    #[test]
    fn unknown_provider_is_rejected() {
        assert!(Args::try_parse_from(["palaver", "set-key", "bard", "x"]).is_err());
        assert!(Args::try_parse_from(["palaver", "set-key", "openai", "sk-1"]).is_ok());
    }
}
