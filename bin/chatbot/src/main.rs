//! Runs the command bot.
//!
//! ```text,ignore
//! $ TMI_BOT_TOKEN=oauth:... cargo run -p chatbot -- --config chatbot.toml --channel wtii
//! ```

use anyhow::{Context as _, Result};
use clap::Parser;
use std::path::PathBuf;
use tmi_bot::config::BotConfig;
use tmi_bot::store::MemoryStore;
use tmi_bot::Bot;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version)]
struct Args {
  /// Path to the TOML config
  #[arg(long, default_value = "chatbot.toml")]
  config: PathBuf,

  /// Channels to join on startup
  #[arg(long)]
  channel: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let args = Args::parse();
  let config = BotConfig::load(&args.config)
    .with_context(|| format!("failed to load {}", args.config.display()))?;
  tracing::info!(nick = %config.irc.nick, "starting bot");

  let bot = Bot::new(config.credentials(), MemoryStore::new())
    .config(config.client())
    .commands_url(&config.bot.commands_url)
    .cache_settings(config.bot.cache_max_age(), config.bot.cache_prune_interval());

  let ctx = bot.context();
  for channel in args.channel {
    ctx.join(channel)?;
  }

  bot.run().await?;
  Ok(())
}
