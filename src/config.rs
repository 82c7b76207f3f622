//! Bot configuration, loaded from a TOML file.
//!
//! ```toml
//! [irc]
//! nick = "archiemate"
//! token = "oauth:..."   # or set TMI_BOT_TOKEN
//! tls = true            # optional, host and port are optional too
//!
//! [bot]                 # optional
//! commands_url = "https://example.com/commands"
//! cache_max_age_secs = 3600
//! cache_prune_interval_secs = 60
//! ```

use crate::bot::{DEFAULT_CACHE_MAX_AGE, DEFAULT_CACHE_PRUNE_INTERVAL, DEFAULT_COMMANDS_URL};
use crate::client::{self, Credentials, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TLS_PORT};
use serde::Deserialize;
use std::fmt::Display;
use std::io;
use std::path::Path;
use std::time::Duration;

/// Environment variable which overrides `irc.token`.
pub const TOKEN_ENV: &str = "TMI_BOT_TOKEN";

#[derive(Clone, Debug, Deserialize)]
pub struct BotConfig {
  pub irc: IrcConfig,

  #[serde(default)]
  pub bot: BotSettings,
}

#[derive(Clone, Deserialize)]
pub struct IrcConfig {
  pub nick: String,

  #[serde(default)]
  pub token: Option<String>,

  #[serde(default)]
  pub host: Option<String>,

  /// Defaults to 6697 with TLS, and 6667 without.
  #[serde(default)]
  pub port: Option<u16>,

  #[serde(default)]
  pub tls: bool,
}

impl std::fmt::Debug for IrcConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("IrcConfig")
      .field("nick", &self.nick)
      .field("token", &self.token.as_ref().map(|_| "(hidden)"))
      .field("host", &self.host)
      .field("port", &self.port)
      .field("tls", &self.tls)
      .finish()
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BotSettings {
  pub commands_url: String,
  pub cache_max_age_secs: u64,
  pub cache_prune_interval_secs: u64,
}

impl Default for BotSettings {
  fn default() -> Self {
    Self {
      commands_url: DEFAULT_COMMANDS_URL.into(),
      cache_max_age_secs: DEFAULT_CACHE_MAX_AGE.as_secs(),
      cache_prune_interval_secs: DEFAULT_CACHE_PRUNE_INTERVAL.as_secs(),
    }
  }
}

impl BotSettings {
  pub fn cache_max_age(&self) -> Duration {
    Duration::from_secs(self.cache_max_age_secs)
  }

  pub fn cache_prune_interval(&self) -> Duration {
    Duration::from_secs(self.cache_prune_interval_secs)
  }
}

impl BotConfig {
  /// Read the config at `path`, then apply [`TOKEN_ENV`] if it is set.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    trace!(path = %path.display(), "loading config");
    let src = std::fs::read_to_string(path)?;
    Self::parse(&src)?.with_token(std::env::var(TOKEN_ENV).ok())
  }

  pub fn parse(src: &str) -> Result<Self, ConfigError> {
    let config: Self = toml::from_str(src)?;
    if config.bot.cache_prune_interval_secs == 0 {
      return Err(ConfigError::Invalid {
        field: "bot.cache_prune_interval_secs",
        reason: "must be at least 1",
      });
    }
    Ok(config)
  }

  /// Replace the token if `token` is set. Fails if there is no token either way.
  pub fn with_token(mut self, token: Option<String>) -> Result<Self, ConfigError> {
    if let Some(token) = token.filter(|t| !t.is_empty()) {
      self.irc.token = Some(token);
    }
    match &self.irc.token {
      Some(token) if !token.is_empty() => Ok(self),
      _ => Err(ConfigError::MissingToken),
    }
  }

  pub fn credentials(&self) -> Credentials {
    Credentials::new(&self.irc.nick, self.irc.token.as_deref().unwrap_or_default())
  }

  /// Connection config for [`Client::connect`][crate::Client::connect].
  pub fn client(&self) -> client::Config {
    let default_port = if self.irc.tls {
      DEFAULT_TLS_PORT
    } else {
      DEFAULT_PORT
    };
    client::Config {
      host: self.irc.host.clone().unwrap_or_else(|| DEFAULT_HOST.into()),
      port: self.irc.port.unwrap_or(default_port),
      tls: self.irc.tls,
      ..client::Config::new(self.credentials())
    }
  }
}

/// Failed to load the config.
#[derive(Debug)]
pub enum ConfigError {
  /// Failed to read the file.
  Io(io::Error),

  /// The file is not valid TOML, or does not have the expected shape.
  Parse(toml::de::Error),

  /// No token in the file, and none in the environment.
  MissingToken,

  /// A setting has a value which cannot be used.
  Invalid {
    field: &'static str,
    reason: &'static str,
  },
}

impl From<io::Error> for ConfigError {
  fn from(value: io::Error) -> Self {
    Self::Io(value)
  }
}

impl From<toml::de::Error> for ConfigError {
  fn from(value: toml::de::Error) -> Self {
    Self::Parse(value)
  }
}

impl Display for ConfigError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ConfigError::Io(e) => write!(f, "failed to read config: {e}"),
      ConfigError::Parse(e) => write!(f, "failed to parse config: {e}"),
      ConfigError::MissingToken => write!(f, "missing token, set `irc.token` or {TOKEN_ENV}"),
      ConfigError::Invalid { field, reason } => write!(f, "invalid `{field}`: {reason}"),
    }
  }
}

impl std::error::Error for ConfigError {}
