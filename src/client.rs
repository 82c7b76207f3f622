//! ## Twitch IRC Client
//!
//! This is the main interface for interacting with Twitch IRC.
//! The entrypoint to this module is the [`Client`].
//!
//! [`Client::connect`] opens a connection and performs the handshake:
//! - `PASS` and `NICK`, followed by the fixed welcome sequence,
//! - capability negotiation,
//! - joining the bot's own channel.
//!
//! [`Client::connect_with_backoff`] retries that whole sequence until it succeeds.
//!
//! The client also owns the set of active channels. [`Client::join`] and [`Client::part`]
//! are idempotent, and [`Client::privmsg`] silently drops messages to channels
//! which are not active.

pub mod conn;
pub mod read;
pub mod util;
pub mod write;

use self::conn::{OpenStreamError, Stream};
use self::read::{ReadStream, RecvError};
use self::write::{WriteError, WriteStream};
use crate::msg::{CapabilityAcknowledge, FromLine, MessageParseError};
use futures_util::StreamExt;
use rand::{thread_rng, Rng};
use std::collections::HashSet;
use std::fmt::Display;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::LinesStream;
use util::Timeout;

/// Credentials used to authenticate to Twitch IRC.
///
/// The [`Default`] impl uses [`Credentials::anon`].
#[derive(Clone)]
pub struct Credentials {
  /// The _login_ of the user.
  pub nick: String,

  /// The oauth2 token, with or without the `oauth:` prefix.
  pub pass: String,
}

impl Credentials {
  const ANON_RANGE: std::ops::Range<u32> = 10000..99999;

  /// Instantiate credentials from a `nick` and `pass`.
  pub fn new(nick: impl ToString, pass: impl ToString) -> Self {
    Self {
      nick: nick.to_string(),
      pass: pass.to_string(),
    }
  }

  /// An anonymous login.
  ///
  /// Twitch allows logging in using any username in the form `justinfan?????`
  /// where `?` is any digit. Anonymous users can read chat, but not send messages.
  pub fn anon() -> Self {
    Self {
      pass: "just_a_lil_guy".into(),
      nick: format!("justinfan{}", thread_rng().gen_range(Self::ANON_RANGE)),
    }
  }

  pub fn is_anon(&self) -> bool {
    let Some(digits) = self.nick.strip_prefix("justinfan") else {
      return false;
    };
    let Some(digits) = digits.parse::<u32>().ok() else {
      return false;
    };
    Self::ANON_RANGE.contains(&digits)
  }

  fn token(&self) -> &str {
    self.pass.strip_prefix("oauth:").unwrap_or(&self.pass)
  }
}

impl Default for Credentials {
  fn default() -> Self {
    Self::anon()
  }
}

impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Credentials")
      .field("nick", &self.nick)
      .finish_non_exhaustive()
  }
}

/// The default host of Twitch IRC.
pub const DEFAULT_HOST: &str = "irc.chat.twitch.tv";

/// The default plaintext port.
pub const DEFAULT_PORT: u16 = 6667;

/// The default TLS port.
pub const DEFAULT_TLS_PORT: u16 = 6697;

/// The default timeout used when connecting to Twitch IRC.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The default time [`Client::recv`] waits for a line before giving up.
pub const DEFAULT_IDLE: Duration = Duration::from_secs(1);

/// Client configuration.
#[derive(Clone, Debug)]
pub struct Config {
  /// Credentials to use when logging in to Twitch IRC.
  pub credentials: Credentials,

  pub host: String,

  pub port: u16,

  /// Whether to wrap the connection in TLS.
  pub tls: bool,

  /// Upper bound for opening the connection, and separately for the handshake.
  pub timeout: Duration,

  /// How long [`Client::recv`] waits for a line.
  pub idle: Duration,
}

impl Config {
  /// Instantiate a config from some `credentials`, using defaults for everything else.
  pub fn new(credentials: Credentials) -> Self {
    Self {
      credentials,
      host: DEFAULT_HOST.into(),
      port: DEFAULT_PORT,
      tls: false,
      timeout: DEFAULT_TIMEOUT,
      idle: DEFAULT_IDLE,
    }
  }
}

impl Default for Config {
  fn default() -> Self {
    Self::new(Credentials::default())
  }
}

/// Reconnect backoff configuration.
#[derive(Clone, Copy, Debug)]
pub struct Backoff {
  /// The maximum number of retries to make. [`None`] retries forever.
  pub max_tries: Option<u64>,

  /// Before attempting the first retry, the client will wait this long.
  pub initial_delay: Duration,

  /// After each failed attempt, the delay will be multiplied by this value.
  pub delay_multiplier: u32,

  /// The maximum delay to wait inbetween connection attempts.
  pub max_delay: Option<Duration>,
}

/// The default reconnect backoff: unbounded, starting at one second and doubling.
pub const DEFAULT_BACKOFF: Backoff = Backoff {
  max_tries: None,
  initial_delay: Duration::from_secs(1),
  delay_multiplier: 2,
  max_delay: None,
};

impl Backoff {
  /// The delays to wait before each retry, in order.
  pub fn delays(&self) -> impl Iterator<Item = Duration> {
    let Backoff {
      max_tries,
      initial_delay,
      delay_multiplier,
      max_delay,
    } = *self;
    let cap = move |d: Duration| max_delay.map_or(d, |max| d.min(max));
    std::iter::successors(Some(cap(initial_delay)), move |d| {
      Some(cap(d.saturating_mul(delay_multiplier)))
    })
    .take(max_tries.map_or(usize::MAX, |n| n.try_into().unwrap_or(usize::MAX)))
  }
}

/// The capabilities requested during the handshake, in the order Twitch must acknowledge them.
pub const CAPABILITIES: [&str; 3] = [
  "twitch.tv/membership",
  "twitch.tv/tags",
  "twitch.tv/commands",
];

/// Progress of the connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
  Disconnected,
  Authenticating,
  CapabilityNegotiating,
  /// Only the bot's own channel is joined.
  SelfJoined,
  ChannelsJoined,
}

/// Twitch IRC client.
///
/// This interface provides:
/// - Connection handshake
/// - Reconnect with backoff
/// - Receiving and sending lines
/// - Tracking of active channels
///
/// It does not decode lines, see [`Message::parse`][crate::msg::Message::parse].
pub struct Client {
  reader: ReadStream,
  writer: WriteStream,

  config: Config,
  state: ConnectionState,
  channels: HashSet<String>,
}

impl Client {
  /// Attempts to connect once with the provided `config`.
  pub async fn connect(config: Config) -> Result<Client, ConnectError> {
    trace!(host = %config.host, port = config.port, tls = config.tls, "opening connection to twitch");
    let stream = conn::open(&config).timeout(config.timeout).await??;
    Client::from_stream(stream, config).await
  }

  /// Attempts to connect until it succeeds, sleeping between attempts according to `backoff`.
  ///
  /// The first attempt is made immediately. An error is only returned once
  /// [`Backoff::max_tries`] retries have failed.
  pub async fn connect_with_backoff(
    config: Config,
    backoff: &Backoff,
  ) -> Result<Client, ConnectError> {
    let mut delays = backoff.delays();
    loop {
      match Client::connect(config.clone()).await {
        Ok(client) => return Ok(client),
        Err(e) => {
          let Some(delay) = delays.next() else {
            return Err(e);
          };
          error!("{e}, retrying in {delay:?}");
          tokio::time::sleep(delay).await;
        }
      }
    }
  }

  /// Performs the handshake over an already open `stream`.
  pub async fn from_stream(stream: Stream, config: Config) -> Result<Client, ConnectError> {
    let (reader, writer) = split(stream);
    let timeout = config.timeout;
    let mut client = Client {
      reader,
      writer,
      config,
      state: ConnectionState::Disconnected,
      channels: HashSet::new(),
    };
    match client.handshake().timeout(timeout).await {
      Ok(Ok(())) => Ok(client),
      Ok(Err(e)) => Err(e),
      Err(_) => Err(ConnectError::Timeout),
    }
  }

  /// Replace the connection with a fresh one.
  ///
  /// All connection-scoped state is discarded, so the set of active channels is empty
  /// afterwards.
  pub async fn reconnect(&mut self, backoff: &Backoff) -> Result<(), ConnectError> {
    trace!("reconnecting");
    self.state = ConnectionState::Disconnected;
    *self = Client::connect_with_backoff(self.config.clone(), backoff).await?;
    Ok(())
  }

  async fn handshake(&mut self) -> Result<(), ConnectError> {
    trace!("performing handshake");
    self.state = ConnectionState::Authenticating;

    let nick = self.config.credentials.nick.clone();
    let token = self.config.credentials.token().to_owned();
    self.send(&format!("PASS oauth:{token}")).await?;
    self.send(&format!("NICK {nick}")).await?;

    trace!("waiting for welcome");
    for expected in util::welcome_lines(&nick) {
      let line = self.recv_now().await?;
      if line != expected {
        trace!(?line, ?expected, "unexpected welcome line");
        return Err(ConnectError::Auth(line));
      }
    }

    self.state = ConnectionState::CapabilityNegotiating;
    self
      .send(&format!("CAP REQ :{}", CAPABILITIES.join(" ")))
      .await?;

    trace!("waiting for CAP * ACK");
    let ack = loop {
      let line = self.recv_now().await?;
      match CapabilityAcknowledge::from_line(Some(&line))? {
        Some(ack) => break ack,
        None => trace!(?line, "discarding line received before CAP * ACK"),
      }
    };
    if ack.capabilities != CAPABILITIES {
      return Err(ConnectError::Capabilities(ack.capabilities));
    }

    self.send(&format!("JOIN #{nick}")).await?;
    self.state = ConnectionState::SelfJoined;
    trace!("connected");

    Ok(())
  }
}

impl Client {
  #[inline]
  pub fn config(&self) -> &Config {
    &self.config
  }

  #[inline]
  pub fn credentials(&self) -> &Credentials {
    &self.config.credentials
  }

  #[inline]
  pub fn state(&self) -> ConnectionState {
    self.state
  }

  /// Channels joined through [`Client::join`]. The bot's own channel is not included.
  pub fn channels(&self) -> impl Iterator<Item = &str> {
    self.channels.iter().map(String::as_str)
  }

  /// Whether messages may be sent to `channel`.
  ///
  /// The bot's own channel is always active.
  pub fn is_active(&self, channel: &str) -> bool {
    let channel = util::channel_name(channel);
    self.is_own(channel) || self.channels.contains(channel)
  }

  fn is_own(&self, channel: &str) -> bool {
    channel.eq_ignore_ascii_case(&self.config.credentials.nick)
  }
}

fn split(stream: Stream) -> (ReadStream, WriteStream) {
  let (reader, writer) = tokio::io::split(stream);

  (
    LinesStream::new(BufReader::new(reader).lines()).fuse(),
    writer,
  )
}

/// An error which occurred while attempting to connect to Twitch IRC.
#[derive(Debug)]
pub enum ConnectError {
  /// Failed to read from the stream.
  Read(RecvError),

  /// Failed to write to the stream.
  Write(WriteError),

  /// Failed to perform an IO operation on the stream.
  Io(io::Error),

  /// Failed to open a connection.
  Open(OpenStreamError),

  /// Failed to decode a line received during the handshake.
  Decode(MessageParseError),

  /// Connection timed out.
  Timeout,

  /// Twitch did not send the expected welcome sequence,
  /// which is what happens when the credentials are invalid.
  Auth(String),

  /// Twitch acknowledged a different set of capabilities than the one requested.
  Capabilities(Vec<String>),
}

impl ConnectError {
  /// Returns `true` if the server rejected the handshake.
  pub fn is_auth(&self) -> bool {
    matches!(self, Self::Auth(_) | Self::Capabilities(_))
  }
}

impl From<RecvError> for ConnectError {
  fn from(value: RecvError) -> Self {
    Self::Read(value)
  }
}

impl From<WriteError> for ConnectError {
  fn from(value: WriteError) -> Self {
    Self::Write(value)
  }
}

impl From<io::Error> for ConnectError {
  fn from(value: io::Error) -> Self {
    Self::Io(value)
  }
}

impl From<OpenStreamError> for ConnectError {
  fn from(value: OpenStreamError) -> Self {
    Self::Open(value)
  }
}

impl From<MessageParseError> for ConnectError {
  fn from(value: MessageParseError) -> Self {
    Self::Decode(value)
  }
}

impl From<tokio::time::error::Elapsed> for ConnectError {
  fn from(_: tokio::time::error::Elapsed) -> Self {
    Self::Timeout
  }
}

impl Display for ConnectError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ConnectError::Read(e) => write!(f, "failed to connect: {e}"),
      ConnectError::Write(e) => write!(f, "failed to connect: {e}"),
      ConnectError::Io(e) => write!(f, "failed to connect: {e}"),
      ConnectError::Open(e) => write!(f, "failed to connect: {e}"),
      ConnectError::Decode(e) => write!(f, "failed to connect: {e}"),
      ConnectError::Timeout => write!(f, "failed to connect: connection timed out"),
      ConnectError::Auth(line) => write!(
        f,
        "failed to connect: authentication failed, unexpected line `{line}`"
      ),
      ConnectError::Capabilities(caps) => write!(
        f,
        "failed to connect: unexpected capabilities acknowledged: {caps:?}"
      ),
    }
  }
}

impl std::error::Error for ConnectError {}

static_assert_send!(Client);
static_assert_sync!(Client);
