use super::{group, FromLine, MessageParseError};
use regex::{Captures, Regex};

/// Sent by the server to check that the connection is still alive.
///
/// Must be answered with a `PONG`, see [`Client::pong`][crate::Client::pong].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ping {
  /// The server which sent the ping, usually `tmi.twitch.tv`.
  pub server: String,
}

impl FromLine for Ping {
  fn pattern() -> &'static Regex {
    pattern!(r"^PING\s:(?P<server>\S+)$")
  }

  fn from_captures(captures: &Captures<'_>) -> Result<Self, MessageParseError> {
    Ok(Ping {
      server: group(captures, "server").into(),
    })
  }
}

impl_into_message!(Ping);
