use super::{FromLine, MessageParseError};
use regex::{Captures, Regex};

/// Sent when the server is about to restart.
///
/// The client should reconnect and rejoin its channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reconnect;

impl FromLine for Reconnect {
  fn pattern() -> &'static Regex {
    pattern!(r"^:tmi\.twitch\.tv\sRECONNECT$")
  }

  fn from_captures(_: &Captures<'_>) -> Result<Self, MessageParseError> {
    Ok(Reconnect)
  }
}

impl_into_message!(Reconnect);
