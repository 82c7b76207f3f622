use super::{group, FromLine, MessageParseError};
use regex::{Captures, Regex};

/// Sent when a user joins a channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Join {
  /// Joined channel name.
  pub channel: String,

  /// Login of the user.
  pub user: String,
}

impl FromLine for Join {
  fn pattern() -> &'static Regex {
    pattern!(r"^:(?P<user>\S+)!\S+@\S+\.tmi\.twitch\.tv\sJOIN\s#?(?P<channel>\S+)")
  }

  fn from_captures(captures: &Captures<'_>) -> Result<Self, MessageParseError> {
    Ok(Join {
      channel: group(captures, "channel").into(),
      user: group(captures, "user").into(),
    })
  }
}

impl_into_message!(Join);
