use super::{group, FromLine, MessageParseError};
use regex::{Captures, Regex};

/// Sent when a user leaves a channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Part {
  /// Parted channel name.
  pub channel: String,

  /// Login of the user.
  pub user: String,
}

impl FromLine for Part {
  fn pattern() -> &'static Regex {
    pattern!(r"^:(?P<user>\S+)!\S+@\S+\.tmi\.twitch\.tv\sPART\s#(?P<channel>\S+)")
  }

  fn from_captures(captures: &Captures<'_>) -> Result<Self, MessageParseError> {
    Ok(Part {
      channel: group(captures, "channel").into(),
      user: group(captures, "user").into(),
    })
  }
}

impl_into_message!(Part);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_part() {
    let part = decode!(Part, ":millocz!millocz@millocz.tmi.twitch.tv PART #wtii");
    assert_eq!(part.user, "millocz");
    assert_eq!(part.channel, "wtii");
  }

  #[test]
  fn reject_join() {
    assert!(!Part::matches(Some(":millocz!millocz@millocz.tmi.twitch.tv JOIN #wtii")).unwrap());
  }
}
