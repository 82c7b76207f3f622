use super::{group, FromLine, MessageParseError};
use regex::{Captures, Regex};

/// Sent in response to a `CAP REQ`, listing the capabilities which were granted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapabilityAcknowledge {
  /// Granted capabilities, in the order they were listed.
  pub capabilities: Vec<String>,
}

impl FromLine for CapabilityAcknowledge {
  fn pattern() -> &'static Regex {
    pattern!(r"^:tmi\.twitch\.tv\sCAP\s\*\sACK\s:(?P<capabilities>.*)")
  }

  fn from_captures(captures: &Captures<'_>) -> Result<Self, MessageParseError> {
    Ok(CapabilityAcknowledge {
      capabilities: group(captures, "capabilities")
        .split(' ')
        .filter(|cap| !cap.is_empty())
        .map(String::from)
        .collect(),
    })
  }
}

impl_into_message!(CapabilityAcknowledge);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_all_capabilities() {
    let ack = decode!(
      CapabilityAcknowledge,
      ":tmi.twitch.tv CAP * ACK :twitch.tv/membership twitch.tv/tags twitch.tv/commands"
    );
    assert_eq!(
      ack.capabilities,
      ["twitch.tv/membership", "twitch.tv/tags", "twitch.tv/commands"]
    );
  }

  #[test]
  fn parse_one_capability() {
    let ack = decode!(CapabilityAcknowledge, ":tmi.twitch.tv CAP * ACK :twitch.tv/tags");
    assert_eq!(ack.capabilities, ["twitch.tv/tags"]);
  }

  #[test]
  fn parse_two_capabilities() {
    let ack = decode!(
      CapabilityAcknowledge,
      ":tmi.twitch.tv CAP * ACK :twitch.tv/commands twitch.tv/membership"
    );
    assert_eq!(ack.capabilities, ["twitch.tv/commands", "twitch.tv/membership"]);
  }

  #[test]
  fn reject_nak() {
    assert!(!CapabilityAcknowledge::matches(Some(":tmi.twitch.tv CAP * NAK :twitch.tv/foo")).unwrap());
  }
}
