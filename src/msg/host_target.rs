//! Sent when a channel starts or stops hosting another channel.

use super::{group, parse_group, FromLine, MessageParseError};
use regex::{Captures, Regex};

/// A channel started hosting another channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostTargetStart {
  /// The channel which is hosting.
  pub hosting_channel: String,

  /// The channel being hosted.
  pub channel: String,

  /// Number of viewers watching the host.
  pub viewers: u64,
}

impl FromLine for HostTargetStart {
  fn pattern() -> &'static Regex {
    pattern!(r"^:tmi\.twitch\.tv\sHOSTTARGET\s#(?P<hosting_channel>\S+)\s:(?P<channel>\S{2,})\s(?P<viewers>\d+)")
  }

  fn from_captures(captures: &Captures<'_>) -> Result<Self, MessageParseError> {
    Ok(HostTargetStart {
      hosting_channel: group(captures, "hosting_channel").into(),
      channel: group(captures, "channel").into(),
      viewers: parse_group(captures, "viewers")?,
    })
  }
}

impl_into_message!(HostTargetStart);

/// A channel stopped hosting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostTargetEnd {
  pub hosting_channel: String,
  pub viewers: u64,
}

impl FromLine for HostTargetEnd {
  fn pattern() -> &'static Regex {
    pattern!(r"^:tmi\.twitch\.tv\sHOSTTARGET\s#(?P<hosting_channel>\S+)\s:-\s(?P<viewers>\d+)")
  }

  fn from_captures(captures: &Captures<'_>) -> Result<Self, MessageParseError> {
    Ok(HostTargetEnd {
      hosting_channel: group(captures, "hosting_channel").into(),
      viewers: parse_group(captures, "viewers")?,
    })
  }
}

impl_into_message!(HostTargetEnd);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_host_target_start() {
    let host = decode!(HostTargetStart, ":tmi.twitch.tv HOSTTARGET #wtii :sp4rta 107");
    assert_eq!(host.hosting_channel, "wtii");
    assert_eq!(host.channel, "sp4rta");
    assert_eq!(host.viewers, 107);
  }

  #[test]
  fn parse_host_target_end() {
    let end = decode!(HostTargetEnd, ":tmi.twitch.tv HOSTTARGET #wtii :- 0");
    assert_eq!(end.hosting_channel, "wtii");
    assert_eq!(end.viewers, 0);
  }

  #[test]
  fn start_and_end_do_not_overlap() {
    assert!(!HostTargetStart::matches(Some(":tmi.twitch.tv HOSTTARGET #wtii :- 0")).unwrap());
    assert!(!HostTargetEnd::matches(Some(":tmi.twitch.tv HOSTTARGET #wtii :sp4rta 107")).unwrap());
  }
}
