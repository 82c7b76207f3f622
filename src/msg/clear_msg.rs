//! Sent when a single message is deleted.

use super::{group, FromLine, MessageParseError};
use crate::common::Tags;
use regex::{Captures, Regex};

/// Sent when a single message is deleted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClearMsg {
  channel: String,
  sender: String,
  message_id: String,
  text: String,
}

generate_getters! {
  for ClearMsg as self {
    /// Login of the channel in which the message was deleted.
    channel -> &str = self.channel.as_ref(),

    /// Login of the user which sent the deleted message.
    sender -> &str = self.sender.as_ref(),

    /// Unique ID of the deleted message.
    message_id -> &str = self.message_id.as_ref(),

    /// Text of the deleted message.
    text -> &str = self.text.as_ref(),
  }
}

impl FromLine for ClearMsg {
  fn pattern() -> &'static Regex {
    pattern!(r"^@(?P<tags>\S+)\s:tmi\.twitch\.tv\sCLEARMSG\s#(?P<channel>\S+)\s:(?P<text>.*)")
  }

  fn from_captures(captures: &Captures<'_>) -> Result<Self, MessageParseError> {
    let tags = Tags::parse(group(captures, "tags"));
    Ok(ClearMsg {
      channel: group(captures, "channel").into(),
      sender: tags.require("login")?.into(),
      message_id: tags.require("target-msg-id")?.into(),
      text: group(captures, "text").into(),
    })
  }
}

impl_into_message!(ClearMsg);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_clearmsg() {
    let msg = decode!(
      ClearMsg,
      "@login=ronni;target-msg-id=abc-123-def :tmi.twitch.tv CLEARMSG #dallas :HeyGuys"
    );
    assert_eq!(msg.channel(), "dallas");
    assert_eq!(msg.sender(), "ronni");
    assert_eq!(msg.message_id(), "abc-123-def");
    assert_eq!(msg.text(), "HeyGuys");
  }

  #[test]
  fn parse_clearmsg_with_extra_tags() {
    let msg = decode!(
      ClearMsg,
      "@login=alazymeme;room-id=;target-msg-id=3c92014f-340a-4dc3-a9c9-e5cf182f4a84;tmi-sent-ts=1594561955611 :tmi.twitch.tv CLEARMSG #pajlada :lole"
    );
    assert_eq!(msg.sender(), "alazymeme");
    assert_eq!(msg.message_id(), "3c92014f-340a-4dc3-a9c9-e5cf182f4a84");
    assert_eq!(msg.text(), "lole");
  }
}
