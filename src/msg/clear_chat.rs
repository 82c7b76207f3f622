//! Sent when the chat is cleared of a batch of messages.

use super::{group, parse_timestamp, FromLine, MessageParseError};
use crate::common::Tags;
use chrono::{DateTime, Utc};
use regex::{Captures, Regex};
use std::time::Duration;

/// Sent when the chat is cleared of a batch of messages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClearChat {
  channel: String,
  room_id: u64,
  action: Action,
  timestamp: DateTime<Utc>,
}

generate_getters! {
  for ClearChat as self {
    /// Name of the affected channel.
    channel -> &str = self.channel.as_ref(),

    /// ID of the affected channel.
    room_id -> u64,

    /// The specific kind of [`Action`] that this command represents.
    action -> &Action = &self.action,

    /// Time at which the [`ClearChat`] was executed on Twitch servers.
    timestamp -> DateTime<Utc>,
  }
}

impl ClearChat {
  /// Get the target of this [`ClearChat`] command.
  ///
  /// This returns the user which was timed out or banned.
  #[inline]
  pub fn target(&self) -> Option<&str> {
    match &self.action {
      Action::Clear => None,
      Action::Ban(Ban { user, .. }) | Action::TimeOut(TimeOut { user, .. }) => Some(user),
    }
  }
}

/// Represents the specific way in which the chat was cleared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
  /// The entire chat was cleared.
  Clear,

  /// A single user was banned, clearing only their messages.
  Ban(Ban),

  /// A single user was timed out, clearing only their messages.
  TimeOut(TimeOut),
}

/// A single user was banned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ban {
  /// Login of the banned user.
  pub user: String,

  /// ID of the banned user, if known.
  pub id: Option<u64>,
}

/// A single user was timed out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeOut {
  /// Login of the user.
  pub user: String,

  /// ID of the user, if known.
  pub id: Option<u64>,

  /// Duration of the time out.
  pub duration: Duration,
}

impl FromLine for ClearChat {
  fn pattern() -> &'static Regex {
    pattern!(r"^@(?P<tags>\S+)\s:tmi\.twitch\.tv\sCLEARCHAT\s#(?P<channel>\S+)(?:\s:(?P<user>.*))?$")
  }

  fn from_captures(captures: &Captures<'_>) -> Result<Self, MessageParseError> {
    let tags = Tags::parse(group(captures, "tags"));
    let user = captures.name("user").map(|m| m.as_str().to_owned());
    let id = tags.parse_opt("target-user-id")?;
    let duration = tags.parse_opt::<u64>("ban-duration")?;

    let action = match (user, duration) {
      (None, _) => Action::Clear,
      (Some(user), None) => Action::Ban(Ban { user, id }),
      (Some(user), Some(secs)) => Action::TimeOut(TimeOut {
        user,
        id,
        duration: Duration::from_secs(secs),
      }),
    };

    Ok(ClearChat {
      channel: group(captures, "channel").into(),
      room_id: tags.parse_required("room-id")?,
      action,
      timestamp: parse_timestamp(&tags, "tmi-sent-ts")?,
    })
  }
}

impl_into_message!(ClearChat);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_clearchat_timeout() {
    let msg = decode!(
      ClearChat,
      "@ban-duration=1;room-id=2;target-user-id=3;tmi-sent-ts=1650489791000 :tmi.twitch.tv CLEARCHAT #dallas :ronni"
    );
    assert_eq!(msg.channel(), "dallas");
    assert_eq!(msg.room_id(), 2);
    assert_eq!(msg.target(), Some("ronni"));
    assert_eq!(
      msg.action(),
      &Action::TimeOut(TimeOut {
        user: "ronni".into(),
        id: Some(3),
        duration: Duration::from_secs(1),
      })
    );
    assert_eq!(msg.timestamp().timestamp_millis(), 1650489791000);
  }

  #[test]
  fn parse_clearchat_ban() {
    let msg = decode!(
      ClearChat,
      "@room-id=23693840;target-user-id=140167043;tmi-sent-ts=1649340649566 :tmi.twitch.tv CLEARCHAT #wtii :djavan61"
    );
    assert_eq!(msg.channel(), "wtii");
    assert_eq!(msg.room_id(), 23693840);
    assert_eq!(
      msg.action(),
      &Action::Ban(Ban {
        user: "djavan61".into(),
        id: Some(140167043),
      })
    );
  }

  #[test]
  fn parse_clearchat_clear() {
    let msg = decode!(
      ClearChat,
      "@room-id=11148817;tmi-sent-ts=1594561360331 :tmi.twitch.tv CLEARCHAT #pajlada"
    );
    assert_eq!(msg.action(), &Action::Clear);
    assert_eq!(msg.target(), None);
  }

  #[test]
  fn parse_clearchat_missing_room_id() {
    assert_eq!(
      ClearChat::from_line(Some("@tmi-sent-ts=1594561360331 :tmi.twitch.tv CLEARCHAT #pajlada")),
      Err(MessageParseError::MissingTag("room-id"))
    );
  }
}
