use super::{group, FromLine, MessageParseError};
use crate::common::Tags;
use regex::{Captures, Regex};
use std::time::Duration;

/// A partial update to the settings of some channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomState {
  /// Login of the channel this state was applied to.
  pub channel: String,

  /// ID of the channel this state was applied to.
  pub room_id: u64,

  /// Whether the room is in emote-only mode.
  ///
  /// Chat messages may only contain emotes.
  ///
  /// - [`None`] means no change.
  /// - [`Some`] means enabled if `true`, and disabled if `false`.
  pub emote_only: Option<bool>,

  /// Whether the room is in followers-only mode.
  ///
  /// Only followers (optionally with a minimum followage) can chat.
  ///
  /// - [`None`] means no change.
  /// - [`Some`] means some change, see [`FollowersOnly`] for more information about possible values.
  pub followers_only: Option<FollowersOnly>,

  /// Whether the room is in r9k mode.
  ///
  /// Only unique messages may be sent to chat.
  pub r9k: Option<bool>,

  /// Whether rituals are enabled.
  pub rituals: Option<bool>,

  /// Whether the room is in slow mode.
  ///
  /// Users may only send messages with some minimum time between them.
  pub slow: Option<Duration>,

  /// Whether the room is in subcriber-only mode.
  ///
  /// Users may only send messages if they have an active subscription.
  pub subs_only: Option<bool>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FollowersOnly {
  /// Followers-only mode is disabled.
  ///
  /// Anyone can send chat messages within the bounds
  /// of the other chat settings.
  Disabled,

  /// Followers-only mode is enabled, with an optional duration.
  ///
  /// If the duration is [`None`], then all followers can chat.
  /// Otherwise, only followers which have a follow age of at
  /// least the set duration can chat.
  Enabled(Option<Duration>),
}

impl From<i64> for FollowersOnly {
  fn from(minutes: i64) -> Self {
    match minutes {
      n if n > 0 => FollowersOnly::Enabled(Some(Duration::from_secs(n as u64 * 60))),
      0 => FollowersOnly::Enabled(None),
      _ => FollowersOnly::Disabled,
    }
  }
}

impl FromLine for RoomState {
  fn pattern() -> &'static Regex {
    pattern!(r"^@(?P<tags>\S+)\s:tmi\.twitch\.tv\sROOMSTATE\s#(?P<channel>\S+)")
  }

  fn from_captures(captures: &Captures<'_>) -> Result<Self, MessageParseError> {
    let tags = Tags::parse(group(captures, "tags"));
    Ok(RoomState {
      channel: group(captures, "channel").into(),
      room_id: tags.parse_required("room-id")?,
      emote_only: tags.opt_flag("emote-only"),
      followers_only: tags
        .parse_opt::<i64>("followers-only")?
        .map(FollowersOnly::from),
      r9k: tags.opt_flag("r9k"),
      rituals: tags.opt_flag("rituals"),
      slow: tags.parse_opt("slow")?.map(Duration::from_secs),
      subs_only: tags.opt_flag("subs-only"),
    })
  }
}

impl_into_message!(RoomState);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_roomstate_full() {
    let state = decode!(
      RoomState,
      "@emote-only=0;followers-only=-1;r9k=0;rituals=0;room-id=12345678;slow=0;subs-only=0 :tmi.twitch.tv ROOMSTATE #bar"
    );
    assert_eq!(
      state,
      RoomState {
        channel: "bar".into(),
        room_id: 12345678,
        emote_only: Some(false),
        followers_only: Some(FollowersOnly::Disabled),
        r9k: Some(false),
        rituals: Some(false),
        slow: Some(Duration::ZERO),
        subs_only: Some(false),
      }
    );
  }

  #[test]
  fn parse_roomstate_partial() {
    let state = decode!(
      RoomState,
      "@room-id=147113965;subs-only=1 :tmi.twitch.tv ROOMSTATE #archimond7450"
    );
    assert_eq!(state.channel, "archimond7450");
    assert_eq!(state.room_id, 147113965);
    assert_eq!(state.subs_only, Some(true));
    assert_eq!(state.emote_only, None);
    assert_eq!(state.followers_only, None);
    assert_eq!(state.slow, None);
  }

  #[test]
  fn parse_roomstate_followers_duration() {
    let state = decode!(
      RoomState,
      "@followers-only=10;room-id=1 :tmi.twitch.tv ROOMSTATE #foo"
    );
    assert_eq!(
      state.followers_only,
      Some(FollowersOnly::Enabled(Some(Duration::from_secs(600))))
    );
  }

  #[test]
  fn parse_roomstate_empty_value_is_no_change() {
    let state = decode!(RoomState, "@r9k=;room-id=1 :tmi.twitch.tv ROOMSTATE #foo");
    assert_eq!(state.r9k, None);
  }
}
