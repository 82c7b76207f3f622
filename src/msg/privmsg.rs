//! Represents a basic Twitch chat message sent by some user to a specific channel.

use super::{
  group, parse_badges, parse_color, parse_emotes, parse_message_text, parse_timestamp, FromLine,
  MessageParseError, User,
};
use crate::common::badges::badge;
use crate::common::{Badges, Emote, Tags};
use chrono::{DateTime, Utc};
use regex::{Captures, Regex};
use uuid::Uuid;

/// Represents a basic Twitch chat message sent by some user to a specific channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Privmsg {
  channel: String,
  room_id: u64,
  message_id: Uuid,
  sender: User,
  text: String,
  is_action: bool,
  badges: Badges,
  badge_info: Badges,
  color: Option<String>,
  bits: u64,
  client_nonce: Option<String>,
  emotes: Vec<Emote>,
  emote_only: bool,
  first_msg: bool,
  returning_chatter: bool,
  subscriber: bool,
  turbo: bool,
  timestamp: DateTime<Utc>,
}

generate_getters! {
  for Privmsg as self {
    /// Channel in which this message was sent.
    channel -> &str = self.channel.as_ref(),

    /// ID of the channel in which this message was sent.
    room_id -> u64,

    /// Unique ID of the message.
    message_id -> Uuid,

    /// Basic info about the user who sent this message.
    sender -> &User = &self.sender,

    /// Text content of the message.
    ///
    /// This strips the action prefix/suffix bytes if the message was sent with `/me`.
    text -> &str = self.text.as_ref(),

    /// Whether the message was sent with `/me`.
    is_action -> bool,

    /// The channel badges enabled by the user in the [channel][`Privmsg::channel`].
    badges -> &Badges = &self.badges,

    /// Extra info about the badges, such as the exact number of subscribed months.
    badge_info -> &Badges = &self.badge_info,

    /// The user's selected name color.
    ///
    /// [`None`] means the user has not selected a color.
    color -> Option<&str> = self.color.as_deref(),

    /// The number of bits cheered with this message.
    bits -> u64,

    /// Nonce chosen by the sender's client.
    client_nonce -> Option<&str> = self.client_nonce.as_deref(),

    /// Emotes present in the text of the message.
    emotes -> &[Emote] = &self.emotes,

    /// Whether the message consists only of emotes.
    emote_only -> bool,

    /// Whether this is the first message the user sent in the channel.
    first_msg -> bool,

    /// Whether the user is a returning chatter.
    returning_chatter -> bool,

    /// Whether the user is subscribed to the channel.
    subscriber -> bool,

    /// Whether the user has Turbo.
    turbo -> bool,

    /// The time at which the message was sent.
    timestamp -> DateTime<Utc>,
  }
}

impl Privmsg {
  /// Whether the sender wears the moderator badge.
  pub fn is_moderator(&self) -> bool {
    self.badges.contains(badge::MODERATOR)
  }
}

impl FromLine for Privmsg {
  fn pattern() -> &'static Regex {
    pattern!(r"^@(?P<tags>\S+)\s:(?P<login>\S+)!\S+@\S+\.tmi\.twitch\.tv\sPRIVMSG\s#(?P<channel>\S+)\s:(?P<text>.*)")
  }

  fn from_captures(captures: &Captures<'_>) -> Result<Self, MessageParseError> {
    let tags = Tags::parse(group(captures, "tags"));
    let (text, is_action) = parse_message_text(group(captures, "text"));

    Ok(Privmsg {
      channel: group(captures, "channel").into(),
      room_id: tags.parse_required("room-id")?,
      message_id: tags.parse_required("id")?,
      sender: User {
        id: tags.parse_required("user-id")?,
        login: group(captures, "login").into(),
        name: tags.require("display-name")?.into(),
        kind: tags.parse_opt("user-type")?.unwrap_or_default(),
      },
      text: text.into(),
      is_action,
      badges: parse_badges(&tags, "badges"),
      badge_info: parse_badges(&tags, "badge-info"),
      color: parse_color(&tags),
      bits: tags.parse_opt("bits")?.unwrap_or(0),
      client_nonce: tags.value("client-nonce").map(String::from),
      emotes: parse_emotes(&tags)?,
      emote_only: tags.flag("emote-only"),
      first_msg: tags.flag("first-msg"),
      returning_chatter: tags.flag("returning-chatter"),
      subscriber: tags.flag("subscriber"),
      turbo: tags.flag("turbo"),
      timestamp: parse_timestamp(&tags, "tmi-sent-ts")?,
    })
  }
}

impl_into_message!(Privmsg);

/// A chat message from `sender` in `channel`, wearing `badges`.
#[cfg(test)]
pub(crate) fn test_privmsg(channel: &str, sender: &str, badges: &str, text: &str) -> Privmsg {
  let login = sender.to_lowercase();
  let line = format!(
    "@badge-info=;badges={badges};color=;display-name={sender};emotes=;id=b34ccfc7-4977-403a-8a94-33c6bac34fb8;mod=0;room-id=1337;subscriber=0;tmi-sent-ts=1507246572675;turbo=0;user-id=1337;user-type= :{login}!{login}@{login}.tmi.twitch.tv PRIVMSG #{channel} :{text}"
  );
  Privmsg::from_line(Some(&line)).unwrap().unwrap()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::msg::UserType;

  #[test]
  fn parse_privmsg_example() {
    let msg = decode!(
      Privmsg,
      "@badge-info=;badges=turbo/1;color=#0D4200;display-name=ronni;emotes=25:0-4,12-16/1902:6-10;id=b34ccfc7-4977-403a-8a94-33c6bac34fb8;mod=0;room-id=1337;subscriber=0;tmi-sent-ts=1507246572675;turbo=1;user-id=1337;user-type=global_mod :ronni!ronni@ronni.tmi.twitch.tv PRIVMSG #ronni :Kappa Keepo Kappa"
    );
    assert_eq!(msg.channel(), "ronni");
    assert_eq!(msg.room_id(), 1337);
    assert_eq!(
      msg.message_id(),
      "b34ccfc7-4977-403a-8a94-33c6bac34fb8".parse::<Uuid>().unwrap()
    );
    assert_eq!(msg.sender().id(), 1337);
    assert_eq!(msg.sender().login(), "ronni");
    assert_eq!(msg.sender().name(), "ronni");
    assert_eq!(msg.sender().kind(), UserType::GlobalModerator);
    assert_eq!(msg.text(), "Kappa Keepo Kappa");
    assert!(!msg.is_action());
    assert_eq!(msg.badges().get("turbo"), Some("1"));
    assert!(msg.badge_info().is_empty());
    assert_eq!(msg.color(), Some("#0D4200"));
    assert_eq!(msg.bits(), 0);
    assert_eq!(msg.client_nonce(), None);
    assert_eq!(
      msg.emotes(),
      [
        Emote::new("25", 0, 5),
        Emote::new("25", 12, 5),
        Emote::new("1902", 6, 5),
      ]
    );
    assert!(!msg.is_moderator());
    assert!(!msg.subscriber());
    assert!(msg.turbo());
    assert_eq!(
      msg.timestamp().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
      "2017-10-05T23:36:12.675Z"
    );
  }

  #[test]
  fn parse_privmsg_with_bits() {
    let msg = decode!(
      Privmsg,
      "@badge-info=;badges=bits/100;bits=1;color=#004B49;display-name=TETYYS;emotes=;flags=;id=d7f03a35-f339-41ca-b4d4-7c0721438570;mod=0;room-id=11148817;subscriber=0;tmi-sent-ts=1594571566672;turbo=0;user-id=36175310;user-type= :tetyys!tetyys@tetyys.tmi.twitch.tv PRIVMSG #pajlada :trihard1"
    );
    assert_eq!(msg.bits(), 1);
    assert_eq!(msg.sender().name(), "TETYYS");
    assert_eq!(msg.sender().kind(), UserType::Normal);
    assert!(msg.emotes().is_empty());
  }

  #[test]
  fn parse_privmsg_moderator_from_badges() {
    let msg = decode!(
      Privmsg,
      "@badge-info=subscriber/22;badges=moderator/1,subscriber/12;color=#19E6E6;display-name=randers;emotes=;flags=;id=d831d848-b7c7-4559-ae3a-2cb88f4dbfed;mod=1;room-id=11148817;subscriber=1;tmi-sent-ts=1594555275886;turbo=0;user-id=40286300;user-type=mod :randers!randers@randers.tmi.twitch.tv PRIVMSG #pajlada :\u{0001}ACTION -tags\u{0001}"
    );
    assert!(msg.is_moderator());
    assert!(msg.is_action());
    assert_eq!(msg.text(), "-tags");
    assert_eq!(msg.badge_info().get("subscriber"), Some("22"));
    assert_eq!(msg.sender().kind(), UserType::Moderator);
  }

  #[test]
  fn parse_privmsg_display_name_with_space() {
    let msg = decode!(
      Privmsg,
      "@badge-info=;badges=;color=;display-name=Riot\\sGames;emotes=;flags=;id=bdfa278e-11c4-484f-9491-0a61b16fab60;mod=1;room-id=36029255;subscriber=0;tmi-sent-ts=1593953876927;turbo=0;user-id=36029255;user-type= :riotgames!riotgames@riotgames.tmi.twitch.tv PRIVMSG #riotgames :test fake message"
    );
    assert_eq!(msg.sender().name(), "Riot Games");
    assert_eq!(msg.color(), None);
    assert!(!msg.is_moderator());
  }

  #[test]
  fn parse_privmsg_command_with_nonce() {
    let msg = decode!(
      Privmsg,
      "@badge-info=subscriber/26;badges=subscriber/24,premium/1;client-nonce=01eb7004786255bc78e2c60676b79eaf;color=#00FF00;display-name=Archimond7450;emotes=;first-msg=0;flags=;id=8c4890a8-27a4-47ac-b114-e217105325f3;mod=0;room-id=23693840;subscriber=1;tmi-sent-ts=1649338601307;turbo=0;user-id=147113965;user-type= :archimond7450!archimond7450@archimond7450.tmi.twitch.tv PRIVMSG #wtii :!time"
    );
    assert_eq!(msg.client_nonce(), Some("01eb7004786255bc78e2c60676b79eaf"));
    assert_eq!(msg.text(), "!time");
    assert!(!msg.first_msg());
    assert!(msg.subscriber());
  }

  #[test]
  fn parse_privmsg_missing_user_id() {
    assert_eq!(
      Privmsg::from_line(Some(
        "@display-name=ronni;id=b34ccfc7-4977-403a-8a94-33c6bac34fb8;room-id=1337;tmi-sent-ts=1507246572675 :ronni!ronni@ronni.tmi.twitch.tv PRIVMSG #ronni :hi"
      )),
      Err(MessageParseError::MissingTag("user-id"))
    );
  }
}
