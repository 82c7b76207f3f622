//! Sent upon joining a channel, or upon successfully sending a `PRIVMSG` message to a channel.

use super::{group, parse_badges, parse_color, parse_message_id, FromLine, MessageParseError, UserType};
use crate::common::{parse_emote_sets, Badges, Tags};
use regex::{Captures, Regex};
use uuid::Uuid;

/// Sent upon joining a channel, or upon successfully sending a `PRIVMSG` message to a channel.
///
/// This is like [`GlobalUserState`][crate::msg::GlobalUserState], but for a specific channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserState {
  channel: String,
  user_name: String,
  kind: UserType,
  message_id: Option<Uuid>,
  badges: Badges,
  badge_info: Badges,
  emote_sets: Vec<String>,
  color: Option<String>,
  moderator: bool,
  subscriber: bool,
  turbo: bool,
}

generate_getters! {
  for UserState as self {
    /// Name of the channel in which this state applies to.
    channel -> &str = self.channel.as_ref(),

    /// Display name of the user.
    user_name -> &str = self.user_name.as_ref(),

    /// Type of the user's account.
    kind -> UserType,

    /// ID of the message which triggered this user state, if it was caused by sending one.
    message_id -> Option<Uuid>,

    /// The channel badges enabled by the user in the [channel][`UserState::channel`].
    badges -> &Badges = &self.badges,

    badge_info -> &Badges = &self.badge_info,

    /// List of emote set IDs which are available in the [channel][`UserState::channel`].
    emote_sets -> &[String] = &self.emote_sets,

    /// The user's selected name color.
    ///
    /// [`None`] means the user has not selected a color.
    color -> Option<&str> = self.color.as_deref(),

    /// Whether the user is a moderator, as reported by the `mod` tag.
    moderator -> bool,

    subscriber -> bool,

    turbo -> bool,
  }
}

impl FromLine for UserState {
  fn pattern() -> &'static Regex {
    pattern!(r"^@(?P<tags>\S+)\s:tmi\.twitch\.tv\sUSERSTATE\s#(?P<channel>\S+)$")
  }

  fn from_captures(captures: &Captures<'_>) -> Result<Self, MessageParseError> {
    let tags = Tags::parse(group(captures, "tags"));
    Ok(UserState {
      channel: group(captures, "channel").into(),
      user_name: tags.require("display-name")?.into(),
      kind: tags.parse_opt("user-type")?.unwrap_or_default(),
      message_id: parse_message_id(&tags, "id")?,
      badges: parse_badges(&tags, "badges"),
      badge_info: parse_badges(&tags, "badge-info"),
      emote_sets: parse_emote_sets(tags.get("emote-sets").unwrap_or("")),
      color: parse_color(&tags),
      moderator: tags.flag("mod"),
      subscriber: tags.flag("subscriber"),
      turbo: tags.flag("turbo"),
    })
  }
}

impl_into_message!(UserState);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_userstate_example() {
    let msg = decode!(
      UserState,
      "@badge-info=;badges=staff/1;color=#0D4200;display-name=ronni;emote-sets=0,33,50,237,793,2126,3517,4578,5569,9400,10337,12239;mod=1;subscriber=1;turbo=1;user-type=staff :tmi.twitch.tv USERSTATE #dallas"
    );
    assert_eq!(msg.channel(), "dallas");
    assert_eq!(msg.user_name(), "ronni");
    assert_eq!(msg.kind(), UserType::Staff);
    assert_eq!(msg.message_id(), None);
    assert_eq!(msg.badges().get("staff"), Some("1"));
    assert_eq!(
      msg.emote_sets(),
      ["0", "33", "50", "237", "793", "2126", "3517", "4578", "5569", "9400", "10337", "12239"]
    );
    assert_eq!(msg.color(), Some("#0D4200"));
    assert!(msg.moderator());
    assert!(msg.subscriber());
    assert!(msg.turbo());
  }

  #[test]
  fn parse_userstate_with_id() {
    let msg = decode!(
      UserState,
      "@badge-info=;badges=moderator/1;color=#0000FF;display-name=ArchieMate;emote-sets=0,610186276;id=581b6702-10fd-41d3-bd84-060d8878e098;mod=1;subscriber=0;user-type=mod :tmi.twitch.tv USERSTATE #archimond7450"
    );
    assert_eq!(
      msg.message_id(),
      Some("581b6702-10fd-41d3-bd84-060d8878e098".parse().unwrap())
    );
    assert_eq!(msg.kind(), UserType::Moderator);
    assert!(!msg.subscriber());
    assert!(!msg.turbo());
  }

  #[test]
  fn moderator_follows_the_mod_tag() {
    let msg = decode!(
      UserState,
      "@badge-info=;badges=moderator/1;color=;display-name=ArchieMate;emote-sets=0;mod=0;subscriber=0;user-type= :tmi.twitch.tv USERSTATE #archimond7450"
    );
    assert!(!msg.moderator());
    assert_eq!(msg.color(), None);
  }
}
