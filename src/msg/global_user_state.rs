//! This message is sent upon successful authentication.

use super::{group, parse_badges, parse_color, FromLine, MessageParseError, UserType};
use crate::common::{parse_emote_sets, Badges, Tags};
use regex::{Captures, Regex};

/// This message is sent upon successful authentication.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalUserState {
  id: u64,
  name: String,
  kind: UserType,
  badges: Badges,
  badge_info: Badges,
  emote_sets: Vec<String>,
  color: Option<String>,
  turbo: bool,
}

generate_getters! {
  for GlobalUserState as self {
    /// ID of the logged in user.
    id -> u64,

    /// Display name of the logged in user.
    name -> &str = self.name.as_ref(),

    kind -> UserType,

    /// Global badges of the logged in user.
    badges -> &Badges = &self.badges,

    badge_info -> &Badges = &self.badge_info,

    /// List of emote set IDs which are available globally.
    emote_sets -> &[String] = &self.emote_sets,

    /// The user's selected name color.
    color -> Option<&str> = self.color.as_deref(),

    turbo -> bool,
  }
}

impl FromLine for GlobalUserState {
  fn pattern() -> &'static Regex {
    pattern!(r"^@(?P<tags>\S+)\s:tmi\.twitch\.tv\sGLOBALUSERSTATE$")
  }

  fn from_captures(captures: &Captures<'_>) -> Result<Self, MessageParseError> {
    let tags = Tags::parse(group(captures, "tags"));
    Ok(GlobalUserState {
      id: tags.parse_required("user-id")?,
      name: tags.require("display-name")?.into(),
      kind: tags.parse_opt("user-type")?.unwrap_or_default(),
      badges: parse_badges(&tags, "badges"),
      badge_info: parse_badges(&tags, "badge-info"),
      emote_sets: parse_emote_sets(tags.get("emote-sets").unwrap_or("")),
      color: parse_color(&tags),
      turbo: tags.flag("turbo"),
    })
  }
}

impl_into_message!(GlobalUserState);
