//! ## Twitch message types
//!
//! The entrypoint to this module is [`Message`].
//!
//! To decode a raw chat line into a [`Message`], use [`Message::parse`].
//! Every variant can also be decoded on its own through the [`FromLine`] trait.

#[macro_use]
mod macros;

use crate::common::Tags;
use chrono::{DateTime, TimeZone, Utc};
use regex::{Captures, Regex};
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

/// Implemented for types which may be decoded from a raw chat line.
pub trait FromLine: Sized + private::Sealed {
  /// The pattern which recognizes this kind of line.
  fn pattern() -> &'static Regex;

  /// Construct `Self` from a successful match of [`FromLine::pattern`].
  fn from_captures(captures: &Captures<'_>) -> Result<Self, MessageParseError>;

  /// Whether `line` is recognized as `Self`.
  ///
  /// Fails with [`MessageParseError::NoInput`] if there is no line.
  fn matches(line: Option<&str>) -> Result<bool, MessageParseError> {
    let line = line.ok_or(MessageParseError::NoInput)?;
    Ok(Self::pattern().is_match(line))
  }

  /// Attempt to decode `Self` from `line`.
  ///
  /// Returns `Ok(None)` if the line is not recognized, and an error if it was recognized
  /// but some of its parts are missing or invalid.
  ///
  /// Fails with [`MessageParseError::NoInput`] if there is no line.
  fn from_line(line: Option<&str>) -> Result<Option<Self>, MessageParseError> {
    let line = line.ok_or(MessageParseError::NoInput)?;
    Self::pattern()
      .captures(line)
      .map(|captures| Self::from_captures(&captures))
      .transpose()
  }
}

/// A fully decoded Twitch chat line.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
  Join(Join),
  Part(Part),
  Ping(Ping),
  Privmsg(Privmsg),
  UserNotice(UserNotice),
  ClearChat(ClearChat),
  Notice(Notice),
  ClearMsg(ClearMsg),
  HostTargetStart(HostTargetStart),
  HostTargetEnd(HostTargetEnd),
  RoomState(RoomState),
  UserState(UserState),
  GlobalUserState(GlobalUserState),
  Reconnect(Reconnect),
  UnknownCommand(UnknownCommand),
  NamesList(NamesList),
  EndOfNamesList(EndOfNamesList),
  Welcome(Welcome),
  CapabilityAcknowledge(CapabilityAcknowledge),

  /// A line which no other variant recognized, kept verbatim.
  Unknown(String),
}

type Decoder = fn(&str) -> Result<Option<Message>, MessageParseError>;

fn try_decode<T: FromLine + Into<Message>>(line: &str) -> Result<Option<Message>, MessageParseError> {
  Ok(T::from_line(Some(line))?.map(Into::into))
}

macro_rules! decoders {
  ($($T:ident),* $(,)?) => {
    /// Decoders in the order they are tried.
    ///
    /// The first decoder which recognizes a line wins.
    static DECODERS: &[Decoder] = &[$(try_decode::<$T>),*];

    $(impl private::Sealed for $T {})*
  };
}

decoders! {
  Join,
  Part,
  Ping,
  Privmsg,
  UserNotice,
  ClearChat,
  Notice,
  ClearMsg,
  HostTargetStart,
  HostTargetEnd,
  RoomState,
  UserState,
  GlobalUserState,
  Reconnect,
  UnknownCommand,
  NamesList,
  EndOfNamesList,
  Welcome,
  CapabilityAcknowledge,
}

impl Message {
  /// Decode a raw chat line.
  ///
  /// Lines which are not recognized by any variant are returned as [`Message::Unknown`].
  /// An error is returned if a line was recognized, but is missing some required part,
  /// or if there is no line at all.
  pub fn parse(line: Option<&str>) -> Result<Message, MessageParseError> {
    let line = line.ok_or(MessageParseError::NoInput)?;
    for decode in DECODERS {
      if let Some(message) = decode(line)? {
        return Ok(message);
      }
    }
    Ok(Message::Unknown(line.to_owned()))
  }
}

/// Failed to decode a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageParseError {
  /// There was no line to decode.
  NoInput,

  /// A tag required by the message is missing.
  MissingTag(&'static str),

  /// A tag has a value which could not be decoded.
  InvalidTag { tag: &'static str, value: String },

  /// Some other part of the line could not be decoded.
  InvalidField { field: &'static str, value: String },
}

impl Display for MessageParseError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      MessageParseError::NoInput => write!(f, "failed to parse message: no input"),
      MessageParseError::MissingTag(tag) => {
        write!(f, "failed to parse message: missing tag `{tag}`")
      }
      MessageParseError::InvalidTag { tag, value } => {
        write!(f, "failed to parse message: invalid value `{value}` for tag `{tag}`")
      }
      MessageParseError::InvalidField { field, value } => {
        write!(f, "failed to parse message: invalid {field} `{value}`")
      }
    }
  }
}

impl std::error::Error for MessageParseError {}

/// The type of a user's account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UserType {
  /// A normal user.
  #[default]
  Normal,

  /// A Twitch administrator.
  Admin,

  /// A global moderator.
  GlobalModerator,

  /// A Twitch employee.
  Staff,

  /// A moderator of the channel.
  Moderator,
}

impl UserType {
  pub fn as_str(&self) -> &'static str {
    match self {
      UserType::Normal => "",
      UserType::Admin => "admin",
      UserType::GlobalModerator => "global_mod",
      UserType::Staff => "staff",
      UserType::Moderator => "mod",
    }
  }
}

impl FromStr for UserType {
  type Err = UnknownUserType;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(match s {
      "" => UserType::Normal,
      "admin" => UserType::Admin,
      "global_mod" => UserType::GlobalModerator,
      "staff" => UserType::Staff,
      "mod" => UserType::Moderator,
      _ => return Err(UnknownUserType),
    })
  }
}

#[derive(Clone, Copy, Debug)]
pub struct UnknownUserType;

/// Basic information about a user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
  id: u64,
  login: String,
  name: String,
  kind: UserType,
}

generate_getters! {
  for User as self {
    /// Id of the user.
    id -> u64,

    /// Login of the user.
    login -> &str = self.login.as_ref(),

    /// Display name.
    ///
    /// This is the name which appears in chat, and may contain arbitrary unicode characters.
    /// This is in contrast to [`User::login`] which is always only ASCII.
    name -> &str = self.name.as_ref(),

    /// Type of the user's account.
    kind -> UserType,
  }
}

fn parse_message_text(input: &str) -> (&str, bool) {
  let Some(s) = input.strip_prefix("\u{0001}ACTION ") else {
    return (input, false);
  };
  let Some(s) = s.strip_suffix('\u{0001}') else {
    return (input, false);
  };
  (s, true)
}

/// Value of a named capture group, or an empty string if it did not participate in the match.
fn group<'t>(captures: &Captures<'t>, name: &str) -> &'t str {
  captures.name(name).map_or("", |m| m.as_str())
}

fn parse_group<T: FromStr>(
  captures: &Captures<'_>,
  name: &'static str,
) -> Result<T, MessageParseError> {
  let value = group(captures, name);
  value.parse().map_err(|_| MessageParseError::InvalidField {
    field: name,
    value: value.to_owned(),
  })
}

fn parse_timestamp(tags: &Tags, key: &'static str) -> Result<DateTime<Utc>, MessageParseError> {
  let millis: i64 = tags.parse_required(key)?;
  Utc
    .timestamp_millis_opt(millis)
    .single()
    .ok_or_else(|| MessageParseError::InvalidTag {
      tag: key,
      value: millis.to_string(),
    })
}

fn parse_message_id(tags: &Tags, key: &'static str) -> Result<Option<Uuid>, MessageParseError> {
  tags.parse_opt(key)
}

fn parse_emotes(tags: &Tags) -> Result<Vec<crate::common::Emote>, MessageParseError> {
  let value = tags.get("emotes").unwrap_or("");
  crate::common::parse_emotes(value).ok_or_else(|| MessageParseError::InvalidTag {
    tag: "emotes",
    value: value.to_owned(),
  })
}

fn parse_badges(tags: &Tags, key: &str) -> crate::common::Badges {
  crate::common::Badges::parse(tags.get(key).unwrap_or(""))
}

fn parse_color(tags: &Tags) -> Option<String> {
  tags.value("color").map(String::from)
}

pub mod capability;
pub use capability::*;
pub mod clear_chat;
pub use clear_chat::*;
pub mod clear_msg;
pub use clear_msg::*;
pub mod global_user_state;
pub use global_user_state::*;
pub mod host_target;
pub use host_target::*;
pub mod join;
pub use join::*;
pub mod names;
pub use names::*;
pub mod notice;
pub use notice::*;
pub mod part;
pub use part::*;
pub mod ping;
pub use ping::*;
pub mod privmsg;
pub use privmsg::*;
pub mod reconnect;
pub use reconnect::*;
pub mod room_state;
pub use room_state::*;
pub mod unknown_command;
pub use unknown_command::*;
pub mod user_notice;
pub use user_notice::*;
pub mod user_state;
pub use user_state::*;
pub mod welcome;
pub use welcome::*;

mod private {
  pub trait Sealed {}
}

static_assert_send!(Message);
static_assert_sync!(Message);
