//! Replies to a channel join listing the users currently in chat.

use super::{group, FromLine, MessageParseError};
use regex::{Captures, Regex};

/// A batch of users present in a channel (`353`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamesList {
  /// Login of the bot which received the list.
  pub bot: String,

  pub channel: String,

  /// Logins of the users in chat.
  pub users: Vec<String>,
}

impl FromLine for NamesList {
  fn pattern() -> &'static Regex {
    pattern!(r"^:(?P<bot>\S+)\.tmi\.twitch\.tv\s353\s\S+\s=\s#?(?P<channel>\S+)\s:(?P<users>.*)")
  }

  fn from_captures(captures: &Captures<'_>) -> Result<Self, MessageParseError> {
    Ok(NamesList {
      bot: group(captures, "bot").into(),
      channel: group(captures, "channel").into(),
      users: group(captures, "users")
        .split(' ')
        .filter(|user| !user.is_empty())
        .map(String::from)
        .collect(),
    })
  }
}

impl_into_message!(NamesList);

/// Sent after the last [`NamesList`] of a channel (`366`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndOfNamesList {
  pub bot: String,
  pub channel: String,
  pub text: String,
}

impl FromLine for EndOfNamesList {
  fn pattern() -> &'static Regex {
    pattern!(r"^:(?P<bot>\S+)\.tmi\.twitch\.tv\s366\s\S+\s#?(?P<channel>\S+)\s:(?P<text>.*)")
  }

  fn from_captures(captures: &Captures<'_>) -> Result<Self, MessageParseError> {
    Ok(EndOfNamesList {
      bot: group(captures, "bot").into(),
      channel: group(captures, "channel").into(),
      text: group(captures, "text").into(),
    })
  }
}

impl_into_message!(EndOfNamesList);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_names_list() {
    let names = decode!(
      NamesList,
      ":archiemate.tmi.twitch.tv 353 archiemate = #wtii :rifmopen4 babypills streamelements sp4rta wtii archiemate djavan61 millocz nightbot moobot"
    );
    assert_eq!(names.bot, "archiemate");
    assert_eq!(names.channel, "wtii");
    assert_eq!(names.users.len(), 10);
    assert_eq!(names.users[0], "rifmopen4");
    assert_eq!(names.users[9], "moobot");
  }

  #[test]
  fn parse_end_of_names_list() {
    let end = decode!(
      EndOfNamesList,
      ":archiemate.tmi.twitch.tv 366 archiemate #wtii :End of /NAMES list"
    );
    assert_eq!(end.bot, "archiemate");
    assert_eq!(end.channel, "wtii");
    assert_eq!(end.text, "End of /NAMES list");
  }
}
