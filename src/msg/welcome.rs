use super::{group, parse_group, FromLine, MessageParseError};
use regex::{Captures, Regex};

/// One of the numeric lines sent after a successful login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Welcome {
  /// Numeric reply code, e.g. `1` for `001`.
  pub code: u16,

  /// Login of the authenticated user.
  pub user: String,

  pub text: String,
}

impl FromLine for Welcome {
  fn pattern() -> &'static Regex {
    pattern!(r"^:tmi\.twitch\.tv\s(?P<code>\d{3})\s(?P<user>\S+)\s:(?P<text>.*)")
  }

  fn from_captures(captures: &Captures<'_>) -> Result<Self, MessageParseError> {
    Ok(Welcome {
      code: parse_group(captures, "code")?,
      user: group(captures, "user").into(),
      text: group(captures, "text").into(),
    })
  }
}

impl_into_message!(Welcome);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_welcome_sequence() {
    let cases = [
      (":tmi.twitch.tv 001 archiemate :Welcome, GLHF!", 1, "Welcome, GLHF!"),
      (":tmi.twitch.tv 002 archiemate :Your host is tmi.twitch.tv", 2, "Your host is tmi.twitch.tv"),
      (":tmi.twitch.tv 003 archiemate :This server is rather new", 3, "This server is rather new"),
      (":tmi.twitch.tv 004 archiemate :-", 4, "-"),
      (":tmi.twitch.tv 375 archiemate :-", 375, "-"),
      (":tmi.twitch.tv 372 archiemate :You are in a maze of twisty passages, all alike.", 372, "You are in a maze of twisty passages, all alike."),
      (":tmi.twitch.tv 376 archiemate :>", 376, ">"),
    ];
    for (line, code, text) in cases {
      let welcome = decode!(Welcome, line);
      assert_eq!(welcome.code, code);
      assert_eq!(welcome.user, "archiemate");
      assert_eq!(welcome.text, text);
    }
  }
}
