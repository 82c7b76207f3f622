use super::{group, FromLine, MessageParseError};
use regex::{Captures, Regex};

/// Sent when the server does not support a command sent by the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownCommand {
  /// Login of the user which sent the command.
  pub user: String,

  /// The unsupported command.
  pub command: String,

  pub text: String,
}

impl FromLine for UnknownCommand {
  fn pattern() -> &'static Regex {
    pattern!(r"^:tmi\.twitch\.tv\s421\s(?P<user>\S+)\s(?P<command>\S+)\s:(?P<text>.*)")
  }

  fn from_captures(captures: &Captures<'_>) -> Result<Self, MessageParseError> {
    Ok(UnknownCommand {
      user: group(captures, "user").into(),
      command: group(captures, "command").into(),
      text: group(captures, "text").into(),
    })
  }
}

impl_into_message!(UnknownCommand);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_unknown_command() {
    let msg = decode!(UnknownCommand, ":tmi.twitch.tv 421 archiemate WHO :Unknown command");
    assert_eq!(msg.user, "archiemate");
    assert_eq!(msg.command, "WHO");
    assert_eq!(msg.text, "Unknown command");
  }
}
