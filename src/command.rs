//! Parsing of chat text into a command invocation.

use regex::Regex;
use std::sync::LazyLock;

static PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"^(?P<chatters1>(?:@\w+\s*,??\s*?)*?)!(?P<command>\w+)\s*(?:(?P<chatters2>(?:@\w+\s*?,??\s*)*)(?:\s(?P<parameters>.*)?)?)?$",
  )
  .unwrap()
});

/// A command invocation, e.g. `@a, @b !hug @c with love`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandDetail {
  /// Mentioned users, in the order they appear, including the `@`.
  ///
  /// Mentions before the command come first. Repeats are kept.
  pub chatters: Vec<String>,

  /// Name of the command, without the `!`. Not normalized.
  pub name: String,

  /// Free text following the command and any mentions after it.
  pub parameters: String,
}

impl CommandDetail {
  /// Parse `text`. Returns [`None`] if it does not contain a command.
  pub fn parse(text: &str) -> Option<CommandDetail> {
    let captures = PATTERN.captures(text)?;
    let group = |name: &str| captures.name(name).map_or("", |m| m.as_str());

    Some(CommandDetail {
      chatters: [group("chatters1"), group("chatters2")]
        .into_iter()
        .flat_map(|mentions| mentions.split(|c: char| c == ',' || c.is_whitespace()))
        .filter(|chatter| !chatter.is_empty())
        .map(String::from)
        .collect(),
      name: group("command").into(),
      parameters: group("parameters").into(),
    })
  }

  /// Whether this invokes `name`, ignoring case.
  pub fn is(&self, name: &str) -> bool {
    self.name.eq_ignore_ascii_case(name)
  }
}
