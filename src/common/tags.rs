use super::maybe_unescape;
use crate::msg::MessageParseError;
use std::collections::HashMap;
use std::str::FromStr;

/// Tags attached to a chat line.
///
/// Parsed from the `;`-delimited prefix of a line, e.g.
/// `badge-info=;badges=turbo/1;color=#0D4200`. Each entry is split at the first `=`,
/// and values are unescaped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tags(HashMap<String, String>);

impl Tags {
  /// Parse tags from their raw form.
  ///
  /// A leading `@` is accepted and ignored. An entry without `=` is stored with an empty value.
  pub fn parse(src: &str) -> Tags {
    let src = src.strip_prefix('@').unwrap_or(src);
    Tags(
      src
        .split(';')
        .filter(|tag| !tag.is_empty())
        .map(|tag| match tag.split_once('=') {
          Some((key, value)) => (key.to_owned(), maybe_unescape(value).into_owned()),
          None => (tag.to_owned(), String::new()),
        })
        .collect(),
    )
  }

  /// Get the value of `key`, if present.
  pub fn get(&self, key: &str) -> Option<&str> {
    self.0.get(key).map(String::as_str)
  }

  pub fn contains(&self, key: &str) -> bool {
    self.0.contains_key(key)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  /// The value of `key`, treating an empty value as absent.
  pub(crate) fn value(&self, key: &str) -> Option<&str> {
    self.get(key).filter(|v| !v.is_empty())
  }

  /// The value of `key`, which must be present.
  pub(crate) fn require(&self, key: &'static str) -> Result<&str, MessageParseError> {
    self.get(key).ok_or(MessageParseError::MissingTag(key))
  }

  /// Parse the value of `key`. Absent and empty values are [`None`].
  pub(crate) fn parse_opt<T: FromStr>(
    &self,
    key: &'static str,
  ) -> Result<Option<T>, MessageParseError> {
    self
      .value(key)
      .map(|value| {
        value.parse().map_err(|_| MessageParseError::InvalidTag {
          tag: key,
          value: value.to_owned(),
        })
      })
      .transpose()
  }

  /// Parse the value of `key`, which must be present and valid.
  pub(crate) fn parse_required<T: FromStr>(&self, key: &'static str) -> Result<T, MessageParseError> {
    let value = self.require(key)?;
    value.parse().map_err(|_| MessageParseError::InvalidTag {
      tag: key,
      value: value.to_owned(),
    })
  }

  /// `true` only if the value of `key` is exactly `1`.
  pub(crate) fn flag(&self, key: &str) -> bool {
    self.get(key) == Some("1")
  }

  /// Like [`Tags::flag`], but absent and empty values are [`None`].
  pub(crate) fn opt_flag(&self, key: &str) -> Option<bool> {
    self.value(key).map(|v| v == "1")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_tags() {
    let tags = Tags::parse("@badge-info=;badges=turbo/1;color=#0D4200;display-name=ronni");
    assert_eq!(tags.len(), 4);
    assert_eq!(tags.get("badge-info"), Some(""));
    assert_eq!(tags.get("badges"), Some("turbo/1"));
    assert_eq!(tags.get("color"), Some("#0D4200"));
    assert_eq!(tags.get("display-name"), Some("ronni"));
    assert_eq!(tags.get("user-id"), None);
  }

  #[test]
  fn parse_splits_at_first_equals() {
    let tags = Tags::parse("a=b=c;flags");
    assert_eq!(tags.get("a"), Some("b=c"));
    assert_eq!(tags.get("flags"), Some(""));
  }

  #[test]
  fn parse_unescapes_values() {
    let tags = Tags::parse(r"system-msg=ronni\shas\ssubscribed;msg-param-sub-plan-name=House\sof\sNyoro~n");
    assert_eq!(tags.get("system-msg"), Some("ronni has subscribed"));
    assert_eq!(tags.get("msg-param-sub-plan-name"), Some("House of Nyoro~n"));
  }

  #[test]
  fn required_and_optional_values() {
    let tags = Tags::parse("room-id=1337;slow=;followers-only=-1;bits=abc;emote-only=1");
    assert_eq!(tags.parse_required::<u64>("room-id").unwrap(), 1337);
    assert_eq!(tags.parse_opt::<u64>("slow").unwrap(), None);
    assert_eq!(tags.parse_opt::<i64>("followers-only").unwrap(), Some(-1));
    assert!(matches!(
      tags.parse_opt::<u64>("bits"),
      Err(MessageParseError::InvalidTag { tag: "bits", .. })
    ));
    assert!(matches!(
      tags.require("user-id"),
      Err(MessageParseError::MissingTag("user-id"))
    ));
    assert!(tags.flag("emote-only"));
    assert!(!tags.flag("r9k"));
    assert_eq!(tags.opt_flag("emote-only"), Some(true));
    assert_eq!(tags.opt_flag("slow"), None);
  }
}
