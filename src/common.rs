//! Decoders for the metadata attached to chat lines.
//!
//! These are pure functions over the raw substrings captured by the message patterns:
//! - [`Tags`] from the `@key=value;...` prefix,
//! - [`Badges`] from the `badges` and `badge-info` tags,
//! - [`Emote`] positions from the `emotes` tag.

pub mod badges;
pub mod emotes;
pub mod tags;

pub use badges::Badges;
pub use emotes::{parse_emote_sets, parse_emotes, Emote};
pub use tags::Tags;

use std::borrow::Cow;

/// Checks if `value` needs to be unescaped by looking for escaped characters.
///
/// If it must be unescaped, then it must reallocate and will return an owned string.
/// Otherwise, it returns a borrow of the original `value`.
///
/// Escapes follow the IRCv3 tag rules:
///
/// | escaped | unescaped |
/// |---------|-----------|
/// | `\:`    | `;`       |
/// | `\s`    | space     |
/// | `\\`    | `\`       |
/// | `\r`    | CR        |
/// | `\n`    | LF        |
///
/// Any other escaped character is kept as-is, without the backslash.
pub fn maybe_unescape<'a>(value: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
  let value: Cow<'_, str> = value.into();
  match value.find('\\') {
    Some(start) => Cow::Owned(actually_unescape(&value, start)),
    None => value,
  }
}

#[inline]
fn actually_unescape(input: &str, start: usize) -> String {
  let mut out = String::with_capacity(input.len());
  out.push_str(&input[..start]);

  let mut escape = false;
  for char in input[start..].chars() {
    if !escape {
      match char {
        '\\' => escape = true,
        c => out.push(c),
      }
      continue;
    }

    escape = false;
    out.push(match char {
      ':' => ';',
      's' => ' ',
      'r' => '\r',
      'n' => '\n',
      c => c,
    });
  }

  out
}
