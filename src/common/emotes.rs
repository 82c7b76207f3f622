/// Position of an emote within the text of a message.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Emote {
  /// ID of the emote.
  pub id: String,

  /// Offset of the first character of the emote.
  pub start: usize,

  /// Number of characters covered by the emote.
  pub length: usize,
}

impl Emote {
  pub fn new(id: impl Into<String>, start: usize, length: usize) -> Self {
    Self {
      id: id.into(),
      start,
      length,
    }
  }
}

/// Parse the `emotes` tag, e.g. `25:0-4,12-16/1902:6-10`.
///
/// Positions are returned in the order they appear in the tag.
/// Returns [`None`] if any block or range is malformed.
pub fn parse_emotes(src: &str) -> Option<Vec<Emote>> {
  let mut out = Vec::new();
  for block in src.split('/').filter(|b| !b.is_empty()) {
    let (id, positions) = block.split_once(':')?;
    for range in positions.split(',') {
      let (start, end) = range.split_once('-')?;
      let start: usize = start.parse().ok()?;
      let end: usize = end.parse().ok()?;
      let length = end.checked_sub(start)?.checked_add(1)?;
      out.push(Emote::new(id, start, length));
    }
  }
  Some(out)
}

/// Parse the `emote-sets` tag, e.g. `0,33,50,237`.
pub fn parse_emote_sets(src: &str) -> Vec<String> {
  src
    .split(',')
    .filter(|s| !s.is_empty())
    .map(String::from)
    .collect()
}
