use std::collections::BTreeMap;

/// Names of the badges known to be sent by Twitch.
///
/// Badges outside of this list are still decoded, this only exists for convenient lookups.
pub mod badge {
  pub const ADMIN: &str = "admin";
  pub const BITS: &str = "bits";
  pub const BITS_CHARITY: &str = "bits-charity";
  pub const BROADCASTER: &str = "broadcaster";
  pub const FOUNDER: &str = "founder";
  pub const GLHF_PLEDGE: &str = "glhf-pledge";
  pub const GLITCHCON_2020: &str = "glitchcon2020";
  pub const HYPE_TRAIN: &str = "hype-train";
  pub const MODERATOR: &str = "moderator";
  pub const MOMENTS: &str = "moments";
  pub const NO_AUDIO: &str = "no_audio";
  pub const NO_VIDEO: &str = "no_video";
  pub const OVERWATCH_LEAGUE_INSIDER_2019A: &str = "overwatch-league-insider_2019A";
  pub const PARTNER: &str = "partner";
  pub const PREDICTIONS: &str = "predictions";
  pub const PREMIUM: &str = "premium";
  pub const STAFF: &str = "staff";
  pub const SUB_GIFTER: &str = "sub-gifter";
  pub const SUBSCRIBER: &str = "subscriber";
  pub const TURBO: &str = "turbo";
  pub const VIP: &str = "vip";
}

/// Badges of a chat user, mapping the badge name to its version.
///
/// The same type is used for the `badge-info` tag, where the value holds
/// extra info such as the exact number of subscribed months.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Badges(BTreeMap<String, String>);

impl Badges {
  /// Parse badges from their raw form, e.g. `moderator/1,subscriber/12`.
  pub fn parse(src: &str) -> Badges {
    Badges(
      src
        .split(',')
        .filter_map(|badge| badge.split_once('/'))
        .map(|(name, version)| (name.to_owned(), version.to_owned()))
        .collect(),
    )
  }

  /// Version of the badge called `name`.
  pub fn get(&self, name: &str) -> Option<&str> {
    self.0.get(name).map(String::as_str)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.0.contains_key(name)
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

  /// Whether the badges grant channel management privileges.
  pub fn is_privileged(&self) -> bool {
    self.contains(badge::MODERATOR) || self.contains(badge::BROADCASTER)
  }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Badges {
  fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
    Badges(
      iter
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect(),
    )
  }
}
