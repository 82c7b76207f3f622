//! Recent chat messages, per channel.

use crate::msg::Privmsg;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedMessage {
  pub id: Uuid,

  /// Display name of the sender.
  pub sender: String,

  pub text: String,

  pub timestamp: DateTime<Utc>,
}

impl From<&Privmsg> for CachedMessage {
  fn from(msg: &Privmsg) -> Self {
    Self {
      id: msg.message_id(),
      sender: msg.sender().name().into(),
      text: msg.text().into(),
      timestamp: msg.timestamp(),
    }
  }
}

/// Time-ordered buffers of recent messages, keyed by channel name.
#[derive(Debug, Default)]
pub struct MessageCache {
  channels: HashMap<String, Vec<CachedMessage>>,
}

impl MessageCache {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert `message`, keeping the buffer ordered by timestamp.
  pub fn push(&mut self, channel: &str, message: CachedMessage) {
    let messages = self.channels.entry(channel.to_owned()).or_default();
    let at = messages.partition_point(|m| m.timestamp <= message.timestamp);
    messages.insert(at, message);
  }

  /// The newest message in `channel`.
  pub fn latest(&self, channel: &str) -> Option<&CachedMessage> {
    self.channels.get(channel)?.last()
  }

  /// Messages in `channel` which are newer than the message `id`.
  ///
  /// Returns [`None`] if `id` is not in the cache.
  pub fn since(&self, channel: &str, id: Uuid) -> Option<&[CachedMessage]> {
    let messages = self.channels.get(channel)?;
    let from = messages.iter().find(|m| m.id == id)?;
    let start = messages.partition_point(|m| m.timestamp <= from.timestamp);
    Some(&messages[start..])
  }

  /// Remove messages which are at least `max_age` old at `now`.
  ///
  /// The newest message of a channel is always kept.
  /// Returns the number of removed messages.
  pub fn prune(&mut self, now: DateTime<Utc>, max_age: Duration) -> usize {
    let Ok(max_age) = chrono::Duration::from_std(max_age) else {
      return 0;
    };
    let cutoff = now - max_age;

    let mut removed = 0;
    for messages in self.channels.values_mut() {
      let stale = messages.partition_point(|m| m.timestamp <= cutoff);
      let stale = stale.min(messages.len().saturating_sub(1));
      messages.drain(..stale);
      removed += stale;
    }
    removed
  }

  pub fn len(&self, channel: &str) -> usize {
    self.channels.get(channel).map_or(0, Vec::len)
  }
}

pub type SharedCache = Arc<Mutex<MessageCache>>;

/// Shorter prune intervals are raised to this.
pub const MIN_PRUNE_INTERVAL: Duration = Duration::from_secs(1);

/// Prune `cache` every `interval`, until the returned task is aborted.
pub fn spawn_pruner(cache: SharedCache, interval: Duration, max_age: Duration) -> JoinHandle<()> {
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(interval.max(MIN_PRUNE_INTERVAL));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
      ticker.tick().await;
      let removed = cache
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .prune(Utc::now(), max_age);
      if removed > 0 {
        trace!(removed, "pruned message cache");
      }
    }
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn message(n: u128, secs: i64) -> CachedMessage {
    CachedMessage {
      id: Uuid::from_u128(n),
      sender: "ronni".into(),
      text: format!("message {n}"),
      timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
    }
  }

  #[test]
  fn push_keeps_time_order() {
    let mut cache = MessageCache::new();
    cache.push("wtii", message(1, 10));
    cache.push("wtii", message(3, 30));
    cache.push("wtii", message(2, 20));
    assert_eq!(cache.latest("wtii").unwrap().id, Uuid::from_u128(3));
    assert_eq!(cache.latest("thijs"), None);
  }

  #[test]
  fn messages_since() {
    let mut cache = MessageCache::new();
    for (n, secs) in [(1, 10), (2, 20), (3, 30)] {
      cache.push("wtii", message(n, secs));
    }
    let since: Vec<_> = cache
      .since("wtii", Uuid::from_u128(1))
      .unwrap()
      .iter()
      .map(|m| m.id)
      .collect();
    assert_eq!(since, [Uuid::from_u128(2), Uuid::from_u128(3)]);
    assert_eq!(cache.since("wtii", Uuid::from_u128(3)).unwrap().len(), 0);
    assert!(cache.since("wtii", Uuid::from_u128(9)).is_none());
  }

  #[test]
  fn prune_removes_old_messages() {
    let mut cache = MessageCache::new();
    for (n, secs) in [(1, 0), (2, 80), (3, 100)] {
      cache.push("wtii", message(n, secs));
    }
    let now = Utc.timestamp_opt(120, 0).unwrap();
    assert_eq!(cache.prune(now, Duration::from_secs(60)), 1);
    assert_eq!(cache.len("wtii"), 2);
  }

  #[test]
  fn prune_keeps_the_newest_message() {
    let mut cache = MessageCache::new();
    cache.push("wtii", message(1, 0));
    cache.push("wtii", message(2, 10));
    let now = Utc.timestamp_opt(1000, 0).unwrap();
    assert_eq!(cache.prune(now, Duration::from_secs(60)), 1);
    assert_eq!(cache.len("wtii"), 1);
    assert_eq!(cache.latest("wtii").unwrap().id, Uuid::from_u128(2));
  }

  #[tokio::test(start_paused = true)]
  async fn pruner_runs_on_interval() {
    let cache = SharedCache::default();
    {
      let mut cache = cache.lock().unwrap();
      cache.push("wtii", message(1, 0));
      cache.push("wtii", message(2, 1));
    }
    let pruner = spawn_pruner(cache.clone(), Duration::from_secs(60), Duration::from_secs(60));
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(cache.lock().unwrap().len("wtii"), 1);
    pruner.abort();
  }

  #[tokio::test(start_paused = true)]
  async fn pruner_with_zero_interval() {
    let cache = SharedCache::default();
    {
      let mut cache = cache.lock().unwrap();
      cache.push("wtii", message(1, 0));
      cache.push("wtii", message(2, 1));
    }
    let pruner = spawn_pruner(cache.clone(), Duration::ZERO, Duration::from_secs(60));
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(cache.lock().unwrap().len("wtii"), 1);
    assert!(!pruner.is_finished());
    pruner.abort();
  }
}
