use std::future::Future;
use std::time::Duration;

pub trait Timeout: Sized {
  fn timeout(self, duration: Duration) -> tokio::time::Timeout<Self>;
}

impl<F> Timeout for F
where
  F: Future,
{
  fn timeout(self, duration: Duration) -> tokio::time::Timeout<Self> {
    tokio::time::timeout(duration, self)
  }
}

/// The lines Twitch sends after a successful `PASS`/`NICK`, in order.
pub fn welcome_lines(nick: &str) -> [String; 7] {
  [
    (1, "Welcome, GLHF!"),
    (2, "Your host is tmi.twitch.tv"),
    (3, "This server is rather new"),
    (4, "-"),
    (375, "-"),
    (372, "You are in a maze of twisty passages, all alike."),
    (376, ">"),
  ]
  .map(|(code, text)| format!(":tmi.twitch.tv {code:03} {nick} :{text}"))
}

pub fn strip_crlf(line: &str) -> &str {
  line.trim_end_matches(['\r', '\n'])
}

/// Channel name without the leading `#`.
pub fn channel_name(channel: &str) -> &str {
  channel.strip_prefix('#').unwrap_or(channel)
}
