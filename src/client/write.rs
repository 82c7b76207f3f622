use super::util::{channel_name, strip_crlf};
use super::{conn, Client, ConnectionState};
use std::fmt::Display;
use tokio::io;
use tokio::io::{AsyncWriteExt, WriteHalf};

pub type WriteStream = WriteHalf<conn::Stream>;

impl Client {
  /// Send a raw line. Trailing CR/LF is replaced with a single CRLF.
  pub async fn send(&mut self, line: &str) -> Result<(), WriteError> {
    let line = strip_crlf(line);
    if !line.starts_with("PASS") {
      debug!("< {line}");
    }
    self.writer.write_all(line.as_bytes()).await?;
    self.writer.write_all(b"\r\n").await?;
    self.writer.flush().await?;
    Ok(())
  }

  /// Join `channel`, unless it is already active or is the bot's own channel.
  pub async fn join(&mut self, channel: &str) -> Result<(), WriteError> {
    let channel = channel_name(channel);
    if self.is_own(channel) || self.channels.contains(channel) {
      return Ok(());
    }
    self.send(&format!("JOIN #{channel}")).await?;
    self.channels.insert(channel.to_owned());
    self.state = ConnectionState::ChannelsJoined;
    Ok(())
  }

  /// Leave `channel`, unless it is not active or is the bot's own channel.
  pub async fn part(&mut self, channel: &str) -> Result<(), WriteError> {
    let channel = channel_name(channel);
    if self.is_own(channel) || !self.channels.contains(channel) {
      return Ok(());
    }
    self.send(&format!("PART #{channel}")).await?;
    self.channels.remove(channel);
    if self.channels.is_empty() {
      self.state = ConnectionState::SelfJoined;
    }
    Ok(())
  }

  /// Send `text` to `channel`.
  ///
  /// The message is silently dropped if `channel` is not active.
  pub async fn privmsg(&mut self, channel: &str, text: &str) -> Result<(), WriteError> {
    let channel = channel_name(channel);
    if !self.is_active(channel) {
      trace!(channel, "dropping message to inactive channel");
      return Ok(());
    }
    self.send(&format!("PRIVMSG #{channel} :{text}")).await
  }

  /// Reply to a [`Ping`][crate::msg::Ping].
  pub async fn pong(&mut self, server: &str) -> Result<(), WriteError> {
    self.send(&format!("PONG :{server}")).await
  }
}

#[derive(Debug)]
pub enum WriteError {
  Io(io::Error),
  StreamClosed,
}

impl From<io::Error> for WriteError {
  fn from(value: io::Error) -> Self {
    match value.kind() {
      io::ErrorKind::BrokenPipe => Self::StreamClosed,
      _ => Self::Io(value),
    }
  }
}

impl Display for WriteError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      WriteError::Io(e) => write!(f, "failed to write message: {e}"),
      WriteError::StreamClosed => write!(f, "failed to write message: stream closed"),
    }
  }
}

impl std::error::Error for WriteError {}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::client::tests::connected;

  #[tokio::test]
  async fn join_and_part_are_idempotent() {
    let (mut client, mut server) = connected("archiemate").await;

    client.join("wtii").await.unwrap();
    client.join("#wtii").await.unwrap();
    assert_eq!(client.state(), ConnectionState::ChannelsJoined);
    assert!(client.is_active("wtii"));

    client.part("wtii").await.unwrap();
    client.part("wtii").await.unwrap();
    assert_eq!(client.state(), ConnectionState::SelfJoined);
    assert!(!client.is_active("wtii"));

    client.pong("tmi.twitch.tv").await.unwrap();

    server.expect("JOIN #wtii").await;
    server.expect("PART #wtii").await;
    server.expect("PONG :tmi.twitch.tv").await;
  }

  #[tokio::test]
  async fn own_channel_is_never_joined_or_parted() {
    let (mut client, mut server) = connected("archiemate").await;
    client.join("archiemate").await.unwrap();
    client.part("archiemate").await.unwrap();
    client.privmsg("archiemate", "hi").await.unwrap();
    server.expect("PRIVMSG #archiemate :hi").await;
    assert_eq!(client.channels().count(), 0);
  }

  #[tokio::test]
  async fn privmsg_to_inactive_channel_is_dropped() {
    let (mut client, mut server) = connected("archiemate").await;
    client.privmsg("wtii", "dropped").await.unwrap();
    client.join("wtii").await.unwrap();
    client.privmsg("wtii", "sent").await.unwrap();
    server.expect("JOIN #wtii").await;
    server.expect("PRIVMSG #wtii :sent").await;
  }

  #[tokio::test]
  async fn send_normalizes_line_endings() {
    let (mut client, mut server) = connected("archiemate").await;
    client.send("PRIVMSG #archiemate :a\r\n").await.unwrap();
    client.send("PRIVMSG #archiemate :b\n").await.unwrap();
    server.expect("PRIVMSG #archiemate :a").await;
    server.expect("PRIVMSG #archiemate :b").await;
  }
}
