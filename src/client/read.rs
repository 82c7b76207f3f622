use super::util::{strip_crlf, Timeout};
use super::{conn, Client};
use futures_util::stream::Fuse;
use std::fmt::Display;
use tokio::io;
use tokio::io::{BufReader, ReadHalf};
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;

pub type ReadStream = Fuse<LinesStream<BufReader<ReadHalf<conn::Stream>>>>;

impl Client {
  /// Read the next line, waiting at most [`Config::idle`][super::Config::idle].
  ///
  /// Returns `Ok(None)` if no line arrived in time, or if the line was empty or not valid UTF-8.
  /// This gives the caller a chance to observe cancellation between reads.
  pub async fn recv(&mut self) -> Result<Option<String>, RecvError> {
    let idle = self.config.idle;
    match self.reader.next().timeout(idle).await {
      Err(_) => Ok(None),
      Ok(None) => Err(RecvError::StreamClosed),
      Ok(Some(line)) => {
        let Some(line) = skip_invalid(line)? else {
          return Ok(None);
        };
        let line = strip_crlf(&line);
        if line.is_empty() {
          return Ok(None);
        }
        debug!("> {line}");
        Ok(Some(line.to_owned()))
      }
    }
  }

  /// Read the next non-empty line, however long it takes.
  pub async fn recv_now(&mut self) -> Result<String, RecvError> {
    loop {
      let Some(line) = self.reader.next().await else {
        return Err(RecvError::StreamClosed);
      };
      let Some(line) = skip_invalid(line)? else {
        continue;
      };
      let line = strip_crlf(&line);
      if !line.is_empty() {
        debug!("> {line}");
        return Ok(line.to_owned());
      }
    }
  }
}

/// A line which is not valid UTF-8 has already been consumed by the reader, so only that line is lost.
fn skip_invalid(line: io::Result<String>) -> Result<Option<String>, RecvError> {
  match line {
    Ok(line) => Ok(Some(line)),
    Err(e) if e.kind() == io::ErrorKind::InvalidData => {
      warn!("skipping invalid line: {e}");
      Ok(None)
    }
    Err(e) => Err(e.into()),
  }
}

/// Failed to receive a message.
#[derive(Debug)]
pub enum RecvError {
  /// The underlying I/O operation failed.
  Io(io::Error),

  /// The stream was closed.
  StreamClosed,
}

impl RecvError {
  /// Returns `true` if this `recv` failed due to a disconnect of some kind.
  pub fn is_disconnect(&self) -> bool {
    match self {
      RecvError::StreamClosed => true,
      RecvError::Io(e)
        if matches!(
          e.kind(),
          io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::TimedOut
        ) =>
      {
        true
      }
      _ => false,
    }
  }
}

impl From<io::Error> for RecvError {
  fn from(value: io::Error) -> Self {
    Self::Io(value)
  }
}

impl Display for RecvError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      RecvError::Io(e) => write!(f, "failed to read message: {e}"),
      RecvError::StreamClosed => write!(f, "failed to read message: stream closed"),
    }
  }
}

impl std::error::Error for RecvError {}
