use super::Config;
use std::fmt::Display;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::rustls::client::InvalidDnsNameError;
use tokio_rustls::rustls::{ClientConfig, RootCertStore, ServerName};
use tokio_rustls::{rustls, TlsConnector};

/// Anything the client can talk to Twitch over.
pub trait Io: AsyncRead + AsyncWrite + Send + Sync + Unpin {}

impl<T> Io for T where T: AsyncRead + AsyncWrite + Send + Sync + Unpin {}

pub type Stream = Box<dyn Io>;

/// Open a TCP stream to the configured host, wrapped in TLS if enabled.
pub async fn open(config: &Config) -> Result<Stream, OpenStreamError> {
  let tcp = TcpStream::connect((config.host.as_str(), config.port)).await?;
  if !config.tls {
    return Ok(Box::new(tcp));
  }

  let tls = TlsConfig::load(ServerName::try_from(config.host.as_str())?)?;
  trace!(?tls, "opening tls stream to twitch");
  let stream = TlsConnector::from(tls.client())
    .connect(tls.server_name(), tcp)
    .await?;
  Ok(Box::new(stream))
}

/// Failed to open a stream.
#[derive(Debug)]
pub enum OpenStreamError {
  /// The underlying I/O operation failed.
  Io(io::Error),

  /// The host is not a valid DNS name.
  Dns(InvalidDnsNameError),

  /// Failed to set up TLS.
  Tls(TlsConfigError),
}

impl From<io::Error> for OpenStreamError {
  fn from(value: io::Error) -> Self {
    Self::Io(value)
  }
}

impl From<InvalidDnsNameError> for OpenStreamError {
  fn from(value: InvalidDnsNameError) -> Self {
    Self::Dns(value)
  }
}

impl From<TlsConfigError> for OpenStreamError {
  fn from(value: TlsConfigError) -> Self {
    Self::Tls(value)
  }
}

impl Display for OpenStreamError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      OpenStreamError::Io(e) => write!(f, "failed to open stream: {e}"),
      OpenStreamError::Dns(e) => write!(f, "failed to open stream: {e}"),
      OpenStreamError::Tls(e) => write!(f, "failed to open stream: {e}"),
    }
  }
}

impl std::error::Error for OpenStreamError {}

#[derive(Debug, Clone)]
pub struct TlsConfig {
  config: Arc<ClientConfig>,
  server_name: ServerName,
}

impl TlsConfig {
  pub fn load(server_name: ServerName) -> Result<Self, TlsConfigError> {
    trace!("loading native certificates");
    let mut root_store = RootCertStore::empty();
    for cert in rustls_native_certs::load_native_certs()? {
      root_store.add(&rustls::Certificate(cert.0))?;
    }
    let config = rustls::ClientConfig::builder()
      .with_safe_defaults()
      .with_root_certificates(root_store)
      .with_no_client_auth();
    Ok(Self {
      config: Arc::new(config),
      server_name,
    })
  }

  pub fn client(&self) -> Arc<ClientConfig> {
    self.config.clone()
  }

  pub fn server_name(&self) -> ServerName {
    self.server_name.clone()
  }
}

/// Failed to load the TLS config.
#[derive(Debug)]
pub enum TlsConfigError {
  /// The underlying I/O operation failed.
  Io(io::Error),
  /// Failed to load certificates.
  Tls(rustls::Error),
}

impl From<io::Error> for TlsConfigError {
  fn from(value: io::Error) -> Self {
    Self::Io(value)
  }
}

impl From<rustls::Error> for TlsConfigError {
  fn from(value: rustls::Error) -> Self {
    Self::Tls(value)
  }
}

impl Display for TlsConfigError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      TlsConfigError::Io(e) => write!(f, "tls config error: {e}"),
      TlsConfigError::Tls(e) => write!(f, "tls config error: {e}"),
    }
  }
}

impl std::error::Error for TlsConfigError {}
