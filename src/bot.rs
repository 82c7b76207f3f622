//! The receive loop which answers chat commands.

use crate::builtin;
use crate::cache::{self, CachedMessage, SharedCache};
use crate::client::read::RecvError;
use crate::client::util::channel_name;
use crate::client::write::WriteError;
use crate::client::{Backoff, Config, ConnectError, DEFAULT_BACKOFF};
use crate::command::CommandDetail;
use crate::expand::expand;
use crate::msg::{Message, Privmsg, RoomState};
use crate::store::{Channel, Store};
use crate::{Client, Credentials};
use std::sync::{Arc, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;

pub const DEFAULT_COMMANDS_URL: &str = "https://archiemate.com/tables/commands";
pub const DEFAULT_CACHE_MAX_AGE: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_CACHE_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

enum Request {
  Join { channel: String },
  Leave { channel: String },
  Say { channel: String, text: String },
  Stop,
}

/// A handle to a running [`Bot`].
///
/// Requests are queued and handled by the receive loop between chat lines.
#[derive(Clone)]
pub struct Context {
  inner: mpsc::UnboundedSender<Request>,
}

static_assert_send!(Context);
static_assert_sync!(Context);

impl Context {
  /// Join `channel`, and remember to join it again after reconnecting.
  pub fn join(&self, channel: impl Into<String>) -> Result<(), BotError> {
    let channel = channel.into();
    self.request(Request::Join { channel })
  }

  /// Leave `channel`, and stop joining it after reconnecting.
  pub fn leave(&self, channel: impl Into<String>) -> Result<(), BotError> {
    let channel = channel.into();
    self.request(Request::Leave { channel })
  }

  /// Send `text` to `channel`.
  pub fn say(&self, channel: impl Into<String>, text: impl Into<String>) -> Result<(), BotError> {
    let channel = channel.into();
    let text = text.into();
    self.request(Request::Say { channel, text })
  }

  /// Stop the receive loop. [`Bot::run`] returns `Ok(())` afterwards.
  pub fn stop(&self) -> Result<(), BotError> {
    self.request(Request::Stop)
  }

  fn request(&self, request: Request) -> Result<(), BotError> {
    self.inner.send(request).map_err(|_| BotError::Stopped)
  }
}

pub struct Bot<S> {
  config: Config,
  backoff: Backoff,
  store: Arc<S>,
  cache: SharedCache,
  commands_url: String,
  cache_max_age: Duration,
  cache_prune_interval: Duration,
  ctx: Context,
  receiver: mpsc::UnboundedReceiver<Request>,
}

impl<S: Store + 'static> Bot<S> {
  pub fn new(credentials: Credentials, store: S) -> Self {
    let (sender, receiver) = mpsc::unbounded_channel();
    Self {
      config: Config::new(credentials),
      backoff: DEFAULT_BACKOFF,
      store: Arc::new(store),
      cache: SharedCache::default(),
      commands_url: DEFAULT_COMMANDS_URL.into(),
      cache_max_age: DEFAULT_CACHE_MAX_AGE,
      cache_prune_interval: DEFAULT_CACHE_PRUNE_INTERVAL,
      ctx: Context { inner: sender },
      receiver,
    }
  }

  /// Replace the connection config, including the credentials passed to [`Bot::new`].
  pub fn config(mut self, config: Config) -> Self {
    self.config = config;
    self
  }

  pub fn backoff(mut self, backoff: Backoff) -> Self {
    self.backoff = backoff;
    self
  }

  /// Base of the link sent in response to `!commands`.
  pub fn commands_url(mut self, url: impl Into<String>) -> Self {
    self.commands_url = url.into();
    self
  }

  /// How long chat messages are kept in the [cache][Bot::cache], and how often it is pruned.
  pub fn cache_settings(mut self, max_age: Duration, prune_interval: Duration) -> Self {
    self.cache_max_age = max_age;
    self.cache_prune_interval = prune_interval;
    self
  }

  pub fn context(&self) -> Context {
    self.ctx.clone()
  }

  pub fn store(&self) -> &Arc<S> {
    &self.store
  }

  /// Recent chat messages of every channel the bot is in.
  pub fn cache(&self) -> SharedCache {
    self.cache.clone()
  }

  /// Connect and run the receive loop until it is stopped.
  ///
  /// Stops on Ctrl-C, or when [`Context::stop`] is called.
  pub async fn run(self) -> Result<(), BotError> {
    let client = Client::connect_with_backoff(self.config.clone(), &self.backoff).await?;
    self.run_with(client).await
  }

  async fn run_with(self, client: Client) -> Result<(), BotError> {
    let pruner = cache::spawn_pruner(
      self.cache.clone(),
      self.cache_prune_interval,
      self.cache_max_age,
    );
    let result = State {
      client,
      store: self.store,
      cache: self.cache,
      backoff: self.backoff,
      commands_url: self.commands_url,
      _ctx: self.ctx,
      receiver: self.receiver,
    }
    .run()
    .await;
    pruner.abort();
    result
  }
}

struct State<S> {
  client: Client,
  store: Arc<S>,
  cache: SharedCache,
  backoff: Backoff,
  commands_url: String,

  /// Keeps the request channel open, even if the caller never asked for a [`Context`].
  _ctx: Context,
  receiver: mpsc::UnboundedReceiver<Request>,
}

impl<S: Store + 'static> State<S> {
  async fn run(mut self) -> Result<(), BotError> {
    let result = self.on_connect().await;
    self.recover(result).await?;

    loop {
      let result = tokio::select! {
        _ = tokio::signal::ctrl_c() => {
          trace!("received ctrl-c");
          break;
        }
        request = self.receiver.recv() => {
          match request {
            Some(Request::Stop) | None => break,
            Some(request) => self.handle_request(request).await,
          }
        }
        line = self.client.recv() => {
          match line {
            Ok(Some(line)) => self.handle_line(&line).await,
            Ok(None) => Ok(()),
            Err(e) => Err(e.into()),
          }
        }
      };

      self.recover(result).await?;
    }

    trace!("bot stopped");
    Ok(())
  }

  /// Reconnect if `result` failed because of the connection.
  async fn recover(&mut self, result: Result<(), BotError>) -> Result<(), BotError> {
    match result {
      Err(e) if e.is_disconnect() => {
        warn!("{e}, reconnecting");
        self.reconnect().await
      }
      result => result,
    }
  }

  /// Fails only once the backoff gives up.
  async fn reconnect(&mut self) -> Result<(), BotError> {
    loop {
      self.client.reconnect(&self.backoff).await?;
      match self.on_connect().await {
        Err(e) if e.is_disconnect() => warn!("{e}, reconnecting"),
        result => return result,
      }
    }
  }

  /// Make sure the bot's own channel is known, then join every channel flagged for joining.
  async fn on_connect(&mut self) -> Result<(), BotError> {
    let nick = self.client.credentials().nick.to_lowercase();
    self.persist_join(&nick, true).await;

    let channels = match self.store.joined_channels().await {
      Ok(channels) => channels,
      Err(e) => {
        error!("failed to load joined channels: {e}");
        Vec::new()
      }
    };
    trace!(count = channels.len(), "joining channels");
    for channel in channels {
      self.client.join(&channel.name).await?;
    }
    Ok(())
  }

  async fn handle_request(&mut self, request: Request) -> Result<(), BotError> {
    match request {
      Request::Join { channel } => {
        let channel = channel_name(&channel).to_lowercase();
        self.persist_join(&channel, true).await;
        self.client.join(&channel).await?;
      }
      Request::Leave { channel } => {
        let channel = channel_name(&channel).to_lowercase();
        self.persist_join(&channel, false).await;
        self.client.part(&channel).await?;
      }
      Request::Say { channel, text } => {
        self.client.privmsg(&channel, &text).await?;
      }
      Request::Stop => {}
    }
    Ok(())
  }

  /// Store whether `channel` should be joined, creating it on first join.
  async fn persist_join(&self, channel: &str, join: bool) {
    let result = match self.store.channel_by_name(channel).await {
      Ok(Some(found)) if found.join == join => Ok(()),
      Ok(Some(_)) => self.store.set_join(channel, join).await,
      Ok(None) if join => self.store.add_channel(Channel::new(channel, true)).await,
      Ok(None) => Ok(()),
      Err(e) => Err(e),
    };
    if let Err(e) = result {
      error!(channel, join, "failed to store channel: {e}");
    }
  }

  async fn handle_line(&mut self, line: &str) -> Result<(), BotError> {
    let message = match Message::parse(Some(line)) {
      Ok(message) => message,
      Err(e) => {
        error!(?line, "failed to decode message: {e}");
        return Ok(());
      }
    };

    match message {
      Message::Privmsg(msg) => self.on_privmsg(msg).await?,
      Message::Ping(ping) => self.client.pong(&ping.server).await?,
      Message::RoomState(state) => self.on_room_state(state).await,
      Message::Reconnect(_) => {
        trace!("twitch requested a reconnect");
        self.reconnect().await?;
      }
      _ => {}
    }
    Ok(())
  }

  async fn on_privmsg(&mut self, msg: Privmsg) -> Result<(), BotError> {
    self
      .cache
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(msg.channel(), CachedMessage::from(&msg));

    let Some(detail) = CommandDetail::parse(msg.text()) else {
      return Ok(());
    };

    let template = match builtin::handle(&detail, &msg, &*self.store, &self.commands_url).await {
      Some(response) => response,
      None => match self.store.command(msg.channel(), &detail.name).await {
        Ok(Some(command)) => command.response,
        Ok(None) => return Ok(()),
        Err(e) => {
          error!(channel = msg.channel(), command = %detail.name, "failed to look up command: {e}");
          return Ok(());
        }
      },
    };
    if template.is_empty() {
      return Ok(());
    }

    let response = expand(&template, &msg, &detail, &*self.store).await;
    self.client.privmsg(msg.channel(), &response).await?;
    Ok(())
  }

  async fn on_room_state(&self, state: RoomState) {
    if let Err(e) = self.store.set_room_id(&state.channel, state.room_id).await {
      error!(channel = %state.channel, room_id = state.room_id, "failed to store room id: {e}");
    }
  }
}

const _: () = {
  fn assert_send<T: Send>(_: T) {}

  #[allow(dead_code)]
  fn run_is_send(bot: Bot<crate::store::MemoryStore>) {
    assert_send(bot.run());
  }
};

#[derive(Debug)]
pub enum BotError {
  Connect(ConnectError),
  Recv(RecvError),
  Write(WriteError),

  /// The receive loop is no longer running.
  Stopped,
}

impl BotError {
  /// Returns `true` if the connection failed, and may be recovered by reconnecting.
  pub fn is_disconnect(&self) -> bool {
    matches!(self, BotError::Recv(_) | BotError::Write(_))
  }
}

impl From<ConnectError> for BotError {
  fn from(err: ConnectError) -> Self {
    BotError::Connect(err)
  }
}

impl From<RecvError> for BotError {
  fn from(err: RecvError) -> Self {
    BotError::Recv(err)
  }
}

impl From<WriteError> for BotError {
  fn from(err: WriteError) -> Self {
    BotError::Write(err)
  }
}

impl std::error::Error for BotError {}

impl std::fmt::Display for BotError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      BotError::Connect(err) => write!(f, "{err}"),
      BotError::Recv(err) => write!(f, "{err}"),
      BotError::Write(err) => write!(f, "{err}"),
      BotError::Stopped => write!(f, "bot is not running"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::client::tests::{connected, test_config, Server};
  use crate::store::{ChannelStore, ChannelVariable, Command, CommandStore, MemoryStore};
  use tokio::io::AsyncWriteExt;
  use tokio::net::TcpListener;
  use tokio::task::JoinHandle;

  const NICK: &str = "archiemate";

  fn privmsg_line(badges: &str, text: &str) -> String {
    format!(
      "@badge-info=;badges={badges};color=#00FF00;display-name=Archimond7450;emotes=;id=8c4890a8-27a4-47ac-b114-e217105325f3;mod=0;room-id=23693840;subscriber=0;tmi-sent-ts=1649338601307;turbo=0;user-id=147113965;user-type= :archimond7450!archimond7450@archimond7450.tmi.twitch.tv PRIVMSG #wtii :{text}"
    )
  }

  async fn store() -> MemoryStore {
    let store = MemoryStore::new();
    let wtii = Channel::new("wtii", true);
    store
      .add_command(Command::new(wtii.id, "hug", "${sender} hugs ${chatters}"))
      .await
      .unwrap();
    store
      .add_variable(ChannelVariable::new(wtii.id, "game", "Age of Empires II"))
      .unwrap();
    store.add_channel(wtii).await.unwrap();
    store.add_channel(Channel::new("thijs", false)).await.unwrap();
    store
  }

  /// A running bot, after it joined its channels.
  async fn start() -> (Context, Arc<MemoryStore>, SharedCache, Server, JoinHandle<Result<(), BotError>>) {
    let (client, mut server) = connected(NICK).await;
    let bot = Bot::new(Credentials::new(NICK, "oauth:token"), store().await);
    let ctx = bot.context();
    let store = bot.store().clone();
    let cache = bot.cache();
    let handle = tokio::spawn(bot.run_with(client));
    server.expect("JOIN #wtii").await;
    (ctx, store, cache, server, handle)
  }

  /// A running bot connected over TCP, so it can reconnect to `listener`.
  async fn start_local() -> (Context, TcpListener, Server, JoinHandle<Result<(), BotError>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let config = Config {
      host: "127.0.0.1".into(),
      port: listener.local_addr().unwrap().port(),
      ..test_config(NICK)
    };
    let connect = tokio::spawn(Client::connect(config));
    let (socket, _) = listener.accept().await.unwrap();
    let mut server = Server::new(socket);
    server.accept(NICK).await;
    let client = connect.await.unwrap().unwrap();

    let bot = Bot::new(Credentials::new(NICK, "oauth:token"), store().await);
    let ctx = bot.context();
    let handle = tokio::spawn(bot.run_with(client));
    server.expect("JOIN #wtii").await;
    (ctx, listener, server, handle)
  }

  /// Accept the bot's next connection, which must arrive without a backoff delay.
  async fn accept_again(listener: &TcpListener) -> Server {
    let (socket, _) = tokio::time::timeout(Duration::from_secs(1), listener.accept())
      .await
      .unwrap()
      .unwrap();
    let mut server = Server::new(socket);
    server.accept(NICK).await;
    server
  }

  /// Round-trips a ping, so everything sent before it has been handled.
  async fn sync(server: &mut Server) {
    server.send("PING :tmi.twitch.tv").await;
    server.expect("PONG :tmi.twitch.tv").await;
  }

  #[tokio::test]
  async fn joins_flagged_channels_on_connect() {
    let (ctx, store, _, _server, handle) = start().await;
    ctx.stop().unwrap();
    handle.await.unwrap().unwrap();

    let own = store.channel_by_name(NICK).await.unwrap().unwrap();
    assert!(own.join);
    let thijs = store.channel_by_name("thijs").await.unwrap().unwrap();
    assert!(!thijs.join);
  }

  #[tokio::test]
  async fn answers_user_commands() {
    let (ctx, _, _, mut server, handle) = start().await;
    server.send(&privmsg_line("", "!hug @a")).await;
    server.expect("PRIVMSG #wtii :Archimond7450 hugs @a").await;
    server.send(&privmsg_line("", "!HUG")).await;
    server.expect("PRIVMSG #wtii :Archimond7450 hugs ").await;

    server.send(&privmsg_line("", "!nope")).await;
    server.send(&privmsg_line("", "just chatting")).await;
    sync(&mut server).await;

    ctx.stop().unwrap();
    handle.await.unwrap().unwrap();
  }

  #[tokio::test]
  async fn builtin_commands() {
    let (ctx, _, _, mut server, handle) = start().await;
    server
      .send(&privmsg_line("moderator/1", "!command add !game Playing $[game]"))
      .await;
    server
      .expect("PRIVMSG #wtii :@Archimond7450, command '!game' was successfully created.")
      .await;
    server.send(&privmsg_line("", "!game")).await;
    server.expect("PRIVMSG #wtii :Playing Age of Empires II").await;

    server.send(&privmsg_line("", "!command add !x y")).await;
    server.send(&privmsg_line("", "!commands")).await;
    server
      .expect("PRIVMSG #wtii :@Archimond7450, the list of available commands for this channel is available here: https://archiemate.com/tables/commands/wtii")
      .await;

    ctx.stop().unwrap();
    handle.await.unwrap().unwrap();
  }

  #[tokio::test]
  async fn context_requests() {
    let (ctx, store, _, mut server, handle) = start().await;
    ctx.join("#Pajlada").unwrap();
    server.expect("JOIN #pajlada").await;
    ctx.say("pajlada", "hello").unwrap();
    server.expect("PRIVMSG #pajlada :hello").await;
    ctx.leave("pajlada").unwrap();
    server.expect("PART #pajlada").await;
    ctx.say("pajlada", "dropped").unwrap();
    ctx.say("wtii", "still here").unwrap();
    server.expect("PRIVMSG #wtii :still here").await;

    ctx.stop().unwrap();
    handle.await.unwrap().unwrap();
    assert!(ctx.say("wtii", "gone").is_err());

    let pajlada = store.channel_by_name("pajlada").await.unwrap().unwrap();
    assert!(!pajlada.join);
  }

  #[tokio::test]
  async fn stores_room_ids() {
    let (ctx, store, _, mut server, handle) = start().await;
    server
      .send("@emote-only=0;followers-only=-1;r9k=0;rituals=0;room-id=23693840;slow=0;subs-only=0 :tmi.twitch.tv ROOMSTATE #wtii")
      .await;
    server
      .send("@room-id=1;subs-only=1 :tmi.twitch.tv ROOMSTATE #unknown")
      .await;
    sync(&mut server).await;

    let wtii = store.channel_by_room_id(23693840).await.unwrap().unwrap();
    assert_eq!(wtii.name, "wtii");
    assert!(store.channel_by_name("unknown").await.unwrap().is_none());

    ctx.stop().unwrap();
    handle.await.unwrap().unwrap();
  }

  #[tokio::test]
  async fn decode_errors_do_not_stop_the_loop() {
    let (ctx, _, cache, mut server, handle) = start().await;
    server
      .send("@badge-info=;badges=;display-name=Archimond7450;id=8c4890a8-27a4-47ac-b114-e217105325f3;room-id=23693840;tmi-sent-ts=1649338601307 :archimond7450!archimond7450@archimond7450.tmi.twitch.tv PRIVMSG #wtii :!hug")
      .await;
    sync(&mut server).await;
    assert_eq!(cache.lock().unwrap().len("wtii"), 0);

    server.send(&privmsg_line("", "hi")).await;
    sync(&mut server).await;
    assert_eq!(cache.lock().unwrap().latest("wtii").unwrap().text, "hi");

    ctx.stop().unwrap();
    handle.await.unwrap().unwrap();
  }

  #[tokio::test]
  async fn invalid_utf8_does_not_stop_the_loop() {
    let (ctx, _, _, mut server, handle) = start().await;
    server.writer.write_all(b"\xff\xfe garbage\r\n").await.unwrap();
    sync(&mut server).await;
    server.send(&privmsg_line("", "!hug @a")).await;
    server.expect("PRIVMSG #wtii :Archimond7450 hugs @a").await;

    ctx.stop().unwrap();
    handle.await.unwrap().unwrap();
  }

  #[tokio::test]
  async fn reconnect_request_rejoins_stored_channels() {
    let (ctx, listener, mut old, handle) = start_local().await;
    ctx.join("pajlada").unwrap();
    old.expect("JOIN #pajlada").await;
    old.send(":tmi.twitch.tv RECONNECT").await;

    let mut server = accept_again(&listener).await;
    server.expect("JOIN #pajlada").await;
    server.expect("JOIN #wtii").await;
    server.send(&privmsg_line("", "!hug @a")).await;
    server.expect("PRIVMSG #wtii :Archimond7450 hugs @a").await;

    ctx.stop().unwrap();
    handle.await.unwrap().unwrap();
  }

  #[tokio::test]
  async fn reconnects_after_connection_loss() {
    let (ctx, listener, old, handle) = start_local().await;
    drop(old);

    let mut server = accept_again(&listener).await;
    server.expect("JOIN #wtii").await;
    sync(&mut server).await;

    ctx.stop().unwrap();
    handle.await.unwrap().unwrap();
  }

  #[tokio::test]
  async fn reconnects_again_when_the_new_connection_drops() {
    let (ctx, listener, old, handle) = start_local().await;
    drop(old);

    // Hangs up right after the handshake, while the bot is rejoining its channels.
    let broken = accept_again(&listener).await;
    drop(broken);

    let mut server = accept_again(&listener).await;
    server.expect("JOIN #wtii").await;
    sync(&mut server).await;

    ctx.stop().unwrap();
    handle.await.unwrap().unwrap();
  }
}
