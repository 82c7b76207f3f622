//! Persistence collaborators of the bot.
//!
//! The bot only talks to storage through the [`ChannelStore`], [`CommandStore`] and
//! [`ChannelVariableStore`] traits. [`MemoryStore`] implements all of them in-process.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// A channel the bot knows about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Channel {
  pub id: Uuid,

  /// Login of the channel's owner.
  pub name: String,

  /// Twitch ID of the channel, learned from `ROOMSTATE`.
  pub room_id: Option<u64>,

  /// Whether the bot should be in this channel.
  pub join: bool,
}

impl Channel {
  pub fn new(name: impl Into<String>, join: bool) -> Self {
    Self {
      id: Uuid::new_v4(),
      name: name.into(),
      room_id: None,
      join,
    }
  }
}

/// A user-defined command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
  pub id: Uuid,
  pub channel_id: Uuid,

  /// Lowercase name, without the `!`.
  pub name: String,

  /// Response template, see [`crate::expand`].
  pub response: String,
}

impl Command {
  /// The name is normalized, so `!Hug` and `hug` refer to the same command.
  pub fn new(channel_id: Uuid, name: &str, response: impl Into<String>) -> Self {
    Self {
      id: Uuid::new_v4(),
      channel_id,
      name: normalize_name(name),
      response: response.into(),
    }
  }
}

/// A value substituted for `$[name]` in responses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelVariable {
  pub id: Uuid,
  pub channel_id: Uuid,
  pub name: String,
  pub value: String,
}

impl ChannelVariable {
  pub fn new(channel_id: Uuid, name: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      id: Uuid::new_v4(),
      channel_id,
      name: name.into(),
      value: value.into(),
    }
  }
}

/// Command names are stored lowercase, without a leading `!`.
pub fn normalize_name(name: &str) -> String {
  name.strip_prefix('!').unwrap_or(name).to_lowercase()
}

#[async_trait]
pub trait ChannelStore: Send + Sync {
  async fn channel_by_name(&self, name: &str) -> Result<Option<Channel>, StoreError>;

  async fn channel_by_room_id(&self, room_id: u64) -> Result<Option<Channel>, StoreError>;

  /// Channels with the join flag set.
  async fn joined_channels(&self) -> Result<Vec<Channel>, StoreError>;

  async fn add_channel(&self, channel: Channel) -> Result<(), StoreError>;

  async fn set_join(&self, name: &str, join: bool) -> Result<(), StoreError>;

  async fn set_room_id(&self, name: &str, room_id: u64) -> Result<(), StoreError>;
}

#[async_trait]
pub trait CommandStore: Send + Sync {
  /// Look up a command by the name of its channel and its (normalized) name.
  async fn command(&self, channel: &str, name: &str) -> Result<Option<Command>, StoreError>;

  async fn add_command(&self, command: Command) -> Result<(), StoreError>;

  async fn update_command(&self, command: Command) -> Result<(), StoreError>;

  async fn delete_command(&self, id: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ChannelVariableStore: Send + Sync {
  async fn variable(&self, channel: &str, name: &str)
    -> Result<Option<ChannelVariable>, StoreError>;
}

/// Everything the bot needs from storage.
pub trait Store: ChannelStore + CommandStore + ChannelVariableStore {}

impl<T> Store for T where T: ChannelStore + CommandStore + ChannelVariableStore {}

/// A store operation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
  /// No channel called `name` exists.
  UnknownChannel(String),

  /// No command with `id` exists.
  UnknownCommand(Uuid),

  /// A record with the same key already exists.
  Duplicate(String),

  /// The backend failed.
  Backend(String),
}

impl Display for StoreError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      StoreError::UnknownChannel(name) => write!(f, "store error: unknown channel `{name}`"),
      StoreError::UnknownCommand(id) => write!(f, "store error: unknown command `{id}`"),
      StoreError::Duplicate(key) => write!(f, "store error: `{key}` already exists"),
      StoreError::Backend(e) => write!(f, "store error: {e}"),
    }
  }
}

impl std::error::Error for StoreError {}

#[derive(Default)]
struct Tables {
  channels: HashMap<Uuid, Channel>,
  commands: HashMap<Uuid, Command>,
  variables: HashMap<Uuid, ChannelVariable>,
}

impl Tables {
  fn channel(&self, name: &str) -> Option<&Channel> {
    self.channels.values().find(|c| c.name == name)
  }

  fn channel_mut(&mut self, name: &str) -> Result<&mut Channel, StoreError> {
    self
      .channels
      .values_mut()
      .find(|c| c.name == name)
      .ok_or_else(|| StoreError::UnknownChannel(name.into()))
  }
}

/// In-process store, lost on exit.
#[derive(Default)]
pub struct MemoryStore {
  tables: Mutex<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert a channel variable. Used to seed the store, there is no chat command for this.
  pub fn add_variable(&self, variable: ChannelVariable) -> Result<(), StoreError> {
    self.lock()?.variables.insert(variable.id, variable);
    Ok(())
  }

  fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
    self
      .tables
      .lock()
      .map_err(|e| StoreError::Backend(e.to_string()))
  }
}

#[async_trait]
impl ChannelStore for MemoryStore {
  async fn channel_by_name(&self, name: &str) -> Result<Option<Channel>, StoreError> {
    Ok(self.lock()?.channel(name).cloned())
  }

  async fn channel_by_room_id(&self, room_id: u64) -> Result<Option<Channel>, StoreError> {
    Ok(
      self
        .lock()?
        .channels
        .values()
        .find(|c| c.room_id == Some(room_id))
        .cloned(),
    )
  }

  async fn joined_channels(&self) -> Result<Vec<Channel>, StoreError> {
    let mut channels: Vec<_> = self
      .lock()?
      .channels
      .values()
      .filter(|c| c.join)
      .cloned()
      .collect();
    channels.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(channels)
  }

  async fn add_channel(&self, channel: Channel) -> Result<(), StoreError> {
    let mut tables = self.lock()?;
    if tables.channel(&channel.name).is_some() {
      return Err(StoreError::Duplicate(channel.name));
    }
    tables.channels.insert(channel.id, channel);
    Ok(())
  }

  async fn set_join(&self, name: &str, join: bool) -> Result<(), StoreError> {
    self.lock()?.channel_mut(name)?.join = join;
    Ok(())
  }

  async fn set_room_id(&self, name: &str, room_id: u64) -> Result<(), StoreError> {
    self.lock()?.channel_mut(name)?.room_id = Some(room_id);
    Ok(())
  }
}

#[async_trait]
impl CommandStore for MemoryStore {
  async fn command(&self, channel: &str, name: &str) -> Result<Option<Command>, StoreError> {
    let tables = self.lock()?;
    let Some(channel) = tables.channel(channel) else {
      return Ok(None);
    };
    let name = normalize_name(name);
    Ok(
      tables
        .commands
        .values()
        .find(|c| c.channel_id == channel.id && c.name == name)
        .cloned(),
    )
  }

  async fn add_command(&self, command: Command) -> Result<(), StoreError> {
    let mut tables = self.lock()?;
    let command = Command {
      name: normalize_name(&command.name),
      ..command
    };
    if tables
      .commands
      .values()
      .any(|c| c.channel_id == command.channel_id && c.name == command.name)
    {
      return Err(StoreError::Duplicate(command.name));
    }
    tables.commands.insert(command.id, command);
    Ok(())
  }

  async fn update_command(&self, command: Command) -> Result<(), StoreError> {
    let mut tables = self.lock()?;
    let Some(existing) = tables.commands.get_mut(&command.id) else {
      return Err(StoreError::UnknownCommand(command.id));
    };
    *existing = command;
    Ok(())
  }

  async fn delete_command(&self, id: Uuid) -> Result<(), StoreError> {
    self
      .lock()?
      .commands
      .remove(&id)
      .map(|_| ())
      .ok_or(StoreError::UnknownCommand(id))
  }
}

#[async_trait]
impl ChannelVariableStore for MemoryStore {
  async fn variable(
    &self,
    channel: &str,
    name: &str,
  ) -> Result<Option<ChannelVariable>, StoreError> {
    let tables = self.lock()?;
    let Some(channel) = tables.channel(channel) else {
      return Ok(None);
    };
    Ok(
      tables
        .variables
        .values()
        .find(|v| v.channel_id == channel.id && v.name == name)
        .cloned(),
    )
  }
}

static_assert_send!(MemoryStore);
static_assert_sync!(MemoryStore);
