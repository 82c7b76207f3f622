//! Commands which are always available, regardless of what is in the command store.
//!
//! - `!command <action> <name> [response]` manages the commands of a channel.
//!   Only moderators and the broadcaster may use it.
//! - `!commands` links to the list of commands of a channel.
//!
//! Replies are response templates, so they still have to go through [`crate::expand`].

use crate::command::CommandDetail;
use crate::msg::Privmsg;
use crate::store::{normalize_name, ChannelStore, Command, CommandStore, StoreError};

pub const COMMAND: &str = "command";
pub const COMMANDS: &str = "commands";

pub const ADD: &[&str] = &["add", "create"];
pub const EDIT: &[&str] = &["edit", "update", "change"];
pub const DELETE: &[&str] = &["delete", "remove"];

pub const USAGE: &str = "Usage: !command (add|create|edit|update|change|delete|remove) <name> [response]";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
  Add,
  Edit,
  Delete,
}

impl Action {
  fn parse(s: &str) -> Option<Action> {
    let is = |names: &[&str]| names.iter().any(|name| name.eq_ignore_ascii_case(s));
    if is(ADD) {
      Some(Action::Add)
    } else if is(EDIT) {
      Some(Action::Edit)
    } else if is(DELETE) {
      Some(Action::Delete)
    } else {
      None
    }
  }
}

/// Answer `detail` if it invokes a built-in command.
///
/// Returns [`None`] if it does not, in which case the channel's own commands should be tried.
pub async fn handle<S>(detail: &CommandDetail, msg: &Privmsg, store: &S, commands_url: &str) -> Option<String>
where
  S: ChannelStore + CommandStore + ?Sized,
{
  if detail.is(COMMAND) && msg.badges().is_privileged() {
    return Some(manage(&detail.parameters, msg.channel(), store).await);
  }
  if detail.is(COMMANDS) {
    let base = commands_url.trim_end_matches('/');
    return Some(format!(
      "@${{sender}}, the list of available commands for this channel is available here: {base}/{}",
      msg.channel()
    ));
  }
  None
}

async fn manage<S>(parameters: &str, channel: &str, store: &S) -> String
where
  S: ChannelStore + CommandStore + ?Sized,
{
  let mut parts = parameters.trim().splitn(2, char::is_whitespace);
  let Some(action) = parts.next().and_then(Action::parse) else {
    return USAGE.into();
  };
  let rest = parts.next().unwrap_or("").trim();
  let (name, response) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
  let name = normalize_name(name);
  let response = response.trim();

  debug!(channel, ?action, %name, response, "!command");
  let result = match action {
    Action::Add => add(store, channel, &name, response).await,
    Action::Edit => edit(store, channel, &name, response).await,
    Action::Delete => delete(store, channel, &name).await,
  };
  result.unwrap_or_else(|e| {
    error!(channel, ?action, %name, "failed to manage command: {e}");
    let verb = match action {
      Action::Add => "create",
      Action::Edit => "edit",
      Action::Delete => "delete",
    };
    format!("@${{sender}}, cannot {verb} command '!{name}' because of internal error!")
  })
}

async fn add<S>(store: &S, channel: &str, name: &str, response: &str) -> Result<String, StoreError>
where
  S: ChannelStore + CommandStore + ?Sized,
{
  if response.is_empty() {
    return Ok(format!(
      "@${{sender}}, cannot create command '!{name}' with an empty response!"
    ));
  }
  if store.command(channel, name).await?.is_some() {
    return Ok(format!(
      "@${{sender}}, cannot create command '!{name}' because it already exists!"
    ));
  }
  let Some(found) = store.channel_by_name(channel).await? else {
    return Err(StoreError::UnknownChannel(channel.into()));
  };

  store.add_command(Command::new(found.id, name, response)).await?;
  Ok(format!("@${{sender}}, command '!{name}' was successfully created."))
}

async fn edit<S>(store: &S, channel: &str, name: &str, response: &str) -> Result<String, StoreError>
where
  S: ChannelStore + CommandStore + ?Sized,
{
  if response.is_empty() {
    return Ok(format!(
      "@${{sender}}, cannot edit command '!{name}' with an empty response!"
    ));
  }
  let Some(command) = store.command(channel, name).await? else {
    return Ok(format!(
      "@${{sender}}, cannot edit command '!{name}' because it doesn't exist!"
    ));
  };

  store
    .update_command(Command {
      response: response.into(),
      ..command
    })
    .await?;
  Ok(format!("@${{sender}}, command '!{name}' was successfully edited."))
}

async fn delete<S>(store: &S, channel: &str, name: &str) -> Result<String, StoreError>
where
  S: ChannelStore + CommandStore + ?Sized,
{
  let Some(command) = store.command(channel, name).await? else {
    return Ok(format!(
      "@${{sender}}, cannot delete command '!{name}' because it doesn't exist!"
    ));
  };

  store.delete_command(command.id).await?;
  Ok(format!("@${{sender}}, command '!{name}' was successfully deleted."))
}
