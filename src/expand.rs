//! Substitution of variables into command responses.
//!
//! - `${name}` or `${name:arg}` is replaced by a built-in variable:
//!   - `time[:format]`: the current local time, formatted with `strftime` syntax (default `%H:%M:%S`),
//!   - `chatters[:separator]`: the mentioned users (default separator `, `),
//!   - `sender`: display name of the user who invoked the command,
//!   - `params[:action]`: the command parameters, or the mentioned users if there are none.
//!     The only action is `random`, which picks one of them,
//!   - `targets`: the mentioned users, separated by `, `.
//! - `$[name]` is replaced by the value of the channel variable `name`.
//! - `\$` is a literal `$`.
//!
//! Failures are reported inline, using one of the `#...` sentinels in this module.

use crate::command::CommandDetail;
use crate::msg::Privmsg;
use crate::store::ChannelVariableStore;
use chrono::format::{Item, StrftimeItems};
use chrono::Local;
use rand::seq::SliceRandom;
use rand::thread_rng;

pub const VARIABLE_NOT_FOUND: &str = "#VARIABLE_NOT_FOUND";
pub const VARIABLE_FORMATTING_NOT_CORRECT: &str = "#VARIABLE_FORMATTING_NOT_CORRECT";
pub const ACTION_NOT_CORRECT: &str = "#ACTION_NOT_CORRECT";

pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";
pub const DEFAULT_SEPARATOR: &str = ", ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
  Literal,
  SawDollar,
  Escaped,
  BuiltinVariable,
  ExternalVariable,
}

/// Expand the variables in `template`, in the context of the message `msg`
/// which invoked the command `detail`.
pub async fn expand<S>(template: &str, msg: &Privmsg, detail: &CommandDetail, variables: &S) -> String
where
  S: ChannelVariableStore + ?Sized,
{
  let mut out = String::with_capacity(template.len());
  let mut name = String::new();
  let mut state = State::Literal;

  for c in template.chars() {
    state = match (state, c) {
      (State::Literal, '$') => State::SawDollar,
      (State::Literal, '\\') => State::Escaped,
      (State::Literal, c) => {
        out.push(c);
        State::Literal
      }

      (State::Escaped, '$') => {
        out.push('$');
        State::Literal
      }
      (State::Escaped, c) => {
        out.push('\\');
        out.push(c);
        State::Literal
      }

      (State::SawDollar, '{') => {
        name.clear();
        State::BuiltinVariable
      }
      (State::SawDollar, '[') => {
        name.clear();
        State::ExternalVariable
      }
      (State::SawDollar, '$') => {
        out.push('$');
        State::SawDollar
      }
      (State::SawDollar, c) => {
        out.push('$');
        out.push(c);
        State::Literal
      }

      (State::BuiltinVariable, '}') => {
        out.push_str(&builtin(&name, msg, detail));
        State::Literal
      }
      (State::ExternalVariable, ']') => {
        out.push_str(&external(&name, msg.channel(), variables).await);
        State::Literal
      }
      (State::BuiltinVariable | State::ExternalVariable, ' ') => {
        flush(&mut out, state, &name);
        out.push(' ');
        State::Literal
      }
      (State::BuiltinVariable | State::ExternalVariable, c) => {
        name.push(c);
        state
      }
    };
  }
  flush(&mut out, state, &name);

  out
}

/// Write back whatever `state` consumed without producing output.
fn flush(out: &mut String, state: State, name: &str) {
  match state {
    State::Literal => {}
    State::SawDollar => out.push('$'),
    State::Escaped => out.push('\\'),
    State::BuiltinVariable => {
      out.push_str("${");
      out.push_str(name);
    }
    State::ExternalVariable => {
      out.push_str("$[");
      out.push_str(name);
    }
  }
}

fn builtin(variable: &str, msg: &Privmsg, detail: &CommandDetail) -> String {
  let (name, arg) = match variable.split_once(':') {
    Some((name, arg)) => (name, Some(arg)),
    None => (variable, None),
  };

  match (name.to_ascii_lowercase().as_str(), arg) {
    ("time", format) => time(format.filter(|f| !f.is_empty()).unwrap_or(DEFAULT_TIME_FORMAT)),
    ("chatters", separator) => detail.chatters.join(separator.unwrap_or(DEFAULT_SEPARATOR)),
    ("sender", None) => msg.sender().name().into(),
    ("params", action) => params(detail, action),
    ("targets", None) => detail.chatters.join(DEFAULT_SEPARATOR),
    _ => VARIABLE_NOT_FOUND.into(),
  }
}

fn time(format: &str) -> String {
  let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
  if items.iter().any(|item| matches!(item, Item::Error)) {
    return VARIABLE_FORMATTING_NOT_CORRECT.into();
  }
  Local::now().format_with_items(items.into_iter()).to_string()
}

fn params(detail: &CommandDetail, action: Option<&str>) -> String {
  if detail.parameters.is_empty() && detail.chatters.is_empty() {
    return VARIABLE_NOT_FOUND.into();
  }
  let use_chatters = detail.parameters.is_empty();

  match action {
    None if use_chatters => detail.chatters.join(DEFAULT_SEPARATOR),
    None => detail.parameters.clone(),
    Some(action) if action.eq_ignore_ascii_case("random") => {
      let source: Vec<&str> = if use_chatters {
        detail.chatters.iter().map(String::as_str).collect()
      } else {
        detail.parameters.split_whitespace().collect()
      };
      source
        .choose(&mut thread_rng())
        .map_or_else(String::new, |s| s.to_string())
    }
    Some(_) => ACTION_NOT_CORRECT.into(),
  }
}

async fn external<S>(name: &str, channel: &str, variables: &S) -> String
where
  S: ChannelVariableStore + ?Sized,
{
  match variables.variable(channel, name).await {
    Ok(Some(variable)) => variable.value,
    Ok(None) => VARIABLE_NOT_FOUND.into(),
    Err(e) => {
      warn!(channel, name, "failed to look up channel variable: {e}");
      VARIABLE_NOT_FOUND.into()
    }
  }
}
