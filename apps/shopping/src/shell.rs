//! Verbs shared by the one-shot subcommands and the interactive shell.

use std::{io::Write, str::FromStr};

use anyhow::Result;
use list_core::{Command, ListEvent, Outcome, ShoppingList};
use rust_decimal::Decimal;
use shared::domain::{parse_price, ItemId};
use thiserror::Error;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::broadcast,
    task::JoinHandle,
};
use tracing::debug;

use crate::{
    lookup::resolve_id,
    render::{format_amount, render_list, render_total},
};

pub const HELP: &str = "\
commands:
  add <name> [price]          add an item; a trailing number is the price
  edit <id> <name> [price]    rename an item still to buy, optionally repricing it
  toggle <id>                 move an item between 'to buy' and 'purchased'
  remove <id>                 delete an item from either section
  list                        show both sections and the total
  total                       show the total still to buy
  help                        show this text
  quit                        leave the shell
ids may be shortened to any unique prefix
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Add { name: String, price: Option<String> },
    Remove { id: String },
    Edit { id: String, name: String, price: Option<String> },
    Toggle { id: String },
    List,
    Total,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command '{0}'; type 'help' for the list")]
    UnknownVerb(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Parses one shell line. Blank lines parse to `None`.
pub fn parse_line(line: &str) -> Result<Option<Action>, ParseError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let action = match verb.to_ascii_lowercase().as_str() {
        "add" => {
            let (name, price) = split_trailing_price(&rest);
            if name.is_empty() {
                return Err(ParseError::Usage("add <name> [price]"));
            }
            Action::Add { name, price }
        }
        "edit" => {
            let Some((id, tail)) = rest.split_first() else {
                return Err(ParseError::Usage("edit <id> <name> [price]"));
            };
            let (name, price) = split_trailing_price(tail);
            if name.is_empty() {
                return Err(ParseError::Usage("edit <id> <name> [price]"));
            }
            Action::Edit {
                id: id.to_string(),
                name,
                price,
            }
        }
        "toggle" | "check" => Action::Toggle {
            id: single_id(&rest, "toggle <id>")?,
        },
        "remove" | "rm" => Action::Remove {
            id: single_id(&rest, "remove <id>")?,
        },
        "list" | "ls" => Action::List,
        "total" => Action::Total,
        "help" | "?" => Action::Help,
        "quit" | "exit" => Action::Quit,
        other => return Err(ParseError::UnknownVerb(other.to_string())),
    };
    Ok(Some(action))
}

fn single_id(rest: &[&str], usage: &'static str) -> Result<String, ParseError> {
    match rest {
        [id] => Ok(id.to_string()),
        _ => Err(ParseError::Usage(usage)),
    }
}

// A trailing numeric word is the price, unless it is the only word.
fn split_trailing_price(words: &[&str]) -> (String, Option<String>) {
    match words.split_last() {
        Some((last, head)) if !head.is_empty() && Decimal::from_str(last).is_ok() => {
            (head.join(" "), Some(last.to_string()))
        }
        _ => (words.join(" "), None),
    }
}

pub async fn execute<W: Write>(
    list: &ShoppingList,
    action: Action,
    currency_prefix: &str,
    out: &mut W,
) -> Result<Flow> {
    match action {
        Action::Add { name, price } => {
            let command = Command::Add {
                name,
                price: price.as_deref().map(parse_price),
            };
            report(
                out,
                list.dispatch(command).await,
                "added",
                "nothing added: name is blank",
            )?;
        }
        Action::Remove { id } => {
            if let Some(id) = lookup(list, &id, out).await? {
                let outcome = list.dispatch(Command::Remove { id }).await;
                report(out, outcome, "removed", "nothing removed")?;
            }
        }
        Action::Edit { id, name, price } => {
            if let Some(id) = lookup(list, &id, out).await? {
                let command = Command::Edit {
                    id,
                    name,
                    price: price.as_deref().map(parse_price),
                };
                report(
                    out,
                    list.dispatch(command).await,
                    "updated",
                    "nothing updated: purchased items cannot be edited and names cannot be blank",
                )?;
            }
        }
        Action::Toggle { id } => {
            if let Some(id) = lookup(list, &id, out).await? {
                let outcome = list.dispatch(Command::Toggle { id }).await;
                report(out, outcome, "toggled", "nothing toggled")?;
            }
        }
        Action::List => {
            write!(out, "{}", render_list(&list.snapshot().await, currency_prefix))?;
        }
        Action::Total => {
            write!(out, "{}", render_total(&list.snapshot().await, currency_prefix))?;
        }
        Action::Help => write!(out, "{HELP}")?,
        Action::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

async fn lookup<W: Write>(
    list: &ShoppingList,
    token: &str,
    out: &mut W,
) -> Result<Option<ItemId>> {
    match resolve_id(&list.snapshot().await, token) {
        Ok(id) => Ok(Some(id)),
        Err(error) => {
            writeln!(out, "{error}")?;
            Ok(None)
        }
    }
}

fn report<W: Write>(out: &mut W, outcome: Outcome, changed: &str, unchanged: &str) -> Result<()> {
    match outcome {
        Outcome::Changed => writeln!(out, "{changed}")?,
        Outcome::Unchanged => writeln!(out, "{unchanged}")?,
    }
    Ok(())
}

/// Reads commands until `quit` or end of input.
pub async fn run<R, W>(
    list: &ShoppingList,
    currency_prefix: &str,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    write!(out, "> ")?;
    out.flush()?;

    while let Some(line) = lines.next_line().await? {
        let flow = match parse_line(&line) {
            Ok(Some(action)) => execute(list, action, currency_prefix, out).await?,
            Ok(None) => Flow::Continue,
            Err(error) => {
                writeln!(out, "{error}")?;
                Flow::Continue
            }
        };
        if flow == Flow::Quit {
            break;
        }
        write!(out, "> ")?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(())
}

/// Prints a warning on stderr for every autosave that fails while the shell is open.
pub fn spawn_save_warnings(
    mut events: broadcast::Receiver<ListEvent>,
    currency_prefix: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ListEvent::SaveFailed { revision, message }) => {
                    eprintln!("warning: change {revision} was not saved: {message}");
                }
                Ok(ListEvent::Changed { revision, state }) => {
                    debug!(
                        revision,
                        total = %format_amount(list_core::select_total(&state), &currency_prefix),
                        "list changed"
                    );
                }
                Ok(ListEvent::Saved { .. }) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "save warning listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;
