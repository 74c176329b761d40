//! Turns a typed line into an intent against the current snapshot.

use shared::protocol::{Intent, RenderState};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Intent(Intent),
    List,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("'{0}' is not a row number")]
    InvalidRow(String),
    #[error("there is no row {0}")]
    NoSuchRow(usize),
}

pub fn parse(line: &str, state: &RenderState) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "add" | "new" => Command::Intent(Intent::Create {
            text: rest.to_string(),
        }),
        "select" | "sel" => Command::Intent(Intent::Select {
            id: parse_selection(rest, state)?,
        }),
        "update" | "edit" => {
            if rest.is_empty() {
                return Err(ParseError::MissingArgument("update"));
            }
            let (task, status) = match rest.split_once('|') {
                Some((task, status)) => (task.trim().to_string(), status.trim().to_string()),
                None => (
                    rest.to_string(),
                    state
                        .selected
                        .as_ref()
                        .map(|todo| todo.status.clone())
                        .unwrap_or_default(),
                ),
            };
            Command::Intent(Intent::Update { task, status })
        }
        "delete" | "rm" => Command::Intent(Intent::Delete),
        "list" | "ls" => Command::List,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => return Err(ParseError::UnknownCommand(word.to_string())),
    };
    Ok(Some(command))
}

fn parse_selection(
    arg: &str,
    state: &RenderState,
) -> Result<Option<shared::domain::TodoId>, ParseError> {
    if arg.is_empty() {
        return Err(ParseError::MissingArgument("select"));
    }
    if arg.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let row: usize = arg
        .parse()
        .map_err(|_| ParseError::InvalidRow(arg.to_string()))?;
    row.checked_sub(1)
        .and_then(|index| state.todos.get(index))
        .map(|todo| Some(todo.id.clone()))
        .ok_or(ParseError::NoSuchRow(row))
}
