//! Parsing of prompt lines into backend commands.

use client_core::{FieldValue, ProductField};

use crate::backend_bridge::commands::BackendCommand;

pub const HELP: &str = "\
commands:
  login <username> <password>   sign in and load the catalog
  list                          reload the catalog
  new                           open the form for a new product
  edit <row>                    open the form for catalog row <row>
  set <field> <value>           edit a field (title, category, unit, origin_price,
                                price, description, content, imageUrl, is_enabled)
  image <slot> <url>            replace image slot <slot>
  image add                     append an empty image slot
  image remove <slot>           remove image slot <slot>
  show                          print the open form
  save                          send the form to the service
  close                         discard the open form
  delete <row>                  ask to delete catalog row <row>
  yes | no                      answer a pending delete
  help                          this text
  quit                          leave the console";

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Command(BackendCommand),
    Help,
    Quit,
    Empty,
}

pub fn parse_input(line: &str) -> Result<Input, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "" => return Ok(Input::Empty),
        "help" | "?" => return Ok(Input::Help),
        "quit" | "exit" => return Ok(Input::Quit),
        "login" => {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(username), Some(password), None) => BackendCommand::Login {
                    username: username.to_string(),
                    password: password.to_string(),
                },
                _ => return Err("usage: login <username> <password>".to_string()),
            }
        }
        "list" | "refresh" => BackendCommand::Refresh,
        "new" | "create" => BackendCommand::OpenCreate,
        "edit" => BackendCommand::OpenEdit {
            row: parse_position(rest, "row")?,
        },
        "delete" => BackendCommand::RequestDelete {
            row: parse_position(rest, "row")?,
        },
        "set" => parse_set(rest)?,
        "image" => parse_image(rest)?,
        "show" => BackendCommand::ShowForm,
        "save" | "commit" => BackendCommand::Commit,
        "close" | "cancel" => BackendCommand::CloseForm,
        "yes" | "y" => BackendCommand::ConfirmDelete,
        "no" | "n" => BackendCommand::CancelDelete,
        other => return Err(format!("unknown command '{other}'; type 'help'")),
    };
    Ok(Input::Command(command))
}

/// One-based position on the prompt, zero-based in the command.
fn parse_position(raw: &str, what: &str) -> Result<usize, String> {
    let position: usize = raw
        .trim()
        .parse()
        .map_err(|_| format!("expected a {what} number, got '{raw}'"))?;
    position
        .checked_sub(1)
        .ok_or_else(|| format!("{what} numbers start at 1"))
}

fn parse_set(rest: &str) -> Result<BackendCommand, String> {
    let (name, value) = match rest.split_once(char::is_whitespace) {
        Some((name, value)) => (name, value.trim()),
        None => (rest, ""),
    };
    if name.is_empty() {
        return Err("usage: set <field> <value>".to_string());
    }
    let field: ProductField = name.parse().map_err(|err| format!("{err}"))?;
    let value = if field.is_checkbox() {
        FieldValue::Checked(parse_flag(value)?)
    } else {
        FieldValue::Text(value.to_string())
    };
    Ok(BackendCommand::EditField { field, value })
}

fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(format!("expected on/off, got '{raw}'")),
    }
}

fn parse_image(rest: &str) -> Result<BackendCommand, String> {
    let (head, tail) = match rest.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (rest, ""),
    };
    match head {
        "add" => Ok(BackendCommand::AddImageSlot),
        "remove" => Ok(BackendCommand::RemoveImage {
            slot: parse_position(tail, "slot")?,
        }),
        slot => Ok(BackendCommand::EditImage {
            slot: parse_position(slot, "slot")?,
            url: tail.to_string(),
        }),
    }
}
