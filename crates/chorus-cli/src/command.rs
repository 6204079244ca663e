//! Slash command parsing.

use chorus_core::settings::Theme;
use std::str::FromStr;

/// Every slash command the REPL understands, used for completion.
pub const COMMANDS: &[&str] = &[
    "/new", "/sessions", "/switch", "/delete", "/rename", "/persona", "/personas", "/image",
    "/search", "/theme", "/key", "/wipe", "/help", "/quit",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text for the active session.
    Submit(String),
    New(Option<String>),
    Sessions,
    /// 1-based index into the session list.
    Switch(usize),
    Delete(usize),
    Rename(String),
    Persona(String),
    Personas,
    Image(bool),
    Search(bool),
    Theme(Theme),
    Key,
    Wipe,
    Help,
    Quit,
}

/// Parses one REPL line. Errors are user-facing usage hints.
pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if !line.starts_with('/') {
        return Ok(Command::Submit(line.to_string()));
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    let arg = Some(rest).filter(|r| !r.is_empty());

    match name {
        "/new" => Ok(Command::New(arg.map(str::to_string))),
        "/sessions" => Ok(Command::Sessions),
        "/switch" => parse_index(arg, "/switch N").map(Command::Switch),
        "/delete" => parse_index(arg, "/delete N").map(Command::Delete),
        "/rename" => arg
            .map(|title| Command::Rename(title.to_string()))
            .ok_or_else(|| "Usage: /rename TITLE".to_string()),
        "/persona" => arg
            .map(|id| Command::Persona(id.to_lowercase()))
            .ok_or_else(|| "Usage: /persona ID (see /personas)".to_string()),
        "/personas" => Ok(Command::Personas),
        "/image" => parse_toggle(arg, "/image on|off").map(Command::Image),
        "/search" => parse_toggle(arg, "/search on|off").map(Command::Search),
        "/theme" => arg
            .and_then(|value| Theme::from_str(value).ok())
            .map(Command::Theme)
            .ok_or_else(|| "Usage: /theme light|dark|auto".to_string()),
        "/key" => Ok(Command::Key),
        "/wipe" => Ok(Command::Wipe),
        "/help" => Ok(Command::Help),
        "/quit" | "/exit" => Ok(Command::Quit),
        other => Err(format!("Unknown command: {} (try /help)", other)),
    }
}

fn parse_index(arg: Option<&str>, usage: &str) -> Result<usize, String> {
    arg.and_then(|value| value.parse::<usize>().ok())
        .filter(|index| *index > 0)
        .ok_or_else(|| format!("Usage: {}", usage))
}

fn parse_toggle(arg: Option<&str>, usage: &str) -> Result<bool, String> {
    match arg.map(str::to_lowercase).as_deref() {
        Some("on") | Some("true") | Some("yes") => Ok(true),
        Some("off") | Some("false") | Some("no") => Ok(false),
        _ => Err(format!("Usage: {}", usage)),
    }
}
