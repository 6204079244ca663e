use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::command::COMMANDS;

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
pub struct CliHelper {
    commands: Vec<String>,
    persona_ids: Vec<String>,
}

impl CliHelper {
    pub fn new(persona_ids: Vec<String>) -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
            persona_ids,
        }
    }

    fn argument_candidates(&self, command: &str) -> Vec<String> {
        match command {
            "/new" | "/persona" => self.persona_ids.clone(),
            "/image" | "/search" => vec!["on".into(), "off".into()],
            "/theme" => vec!["light".into(), "dark".into(), "auto".into()],
            _ => Vec::new(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }

        // Complete the argument once the command word is finished.
        if let Some((command, partial)) = line.split_once(' ') {
            let start = command.len() + 1;
            let candidates = self
                .argument_candidates(command)
                .into_iter()
                .filter(|value| value.starts_with(partial))
                .map(|value| Pair {
                    display: value.clone(),
                    replacement: value,
                })
                .collect();
            return Ok((start, candidates));
        }

        let candidates: Vec<Pair> = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

#[cfg(test)]
mod tests {
    use super::*;
    use rustyline::history::DefaultHistory;

    fn complete(helper: &CliHelper, line: &str) -> (usize, Vec<String>) {
        let history = DefaultHistory::new();
        let ctx = Context::new(&history);
        let (start, pairs) = helper.complete(line, line.len(), &ctx).unwrap();
        (start, pairs.into_iter().map(|p| p.replacement).collect())
    }

    #[test]
    fn test_command_completion() {
        let helper = CliHelper::new(vec!["sage".into(), "muse".into()]);
        let (start, candidates) = complete(&helper, "/pe");
        assert_eq!(start, 0);
        assert_eq!(candidates, vec!["/persona", "/personas"]);
    }

    #[test]
    fn test_argument_completion() {
        let helper = CliHelper::new(vec!["sage".into(), "muse".into()]);
        let (start, candidates) = complete(&helper, "/persona m");
        assert_eq!(start, "/persona ".len());
        assert_eq!(candidates, vec!["muse"]);

        let (_, candidates) = complete(&helper, "/theme ");
        assert_eq!(candidates, vec!["light", "dark", "auto"]);
    }

    #[test]
    fn test_plain_text_has_no_completion() {
        let helper = CliHelper::new(Vec::new());
        assert!(complete(&helper, "hello").1.is_empty());
    }
}
