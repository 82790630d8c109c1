//! Comment command tokenizer.
//!
//! Only the first line of a comment is considered, and it must start with the
//! command (no leading text). Keywords are case-sensitive.
//!
//! ```text
//! /ack
//! /escalate
//! /resolve
//! /oncall add user <handle> <display name...>
//! /oncall add rotation <name...>
//! /oncall assign <handle> to <rotation name...>
//! ```
//!
//! `/ack`, `/escalate` and `/resolve` may be followed by any text as long as
//! the keyword itself ends at a non-word character (`/ack please` matches,
//! `/acknowledge` does not).

/// A recognized comment command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Acknowledge,
    Escalate,
    Resolve,
    AddUser { handle: String, name: String },
    AddRotation { name: String },
    AssignUser { handle: String, rotation: String },
}

impl Command {
    /// Recognize the command in a comment body, if any.
    pub fn parse(body: &str) -> Option<Command> {
        let line = body.lines().next()?.trim_end();

        if starts_with_keyword(line, "/ack") {
            return Some(Command::Acknowledge);
        }
        if starts_with_keyword(line, "/escalate") {
            return Some(Command::Escalate);
        }
        if starts_with_keyword(line, "/resolve") {
            return Some(Command::Resolve);
        }

        let mut tokens = Tokens::new(line);
        if tokens.next()? != "/oncall" {
            return None;
        }

        match tokens.next()? {
            "add" => match tokens.next()? {
                "user" => {
                    let handle = handle(tokens.next()?)?;
                    let name = tokens.remainder()?;
                    Some(Command::AddUser {
                        handle,
                        name: name.to_string(),
                    })
                }
                "rotation" => Some(Command::AddRotation {
                    name: tokens.remainder()?.to_string(),
                }),
                _ => None,
            },
            "assign" => {
                let handle = handle(tokens.next()?)?;
                if tokens.next()? != "to" {
                    return None;
                }
                Some(Command::AssignUser {
                    handle,
                    rotation: tokens.remainder()?.to_string(),
                })
            }
            _ => None,
        }
    }

    /// Commands that act on the escalation of the issue or pull request
    /// being commented on.
    pub fn targets_escalation(&self) -> bool {
        matches!(
            self,
            Command::Acknowledge | Command::Escalate | Command::Resolve
        )
    }
}

/// `line` starts with `keyword` and the keyword ends at a word boundary.
fn starts_with_keyword(line: &str, keyword: &str) -> bool {
    match line.strip_prefix(keyword) {
        Some(rest) => !rest.starts_with(is_word_char),
        None => false,
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// A platform handle: ASCII letters, digits, `_` and `-`.
fn handle(token: &str) -> Option<String> {
    token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        .then(|| token.to_string())
}

/// Whitespace-separated tokens that can hand back the untouched rest of the line.
struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Tokens<'a> {
    fn new(line: &'a str) -> Self {
        Self { rest: line }
    }

    fn next(&mut self) -> Option<&'a str> {
        let s = self.rest.trim_start();
        if s.is_empty() {
            return None;
        }
        let end = s.find(char::is_whitespace).unwrap_or(s.len());
        let (token, rest) = s.split_at(end);
        self.rest = rest;
        Some(token)
    }

    /// Everything not yet consumed, trimmed. None if nothing is left.
    fn remainder(self) -> Option<&'a str> {
        let s = self.rest.trim();
        (!s.is_empty()).then_some(s)
    }
}
