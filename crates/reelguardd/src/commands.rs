//! Console command parsing

use thiserror::Error;

pub const HELP: &str = "\
commands:
  goto <url>   navigate (relative paths keep the current origin)
  ack          press the overlay's close control
  remaining    show the budget left
  show         show the overlay now
  reset        start a new full budget
  status       print tracker state as JSON
  help         this text
  quit         exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Goto(String),
    Ack,
    Remaining,
    Show,
    Reset,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
}

impl ConsoleCommand {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else {
            return Ok(None);
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "goto" | "go" => {
                let target = parts.next().ok_or(CommandError::MissingArgument("goto"))?;
                ConsoleCommand::Goto(target.to_string())
            }
            "ack" | "close" => ConsoleCommand::Ack,
            "remaining" | "left" => ConsoleCommand::Remaining,
            "show" => ConsoleCommand::Show,
            "reset" => ConsoleCommand::Reset,
            "status" => ConsoleCommand::Status,
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" => ConsoleCommand::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}
