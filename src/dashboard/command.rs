//! Interactive shell commands

use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use super::menu::Section;
use crate::history::HistoryInterval;

pub const HELP: &str = "\
Commands:
  help                         Show this help
  show <section>               history, devices, login, about
  history | devices | about    Section shortcuts
  interval <day|week|month|year>
  device <address|all>         Filter history by device
  alias <address> [name...]    Save a device alias (empty clears it)
  login <username> <password>
  logout
  svg <path>                   Write the history chart as SVG
  refresh                      Fetch everything now
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Show(Section),
    Interval(HistoryInterval),
    /// `None` selects all devices
    Device(Option<String>),
    Alias { address: String, alias: String },
    Login { username: String, password: String },
    Logout,
    Svg(PathBuf),
    Refresh,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0} (type 'help')")]
    Unknown(String),

    #[error("{command}: missing {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Command {
    /// Commands whose output is printed below the frame and must stay on
    /// screen until the next input
    pub fn holds_screen(&self) -> bool {
        matches!(self, Command::Help)
    }
}

fn required<'a>(
    word: Option<&'a str>,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, CommandError> {
    word.ok_or(CommandError::MissingArgument { command, argument })
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(CommandError::Empty);
        };

        let command = match head.to_lowercase().as_str() {
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            "refresh" | "r" => Command::Refresh,
            "logout" => Command::Logout,
            "history" => Command::Show(Section::History),
            "devices" => Command::Show(Section::Devices),
            "about" => Command::Show(Section::About),
            "show" => {
                let name = required(words.next(), "show", "section")?;
                Command::Show(name.parse().map_err(CommandError::InvalidArgument)?)
            }
            "interval" => {
                let unit = required(words.next(), "interval", "unit")?;
                Command::Interval(unit.parse().map_err(CommandError::InvalidArgument)?)
            }
            "device" => {
                let address = required(words.next(), "device", "address")?;
                if address.eq_ignore_ascii_case("all") {
                    Command::Device(None)
                } else {
                    Command::Device(Some(address.to_string()))
                }
            }
            "alias" => {
                let address = required(words.next(), "alias", "address")?.to_string();
                let alias = words.collect::<Vec<_>>().join(" ");
                Command::Alias { address, alias }
            }
            "login" => match words.next() {
                None => Command::Show(Section::Login),
                Some(username) => Command::Login {
                    username: username.to_string(),
                    password: required(words.next(), "login", "password")?.to_string(),
                },
            },
            "svg" => Command::Svg(PathBuf::from(required(words.next(), "svg", "path")?)),
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(command)
    }
}
