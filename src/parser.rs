//! Grammar of task script lines.
//!
//! Every command is a fixed sequence of case-sensitive keywords and arguments
//! separated by runs of spaces or tabs:
//!
//! ```text
//! CREATE USER <id>              ADD USER <id> TO GROUP <id>
//! DELETE USER <id>              REMOVE USER <id> FROM GROUP <id>
//! DISABLE USER <id>             GET USERS
//! SEND MESSAGE <id> "<text>"    GET GROUPS
//! PING <id> <n>                 GET MESSAGE HISTORY <id>
//! EXIT
//! ```
//!
//! Each shape has its own parser; [`command_parser`] tries them in the order
//! above and [`CommandParser::parse`] additionally insists that the whole line was
//! consumed.

use crate::combinator::{
    BoxedParser, ParseError, Parsed, Parser, identifier, keyword, number, quoted_string,
    whitespace,
};
use crate::command::{
    AddToGroup, Command, CreateUser, DeleteUser, DisableUser, Exit, GetGroups, GetMessageHistory,
    GetUsers, Ping, RemoveFromGroup, SendMessage,
};
use thiserror::Error;

/// Why a line is not a valid command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParsingError {
    /// No command shape matched. Carries the failure of the last alternative tried.
    #[error("no command matches: {0}")]
    NoMatch(ParseError),
    /// A command matched but left characters behind, e.g. `GET USERS extra`.
    #[error("unexpected trailing input at position {position}")]
    TrailingInput { position: usize },
}

/// Keywords separated by whitespace, e.g. `phrase("GET", &["MESSAGE", "HISTORY"])`.
fn phrase(first: &'static str, rest: &[&'static str]) -> BoxedParser<&'static str> {
    rest.iter()
        .fold(keyword(first), |acc, &word| acc * whitespace() * keyword(word))
}

/// Whitespace followed by `parser`, keeping `parser`'s value.
fn arg<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<T> {
    whitespace() * parser
}

pub fn create_user() -> BoxedParser<Command> {
    phrase("CREATE", &["USER"]) * arg(identifier())
        >> |username| Command::CreateUser(CreateUser { username })
}

pub fn delete_user() -> BoxedParser<Command> {
    phrase("DELETE", &["USER"]) * arg(identifier())
        >> |username| Command::DeleteUser(DeleteUser { username })
}

pub fn disable_user() -> BoxedParser<Command> {
    phrase("DISABLE", &["USER"]) * arg(identifier())
        >> |username| Command::DisableUser(DisableUser { username })
}

pub fn send_message() -> BoxedParser<Command> {
    (phrase("SEND", &["MESSAGE"]) * arg(identifier()) + arg(quoted_string())).map(
        |(username, message)| Command::SendMessage(SendMessage { username, message }),
    )
}

pub fn ping() -> BoxedParser<Command> {
    (keyword("PING") * arg(identifier()) + arg(number()))
        .map(|(username, times)| Command::Ping(Ping { username, times }))
}

pub fn add_to_group() -> BoxedParser<Command> {
    let user = phrase("ADD", &["USER"]) * arg(identifier());
    let group = arg(phrase("TO", &["GROUP"])) * arg(identifier());
    (user + group).map(|(username, group)| Command::AddToGroup(AddToGroup { username, group }))
}

pub fn remove_from_group() -> BoxedParser<Command> {
    let user = phrase("REMOVE", &["USER"]) * arg(identifier());
    let group = arg(phrase("FROM", &["GROUP"])) * arg(identifier());
    (user + group).map(|(username, group)| {
        Command::RemoveFromGroup(RemoveFromGroup { username, group })
    })
}

pub fn get_users() -> BoxedParser<Command> {
    phrase("GET", &["USERS"]) >> |_| Command::GetUsers(GetUsers)
}

pub fn get_groups() -> BoxedParser<Command> {
    phrase("GET", &["GROUPS"]) >> |_| Command::GetGroups(GetGroups)
}

pub fn get_message_history() -> BoxedParser<Command> {
    phrase("GET", &["MESSAGE", "HISTORY"]) * arg(identifier())
        >> |username| Command::GetMessageHistory(GetMessageHistory { username })
}

pub fn exit() -> BoxedParser<Command> {
    keyword("EXIT") >> |_| Command::Exit(Exit)
}

/// Ordered alternation over every command shape.
///
/// The order matters: an alternative must never be able to succeed on input
/// meant for a later one. `GET USERS` and `GET GROUPS` fail on `GET MESSAGE ...`
/// because their second keyword differs, so all three `GET` forms can share the
/// prefix.
pub fn command_parser() -> BoxedParser<Command> {
    create_user()
        | delete_user()
        | disable_user()
        | send_message()
        | ping()
        | add_to_group()
        | remove_from_group()
        | get_users()
        | get_groups()
        | get_message_history()
        | exit()
}

/// The complete line parser: the grammar plus the full-consumption check.
///
/// Building the grammar allocates, so callers handling many lines keep one
/// `CommandParser` around instead of calling [`parse_command`] per line.
#[derive(Clone)]
pub struct CommandParser {
    grammar: BoxedParser<Command>,
}

impl CommandParser {
    pub fn new() -> Self {
        Self {
            grammar: command_parser(),
        }
    }

    /// Parse one normalized line (no comment, no surrounding whitespace).
    pub fn parse(&self, line: &str) -> Result<Command, ParsingError> {
        let Parsed { value, next } = self
            .grammar
            .parse(line, 0)
            .map_err(ParsingError::NoMatch)?;
        if next != line.len() {
            return Err(ParsingError::TrailingInput { position: next });
        }
        Ok(value)
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a single line with a freshly built [`CommandParser`].
pub fn parse_command(line: &str) -> Result<Command, ParsingError> {
    CommandParser::new().parse(line)
}
