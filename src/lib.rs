//! A task-script runner for a small in-memory user directory.
//!
//! Scripts are plain text, one command per line, with `#` comments. Each line is
//! parsed by a grammar assembled from the combinators in [`combinator`], turned
//! into a typed [`Command`] and routed by a [`Registry`] to the handler for its
//! kind. Handlers act on a [`Directory`] of users, groups and message histories and
//! answer with a [`CommandResult`].
//!
//! The main entry point is [`Interpreter`], which runs whole scripts as
//! independent tasks (every task starts with an empty directory) and stops a task
//! at its first invalid or failed command. The public modules [`command`] and
//! [`registry`] expose the types needed to plug in handlers of your own.

mod builtin;
pub mod combinator;
pub mod command;
pub mod directory;
pub mod interpreter;
pub mod parser;
pub mod registry;
pub mod script;

pub use command::{Command, CommandHandler, CommandKind, CommandResult};
pub use directory::{Directory, DirectoryError};
pub use interpreter::{Interpreter, LineOutcome, TaskStatus};
pub use parser::{CommandParser, ParsingError, parse_command};
pub use registry::{Registry, RegistryError};
pub use script::TaskError;
