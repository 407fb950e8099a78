//! Routing of parsed commands to their handlers.
//!
//! The registry is a fixed table from [`CommandKind`] to one boxed
//! [`CommandHandler`]. It is filled once when constructed and never changes
//! afterwards. [`Command::kind`] is an exhaustive `match`, so adding a variant
//! without a kind fails to build; the default table covering every kind is checked
//! by tests.

use crate::builtin::BuiltinCommand;
use crate::command::{
    AddToGroup, Command, CommandHandler, CommandKind, CommandResult, CreateUser, DeleteUser,
    DisableUser, Exit, GetGroups, GetMessageHistory, GetUsers, Ping, RemoveFromGroup, SendMessage,
};
use crate::directory::Directory;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{trace, warn};

/// Handler allows dispatching to a built-in command payload.
///
/// Only supports commands defined in this crate, see [`BuiltinCommand`].
pub(crate) struct Handler<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Handler<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

fn builtin<T: BuiltinCommand + 'static>() -> (CommandKind, Box<dyn CommandHandler>) {
    (T::KIND, Box::new(Handler::<T>::default()))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("a handler for {0:?} is already registered")]
    Duplicate(CommandKind),
}

/// Table of command handlers, keyed by command kind.
pub struct Registry {
    handlers: HashMap<CommandKind, Box<dyn CommandHandler>>,
}

impl Registry {
    /// Create a registry from an explicit set of handlers.
    ///
    /// Each kind may be claimed by at most one handler. Kinds left without a
    /// handler dispatch to an "unknown command" failure.
    pub fn new(handlers: Vec<Box<dyn CommandHandler>>) -> Result<Self, RegistryError> {
        let mut table = HashMap::with_capacity(handlers.len());
        for handler in handlers {
            let kind = handler.kind();
            if table.insert(kind, handler).is_some() {
                return Err(RegistryError::Duplicate(kind));
            }
        }
        Ok(Self { handlers: table })
    }

    /// Run the handler registered for `command`'s variant and return its result
    /// unchanged.
    pub fn dispatch(&self, command: &Command, directory: &mut Directory) -> CommandResult {
        let kind = command.kind();
        match self.handlers.get(&kind) {
            Some(handler) => {
                trace!(?kind, "dispatching");
                handler.execute(command, directory)
            }
            None => {
                warn!(?kind, "no handler registered");
                CommandResult::failure("❌ Unknown command")
            }
        }
    }

    pub fn handles(&self, kind: CommandKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Kinds without a handler, in grammar order.
    pub fn missing(&self) -> Vec<CommandKind> {
        CommandKind::ALL
            .into_iter()
            .filter(|kind| !self.handles(*kind))
            .collect()
    }

    pub fn is_exhaustive(&self) -> bool {
        self.missing().is_empty()
    }
}

impl Default for Registry {
    /// Registry with the built-in handler for every command kind.
    fn default() -> Self {
        Self {
            handlers: HashMap::from([
                builtin::<CreateUser>(),
                builtin::<DeleteUser>(),
                builtin::<DisableUser>(),
                builtin::<SendMessage>(),
                builtin::<Ping>(),
                builtin::<AddToGroup>(),
                builtin::<RemoveFromGroup>(),
                builtin::<GetUsers>(),
                builtin::<GetGroups>(),
                builtin::<GetMessageHistory>(),
                builtin::<Exit>(),
            ]),
        }
    }
}
