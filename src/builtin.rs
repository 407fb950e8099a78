use crate::command::{
    AddToGroup, Command, CommandHandler, CommandKind, CommandResult, CreateUser, DeleteUser,
    DisableUser, Exit, GetGroups, GetMessageHistory, GetUsers, Ping, RemoveFromGroup, SendMessage,
};
use crate::directory::{Directory, DirectoryError};
use crate::registry::Handler;

/// Built-in commands known to the interpreter at compile time.
///
/// Each command payload executes itself; [`Handler`] adapts it to the object-safe
/// [`CommandHandler`] the registry stores.
pub(crate) trait BuiltinCommand: Sized {
    /// The variant this payload belongs to.
    const KIND: CommandKind;

    /// Borrows the payload out of `command` when it is the matching variant.
    fn from_command(command: &Command) -> Option<&Self>;

    /// Executes the command against the directory.
    fn execute(&self, directory: &mut Directory) -> CommandResult;
}

impl<T: BuiltinCommand> CommandHandler for Handler<T> {
    fn kind(&self) -> CommandKind {
        T::KIND
    }

    fn execute(&self, command: &Command, directory: &mut Directory) -> CommandResult {
        match T::from_command(command) {
            Some(cmd) => cmd.execute(directory),
            None => CommandResult::failure("❌ Unknown command"),
        }
    }
}

/// `✅ <echo>` on success, `❌ <echo> (Failed: <reason>)` otherwise.
fn report(echo: impl std::fmt::Display, outcome: Result<(), DirectoryError>) -> CommandResult {
    match outcome {
        Ok(()) => CommandResult::success(format!("✅ {echo}")),
        Err(err) => CommandResult::failure(format!("❌ {echo} (Failed: {err})")),
    }
}

fn list_or_none<I: IntoIterator<Item = String>>(items: I) -> String {
    let items: Vec<String> = items.into_iter().collect();
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

impl BuiltinCommand for CreateUser {
    const KIND: CommandKind = CommandKind::CreateUser;

    fn from_command(command: &Command) -> Option<&Self> {
        match command {
            Command::CreateUser(cmd) => Some(cmd),
            _ => None,
        }
    }

    fn execute(&self, directory: &mut Directory) -> CommandResult {
        report(self, directory.create_user(&self.username))
    }
}

impl BuiltinCommand for DeleteUser {
    const KIND: CommandKind = CommandKind::DeleteUser;

    fn from_command(command: &Command) -> Option<&Self> {
        match command {
            Command::DeleteUser(cmd) => Some(cmd),
            _ => None,
        }
    }

    fn execute(&self, directory: &mut Directory) -> CommandResult {
        report(self, directory.delete_user(&self.username))
    }
}

impl BuiltinCommand for DisableUser {
    const KIND: CommandKind = CommandKind::DisableUser;

    fn from_command(command: &Command) -> Option<&Self> {
        match command {
            Command::DisableUser(cmd) => Some(cmd),
            _ => None,
        }
    }

    fn execute(&self, directory: &mut Directory) -> CommandResult {
        report(self, directory.disable_user(&self.username))
    }
}

impl BuiltinCommand for SendMessage {
    const KIND: CommandKind = CommandKind::SendMessage;

    fn from_command(command: &Command) -> Option<&Self> {
        match command {
            Command::SendMessage(cmd) => Some(cmd),
            _ => None,
        }
    }

    fn execute(&self, directory: &mut Directory) -> CommandResult {
        report(self, directory.send_message(&self.username, &self.message))
    }
}

impl BuiltinCommand for Ping {
    const KIND: CommandKind = CommandKind::Ping;

    fn from_command(command: &Command) -> Option<&Self> {
        match command {
            Command::Ping(cmd) => Some(cmd),
            _ => None,
        }
    }

    /// Pinging never fails: unknown users simply never answer, and a count of
    /// zero or less sends nothing.
    fn execute(&self, directory: &mut Directory) -> CommandResult {
        let reachable = directory.user_exists(&self.username);
        let mut lines = vec![format!(
            "✅ Send ping to {} ({}):",
            self.username, self.times
        )];
        for _ in 0..self.times {
            lines.push(format!("Sent ping to {}", self.username));
            if reachable {
                lines.push(format!("{} received a ping", self.username));
            }
        }
        CommandResult::success(lines.join("\n"))
    }
}

impl BuiltinCommand for AddToGroup {
    const KIND: CommandKind = CommandKind::AddToGroup;

    fn from_command(command: &Command) -> Option<&Self> {
        match command {
            Command::AddToGroup(cmd) => Some(cmd),
            _ => None,
        }
    }

    fn execute(&self, directory: &mut Directory) -> CommandResult {
        report(self, directory.add_to_group(&self.username, &self.group))
    }
}

impl BuiltinCommand for RemoveFromGroup {
    const KIND: CommandKind = CommandKind::RemoveFromGroup;

    fn from_command(command: &Command) -> Option<&Self> {
        match command {
            Command::RemoveFromGroup(cmd) => Some(cmd),
            _ => None,
        }
    }

    fn execute(&self, directory: &mut Directory) -> CommandResult {
        report(self, directory.remove_from_group(&self.username, &self.group))
    }
}

impl BuiltinCommand for GetUsers {
    const KIND: CommandKind = CommandKind::GetUsers;

    fn from_command(command: &Command) -> Option<&Self> {
        match command {
            Command::GetUsers(cmd) => Some(cmd),
            _ => None,
        }
    }

    fn execute(&self, directory: &mut Directory) -> CommandResult {
        let users = directory.users().into_iter().map(str::to_string);
        CommandResult::success(format!("✅ {self}\nUsers: {}", list_or_none(users)))
    }
}

impl BuiltinCommand for GetGroups {
    const KIND: CommandKind = CommandKind::GetGroups;

    fn from_command(command: &Command) -> Option<&Self> {
        match command {
            Command::GetGroups(cmd) => Some(cmd),
            _ => None,
        }
    }

    fn execute(&self, directory: &mut Directory) -> CommandResult {
        let groups = directory.groups().into_iter().map(str::to_string);
        CommandResult::success(format!("✅ {self}\nGroups: {}", list_or_none(groups)))
    }
}

impl BuiltinCommand for GetMessageHistory {
    const KIND: CommandKind = CommandKind::GetMessageHistory;

    fn from_command(command: &Command) -> Option<&Self> {
        match command {
            Command::GetMessageHistory(cmd) => Some(cmd),
            _ => None,
        }
    }

    fn execute(&self, directory: &mut Directory) -> CommandResult {
        match directory.message_history(&self.username) {
            Ok(messages) => {
                let quoted = messages.iter().map(|m| format!("\"{m}\""));
                CommandResult::success(format!("✅ {self}\nMessages: {}", list_or_none(quoted)))
            }
            Err(err) => CommandResult::failure(format!("❌ {self} (Failed: {err})")),
        }
    }
}

impl BuiltinCommand for Exit {
    const KIND: CommandKind = CommandKind::Exit;

    fn from_command(command: &Command) -> Option<&Self> {
        match command {
            Command::Exit(cmd) => Some(cmd),
            _ => None,
        }
    }

    fn execute(&self, _directory: &mut Directory) -> CommandResult {
        CommandResult::exit(format!("✅ {self}"))
    }
}
