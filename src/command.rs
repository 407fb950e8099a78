use crate::directory::Directory;
use std::fmt;

/// `CREATE USER <username>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUser {
    pub username: String,
}

/// `DELETE USER <username>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteUser {
    pub username: String,
}

/// `DISABLE USER <username>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisableUser {
    pub username: String,
}

/// `SEND MESSAGE <username> "<message>"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessage {
    pub username: String,
    /// Text between the quotes, exactly as written.
    pub message: String,
}

/// `PING <username> <times>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ping {
    pub username: String,
    /// Not bounded by the grammar; zero means no pings are sent.
    pub times: i32,
}

/// `ADD USER <username> TO GROUP <group>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddToGroup {
    pub username: String,
    pub group: String,
}

/// `REMOVE USER <username> FROM GROUP <group>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveFromGroup {
    pub username: String,
    pub group: String,
}

/// `GET USERS`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetUsers;

/// `GET GROUPS`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetGroups;

/// `GET MESSAGE HISTORY <username>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetMessageHistory {
    pub username: String,
}

/// `EXIT`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exit;

/// A parsed script line.
///
/// The set of variants is closed: every variant has exactly one handler in the
/// default [`Registry`](crate::Registry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateUser(CreateUser),
    DeleteUser(DeleteUser),
    DisableUser(DisableUser),
    SendMessage(SendMessage),
    Ping(Ping),
    AddToGroup(AddToGroup),
    RemoveFromGroup(RemoveFromGroup),
    GetUsers(GetUsers),
    GetGroups(GetGroups),
    GetMessageHistory(GetMessageHistory),
    Exit(Exit),
}

/// Fieldless tag identifying a [`Command`] variant. Used as the registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandKind {
    CreateUser,
    DeleteUser,
    DisableUser,
    SendMessage,
    Ping,
    AddToGroup,
    RemoveFromGroup,
    GetUsers,
    GetGroups,
    GetMessageHistory,
    Exit,
}

impl CommandKind {
    /// Every kind, in grammar order.
    pub const ALL: [CommandKind; 11] = [
        CommandKind::CreateUser,
        CommandKind::DeleteUser,
        CommandKind::DisableUser,
        CommandKind::SendMessage,
        CommandKind::Ping,
        CommandKind::AddToGroup,
        CommandKind::RemoveFromGroup,
        CommandKind::GetUsers,
        CommandKind::GetGroups,
        CommandKind::GetMessageHistory,
        CommandKind::Exit,
    ];
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::CreateUser(_) => CommandKind::CreateUser,
            Command::DeleteUser(_) => CommandKind::DeleteUser,
            Command::DisableUser(_) => CommandKind::DisableUser,
            Command::SendMessage(_) => CommandKind::SendMessage,
            Command::Ping(_) => CommandKind::Ping,
            Command::AddToGroup(_) => CommandKind::AddToGroup,
            Command::RemoveFromGroup(_) => CommandKind::RemoveFromGroup,
            Command::GetUsers(_) => CommandKind::GetUsers,
            Command::GetGroups(_) => CommandKind::GetGroups,
            Command::GetMessageHistory(_) => CommandKind::GetMessageHistory,
            Command::Exit(_) => CommandKind::Exit,
        }
    }
}

// Display renders the canonical script form of a command. Handlers echo it in
// their reports.

impl fmt::Display for CreateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE USER {}", self.username)
    }
}

impl fmt::Display for DeleteUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DELETE USER {}", self.username)
    }
}

impl fmt::Display for DisableUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DISABLE USER {}", self.username)
    }
}

impl fmt::Display for SendMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SEND MESSAGE {} \"{}\"", self.username, self.message)
    }
}

impl fmt::Display for Ping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PING {} {}", self.username, self.times)
    }
}

impl fmt::Display for AddToGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ADD USER {} TO GROUP {}", self.username, self.group)
    }
}

impl fmt::Display for RemoveFromGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "REMOVE USER {} FROM GROUP {}", self.username, self.group)
    }
}

impl fmt::Display for GetUsers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GET USERS")
    }
}

impl fmt::Display for GetGroups {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GET GROUPS")
    }
}

impl fmt::Display for GetMessageHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GET MESSAGE HISTORY {}", self.username)
    }
}

impl fmt::Display for Exit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EXIT")
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::CreateUser(c) => c.fmt(f),
            Command::DeleteUser(c) => c.fmt(f),
            Command::DisableUser(c) => c.fmt(f),
            Command::SendMessage(c) => c.fmt(f),
            Command::Ping(c) => c.fmt(f),
            Command::AddToGroup(c) => c.fmt(f),
            Command::RemoveFromGroup(c) => c.fmt(f),
            Command::GetUsers(c) => c.fmt(f),
            Command::GetGroups(c) => c.fmt(f),
            Command::GetMessageHistory(c) => c.fmt(f),
            Command::Exit(c) => c.fmt(f),
        }
    }
}

/// Outcome of dispatching one command.
///
/// `message` is the report line(s) for the caller to print. `should_exit` is only
/// ever set by `EXIT`; callers stop reading further lines when they see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub message: String,
    pub should_exit: bool,
}

impl CommandResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            should_exit: false,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            should_exit: false,
        }
    }

    pub fn exit(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            should_exit: true,
        }
    }
}

/// Object-safe trait for anything the [`Registry`](crate::Registry) can route a
/// command to.
///
/// Built-in handlers get this through a blanket impl; tests and embedders can
/// implement it directly.
pub trait CommandHandler {
    /// The single variant this handler executes.
    fn kind(&self) -> CommandKind;

    /// Executes `command` against `directory`.
    ///
    /// Semantic failures (unknown user, duplicate user, ...) are reported through
    /// [`CommandResult::failure`], never by panicking.
    fn execute(&self, command: &Command, directory: &mut Directory) -> CommandResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        let exit = Command::Exit(Exit);
        assert_eq!(exit.kind(), CommandKind::Exit);

        let ping = Command::Ping(Ping {
            username: "bob".to_string(),
            times: 3,
        });
        assert_eq!(ping.kind(), CommandKind::Ping);
    }

    #[test]
    fn test_all_kinds_are_distinct() {
        let mut kinds = CommandKind::ALL.to_vec();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), CommandKind::ALL.len());
    }

    #[test]
    fn test_display_renders_script_form() {
        let send = Command::SendMessage(SendMessage {
            username: "alice".to_string(),
            message: "Hello World".to_string(),
        });
        assert_eq!(send.to_string(), "SEND MESSAGE alice \"Hello World\"");

        let add = Command::AddToGroup(AddToGroup {
            username: "alice".to_string(),
            group: "admins".to_string(),
        });
        assert_eq!(add.to_string(), "ADD USER alice TO GROUP admins");

        assert_eq!(Command::GetGroups(GetGroups).to_string(), "GET GROUPS");
    }

    #[test]
    fn test_result_constructors() {
        assert!(CommandResult::success("ok").success);
        assert!(!CommandResult::failure("no").success);

        let exit = CommandResult::exit("bye");
        assert!(exit.success);
        assert!(exit.should_exit);
        assert!(!CommandResult::success("ok").should_exit);
    }
}
