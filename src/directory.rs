use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Reasons a directory operation can be refused.
///
/// The display text is what handlers append to their failure reports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("User already exists")]
    UserExists(String),
    #[error("User does not exist")]
    UserNotFound(String),
    #[error("User is disabled")]
    UserDisabled(String),
}

/// A single account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Disabled users keep their data but stop receiving messages.
    pub enabled: bool,
    /// Messages received, oldest first.
    pub messages: Vec<String>,
    /// Groups this user is a member of.
    pub groups: BTreeSet<String>,
}

impl Default for User {
    fn default() -> Self {
        Self {
            enabled: true,
            messages: Vec::new(),
            groups: BTreeSet::new(),
        }
    }
}

/// In-memory user/group directory that scripts operate on.
///
/// A group exists exactly as long as it has at least one member. Listings come
/// back sorted by name.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    users: BTreeMap<String, User>,
    groups: BTreeSet<String>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every user and group.
    pub fn reset(&mut self) {
        self.users.clear();
        self.groups.clear();
    }

    pub fn create_user(&mut self, username: &str) -> Result<(), DirectoryError> {
        if self.users.contains_key(username) {
            return Err(DirectoryError::UserExists(username.to_string()));
        }
        self.users.insert(username.to_string(), User::default());
        Ok(())
    }

    pub fn delete_user(&mut self, username: &str) -> Result<(), DirectoryError> {
        let user = self
            .users
            .remove(username)
            .ok_or_else(|| DirectoryError::UserNotFound(username.to_string()))?;
        for group in &user.groups {
            self.drop_group_if_empty(group);
        }
        Ok(())
    }

    pub fn disable_user(&mut self, username: &str) -> Result<(), DirectoryError> {
        self.user_mut(username)?.enabled = false;
        Ok(())
    }

    pub fn user_exists(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    pub fn is_enabled(&self, username: &str) -> bool {
        self.users.get(username).is_some_and(|user| user.enabled)
    }

    pub fn user(&self, username: &str) -> Option<&User> {
        self.users.get(username)
    }

    pub fn send_message(&mut self, username: &str, message: &str) -> Result<(), DirectoryError> {
        let user = self.user_mut(username)?;
        if !user.enabled {
            return Err(DirectoryError::UserDisabled(username.to_string()));
        }
        user.messages.push(message.to_string());
        Ok(())
    }

    /// Adds `username` to `group`, creating the group on first use.
    pub fn add_to_group(&mut self, username: &str, group: &str) -> Result<(), DirectoryError> {
        self.user_mut(username)?.groups.insert(group.to_string());
        self.groups.insert(group.to_string());
        Ok(())
    }

    /// Removes `username` from `group`. Not being a member is not an error.
    pub fn remove_from_group(&mut self, username: &str, group: &str) -> Result<(), DirectoryError> {
        self.user_mut(username)?.groups.remove(group);
        self.drop_group_if_empty(group);
        Ok(())
    }

    pub fn users(&self) -> Vec<&str> {
        self.users.keys().map(String::as_str).collect()
    }

    pub fn groups(&self) -> Vec<&str> {
        self.groups.iter().map(String::as_str).collect()
    }

    pub fn message_history(&self, username: &str) -> Result<&[String], DirectoryError> {
        self.users
            .get(username)
            .map(|user| user.messages.as_slice())
            .ok_or_else(|| DirectoryError::UserNotFound(username.to_string()))
    }

    fn user_mut(&mut self, username: &str) -> Result<&mut User, DirectoryError> {
        self.users
            .get_mut(username)
            .ok_or_else(|| DirectoryError::UserNotFound(username.to_string()))
    }

    fn drop_group_if_empty(&mut self, group: &str) {
        let has_members = self.users.values().any(|user| user.groups.contains(group));
        if !has_members {
            self.groups.remove(group);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_duplicate() {
        let mut dir = Directory::new();
        assert_eq!(dir.create_user("alice"), Ok(()));
        assert_eq!(
            dir.create_user("alice"),
            Err(DirectoryError::UserExists("alice".to_string()))
        );
        assert!(dir.user_exists("alice"));
        assert!(dir.is_enabled("alice"));
    }

    #[test]
    fn test_delete_missing_user() {
        let mut dir = Directory::new();
        assert_eq!(
            dir.delete_user("ghost"),
            Err(DirectoryError::UserNotFound("ghost".to_string()))
        );
    }

    #[test]
    fn test_users_are_sorted() {
        let mut dir = Directory::new();
        for name in ["carol", "alice", "bob"] {
            dir.create_user(name).unwrap();
        }
        assert_eq!(dir.users(), vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_disabled_user_rejects_messages() {
        let mut dir = Directory::new();
        dir.create_user("alice").unwrap();
        dir.send_message("alice", "first").unwrap();
        dir.disable_user("alice").unwrap();

        assert!(!dir.is_enabled("alice"));
        assert_eq!(
            dir.send_message("alice", "second"),
            Err(DirectoryError::UserDisabled("alice".to_string()))
        );
        assert_eq!(dir.message_history("alice").unwrap(), ["first".to_string()]);
    }

    #[test]
    fn test_group_lifecycle() {
        let mut dir = Directory::new();
        dir.create_user("alice").unwrap();
        dir.create_user("bob").unwrap();
        dir.add_to_group("alice", "admins").unwrap();
        dir.add_to_group("bob", "admins").unwrap();
        dir.add_to_group("bob", "users").unwrap();
        assert_eq!(dir.groups(), vec!["admins", "users"]);

        dir.remove_from_group("alice", "admins").unwrap();
        assert_eq!(dir.groups(), vec!["admins", "users"]);

        dir.remove_from_group("bob", "admins").unwrap();
        assert_eq!(dir.groups(), vec!["users"]);
    }

    #[test]
    fn test_delete_user_keeps_groups_with_other_members() {
        let mut dir = Directory::new();
        dir.create_user("alice").unwrap();
        dir.create_user("bob").unwrap();
        dir.add_to_group("alice", "admins").unwrap();
        dir.add_to_group("bob", "admins").unwrap();
        dir.add_to_group("alice", "solo").unwrap();

        dir.delete_user("alice").unwrap();
        assert_eq!(dir.groups(), vec!["admins"]);
    }

    #[test]
    fn test_group_ops_need_existing_user() {
        let mut dir = Directory::new();
        assert!(dir.add_to_group("ghost", "admins").is_err());
        assert!(dir.remove_from_group("ghost", "admins").is_err());
        assert!(dir.groups().is_empty());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut dir = Directory::new();
        dir.create_user("alice").unwrap();
        dir.add_to_group("alice", "admins").unwrap();
        dir.reset();
        assert!(dir.users().is_empty());
        assert!(dir.groups().is_empty());
    }
}
