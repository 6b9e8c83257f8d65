//! Workspace-level configuration: scope, visibility and users.

use std::{cmp::Ordering, collections::BTreeSet, fmt, str::FromStr};

/// What a workspace is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceScope {
    Landscape,
    SoftwareSystem,
}

impl FromStr for WorkspaceScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "landscape" => Ok(Self::Landscape),
            "softwaresystem" => Ok(Self::SoftwareSystem),
            _ => Err(format!(
                "`{s}` is not a valid scope, expected one of: landscape, softwaresystem, none"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Private,
    Public,
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "private" => Ok(Self::Private),
            "public" => Ok(Self::Public),
            _ => Err(format!(
                "`{s}` is not a valid visibility, expected one of: private, public"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    ReadWrite,
    ReadOnly,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "write" => Ok(Self::ReadWrite),
            "read" => Ok(Self::ReadOnly),
            _ => Err(format!("`{s}` is not a valid role, expected one of: read, write")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::ReadWrite => f.write_str("write"),
            Role::ReadOnly => f.write_str("read"),
        }
    }
}

/// A user with access to the workspace.
///
/// Users are identified by username alone: two users with the same name but
/// different roles are the same user.
#[derive(Debug, Clone)]
pub struct User {
    username: String,
    role: Role,
}

impl User {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.username == other.username
    }
}

impl Eq for User {}

impl PartialOrd for User {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for User {
    fn cmp(&self, other: &Self) -> Ordering {
        self.username.cmp(&other.username)
    }
}

/// Scope, visibility and users of a workspace.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceConfiguration {
    scope: Option<WorkspaceScope>,
    visibility: Option<Visibility>,
    users: BTreeSet<User>,
}

impl WorkspaceConfiguration {
    pub fn scope(&self) -> Option<WorkspaceScope> {
        self.scope
    }

    pub fn visibility(&self) -> Option<Visibility> {
        self.visibility
    }

    /// Users sorted by username.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.iter()
    }

    pub(crate) fn set_scope(&mut self, scope: Option<WorkspaceScope>) {
        self.scope = scope;
    }

    pub(crate) fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = Some(visibility);
    }

    /// Adds a user, replacing the role of an existing user with that name.
    pub(crate) fn add_user(&mut self, user: User) {
        self.users.replace(user);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_users_unique_by_username_and_sorted() {
        let mut config = WorkspaceConfiguration::default();
        config.add_user(User::new("zoe@example.com", Role::ReadOnly));
        config.add_user(User::new("adam@example.com", Role::ReadWrite));
        config.add_user(User::new("zoe@example.com", Role::ReadWrite));

        let users: Vec<_> = config
            .users()
            .map(|u| (u.username(), u.role()))
            .collect();
        assert_eq!(
            users,
            vec![
                ("adam@example.com", Role::ReadWrite),
                ("zoe@example.com", Role::ReadWrite),
            ]
        );
    }

    #[test]
    fn test_parse_scope_visibility_role() {
        assert_eq!("SoftwareSystem".parse(), Ok(WorkspaceScope::SoftwareSystem));
        assert_eq!("public".parse(), Ok(Visibility::Public));
        assert_eq!("read".parse(), Ok(Role::ReadOnly));
        assert!("admin".parse::<Role>().is_err());
    }
}
