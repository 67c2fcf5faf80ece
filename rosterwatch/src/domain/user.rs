//! Directory user records as reported by the chat service.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable numeric identifier assigned to a user by the chat service.
///
/// Identifiers survive renames, so they are the only key used when comparing
/// rosters between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw service identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Return the raw service identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One directory entry: identifier, mention handle, and full name.
///
/// Field names follow the service's wire format so snapshot files stay
/// readable by other tooling. Extra attributes present in a payload are
/// ignored on decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    mention_name: String,
    name: String,
}

impl User {
    /// Build a user record.
    ///
    /// # Examples
    ///
    /// ```
    /// use rosterwatch::domain::{User, UserId};
    ///
    /// let user = User::new(UserId::new(7), "alice", "Alice A");
    /// assert_eq!(user.mention_name(), "alice");
    /// ```
    pub fn new(id: UserId, mention_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            mention_name: mention_name.into(),
            name: name.into(),
        }
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Mention handle, without the leading `@`.
    #[must_use]
    pub fn mention_name(&self) -> &str {
        &self.mention_name
    }

    /// Full display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}
