//! Identifier-keyed roster collection.

use std::collections::BTreeMap;
use std::collections::btree_map;

use super::user::{User, UserId};

/// The set of users reported by the directory at one point in time.
///
/// Users are keyed by [`UserId`]; inserting a second record with the same
/// identifier replaces the first. Iteration runs in ascending identifier order
/// so persisted snapshots are stable, but callers comparing rosters must not
/// rely on any order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    users: BTreeMap<UserId, User>,
}

impl Roster {
    /// Create an empty roster.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            users: BTreeMap::new(),
        }
    }

    /// Insert a user, returning the record previously stored under its id.
    pub fn insert(&mut self, user: User) -> Option<User> {
        self.users.insert(user.id(), user)
    }

    /// Look up a user by identifier.
    #[must_use]
    pub fn get(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Return whether a user with this identifier is present.
    #[must_use]
    pub fn contains(&self, id: UserId) -> bool {
        self.users.contains_key(&id)
    }

    /// Number of distinct users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Return whether the roster holds no users.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Iterate over users in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }
}

impl FromIterator<User> for Roster {
    fn from_iter<I: IntoIterator<Item = User>>(iter: I) -> Self {
        let mut roster = Self::new();
        roster.extend(iter);
        roster
    }
}

impl Extend<User> for Roster {
    fn extend<I: IntoIterator<Item = User>>(&mut self, iter: I) {
        for user in iter {
            self.insert(user);
        }
    }
}

impl IntoIterator for Roster {
    type Item = User;
    type IntoIter = btree_map::IntoValues<UserId, User>;

    fn into_iter(self) -> Self::IntoIter {
        self.users.into_values()
    }
}
