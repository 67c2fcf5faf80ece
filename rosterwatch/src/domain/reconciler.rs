//! Roster comparison producing arrival and departure events.

use std::collections::HashSet;
use std::fmt;

use super::roster::Roster;
use super::user::User;

/// A presence change detected between two rosters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChangeEvent {
    /// The user is present now but was absent from the previous roster.
    Arrived(User),
    /// The user was present previously but is absent now.
    Departed(User),
}

impl ChangeEvent {
    /// The user this event concerns.
    #[must_use]
    pub const fn user(&self) -> &User {
        match self {
            Self::Arrived(user) | Self::Departed(user) => user,
        }
    }

    /// Render the announcement sent to recipients.
    ///
    /// # Examples
    ///
    /// ```
    /// use rosterwatch::domain::{ChangeEvent, User, UserId};
    ///
    /// let bob = User::new(UserId::new(2), "bob", "Bob B");
    /// assert_eq!(
    ///     ChangeEvent::Arrived(bob.clone()).message(),
    ///     "Say hello to @bob (Bob B)"
    /// );
    /// assert_eq!(
    ///     ChangeEvent::Departed(bob).message(),
    ///     "Goodbye to @bob (Bob B)"
    /// );
    /// ```
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arrived(user) => write!(
                f,
                "Say hello to @{} ({})",
                user.mention_name(),
                user.name()
            ),
            Self::Departed(user) => {
                write!(f, "Goodbye to @{} ({})", user.mention_name(), user.name())
            }
        }
    }
}

/// Unordered result of comparing a previous roster with the current one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterChanges {
    departed: HashSet<User>,
    arrived: HashSet<User>,
}

impl RosterChanges {
    /// Users present only in the previous roster.
    #[must_use]
    pub const fn departed(&self) -> &HashSet<User> {
        &self.departed
    }

    /// Users present only in the current roster.
    #[must_use]
    pub const fn arrived(&self) -> &HashSet<User> {
        &self.arrived
    }

    /// Return whether nobody arrived or departed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.departed.is_empty() && self.arrived.is_empty()
    }

    /// Total number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.departed.len() + self.arrived.len()
    }

    /// Consume the changes as events, departures before arrivals.
    ///
    /// Order within each group is unspecified.
    pub fn into_events(self) -> impl Iterator<Item = ChangeEvent> {
        self.departed
            .into_iter()
            .map(ChangeEvent::Departed)
            .chain(self.arrived.into_iter().map(ChangeEvent::Arrived))
    }
}

/// Compare two rosters by user identifier.
///
/// A user is departed when their identifier appears only in `previous` and
/// arrived when it appears only in `current`. Records whose identifier is in
/// both rosters produce no event, even if their names changed.
///
/// # Examples
///
/// ```
/// use rosterwatch::domain::{Roster, User, UserId, diff};
///
/// let alice = User::new(UserId::new(1), "alice", "Alice A");
/// let bob = User::new(UserId::new(2), "bob", "Bob B");
/// let previous: Roster = [alice.clone()].into_iter().collect();
/// let current: Roster = [alice, bob.clone()].into_iter().collect();
///
/// let changes = diff(&previous, &current);
/// assert!(changes.departed().is_empty());
/// assert!(changes.arrived().contains(&bob));
/// ```
#[must_use]
pub fn diff(previous: &Roster, current: &Roster) -> RosterChanges {
    let departed = previous
        .iter()
        .filter(|user| !current.contains(user.id()))
        .cloned()
        .collect();
    let arrived = current
        .iter()
        .filter(|user| !previous.contains(user.id()))
        .cloned()
        .collect();

    RosterChanges { departed, arrived }
}
