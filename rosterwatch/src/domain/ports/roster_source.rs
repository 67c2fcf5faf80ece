//! Driven port for reading the chat service's user directory one page at a time.
//!
//! The domain owns pagination; adapters only translate a single page request
//! into a transport call.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::User;

/// Window into the directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based offset of the first entry to return.
    pub start_index: usize,
    /// Maximum number of entries the service should return.
    pub max_results: usize,
}

define_port_error! {
    /// Errors surfaced while listing directory users.
    pub enum RosterSourceError {
        /// The service rejected the credential.
        Unauthorized { message: String } =>
            "roster request unauthorized: {message}",
        /// The service throttled the request.
        RateLimited { message: String } =>
            "roster request rate limited: {message}",
        /// The request did not complete in time.
        Timeout { message: String } =>
            "roster request timed out: {message}",
        /// Network or server failure.
        Transport { message: String } =>
            "roster transport failed: {message}",
        /// The response body could not be decoded.
        Decode { message: String } =>
            "roster response decode failed: {message}",
    }
}

/// Port for fetching one page of directory users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Fetch the users in the requested window.
    ///
    /// A page shorter than `max_results` marks the end of the listing.
    ///
    /// # Examples
    ///
    /// ```
    /// use rosterwatch::domain::ports::{FixtureRosterSource, PageRequest, RosterSource};
    /// use rosterwatch::domain::{User, UserId};
    ///
    /// # async fn demo() -> Result<(), rosterwatch::domain::ports::RosterSourceError> {
    /// let source = FixtureRosterSource::new(vec![User::new(UserId::new(1), "alice", "Alice A")]);
    /// let page = source
    ///     .fetch_page(PageRequest { start_index: 0, max_results: 10 })
    ///     .await?;
    /// assert_eq!(page.len(), 1);
    /// # Ok(())
    /// # }
    /// ```
    async fn fetch_page(&self, page: PageRequest) -> Result<Vec<User>, RosterSourceError>;
}

/// Fixture source serving a fixed in-memory directory listing.
#[derive(Debug, Clone, Default)]
pub struct FixtureRosterSource {
    users: Vec<User>,
}

impl FixtureRosterSource {
    /// Serve `users` in the given order.
    #[must_use]
    pub const fn new(users: Vec<User>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl RosterSource for FixtureRosterSource {
    async fn fetch_page(&self, page: PageRequest) -> Result<Vec<User>, RosterSourceError> {
        Ok(self
            .users
            .iter()
            .skip(page.start_index)
            .take(page.max_results)
            .cloned()
            .collect())
    }
}
