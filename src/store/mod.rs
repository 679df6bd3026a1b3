//! The document store: records, the `Store` abstraction and its
//! implementations.
//!
//! Resolvers never talk to a concrete database type. They get a `dyn Store`
//! injected through the API context, which keeps the resolver logic testable
//! against the in-memory implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub(crate) mod mongo;
#[cfg(test)]
pub(crate) mod memory;


/// An event document, as stored.
#[derive(Debug, Clone)]
pub(crate) struct EventRecord {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) price: f64,
    pub(crate) date: DateTime<Utc>,
    /// ID of the user that created this event.
    pub(crate) creator: String,
}

/// An event that is about to be inserted. The store assigns the ID.
#[derive(Debug, Clone)]
pub(crate) struct NewEvent {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) price: f64,
    pub(crate) date: DateTime<Utc>,
    pub(crate) creator: String,
}

/// A user document, as stored. The password is only ever stored as hash.
#[derive(Debug, Clone)]
pub(crate) struct UserRecord {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) password_hash: String,
}

#[derive(Debug, Clone)]
pub(crate) struct NewUser {
    pub(crate) email: String,
    pub(crate) password_hash: String,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum StoreError {
    /// Emails are unique; inserting a second user with the same email is
    /// rejected by the store itself (not just by the resolver pre-check).
    #[error("a user with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("malformed document id '{0}'")]
    MalformedId(String),

    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

/// Access to the two collections this system knows about. All methods are
/// single operations; none of them span transactions.
#[async_trait]
pub(crate) trait Store: Send + Sync {
    /// All events, in the store's natural return order.
    async fn events(&self) -> Result<Vec<EventRecord>, StoreError>;

    /// All events created by the given user, in insertion order. An unknown
    /// or malformed ID yields an empty list.
    async fn events_by_creator(&self, creator: &str) -> Result<Vec<EventRecord>, StoreError>;

    async fn insert_event(&self, event: NewEvent) -> Result<EventRecord, StoreError>;

    /// All users, in the store's natural return order.
    async fn users(&self) -> Result<Vec<UserRecord>, StoreError>;

    /// Looks up a single user. A malformed ID is treated as "not found".
    async fn user_by_id(&self, id: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Inserts a new user. Fails with [`StoreError::DuplicateEmail`] if the
    /// email is already taken.
    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StoreError>;
}
