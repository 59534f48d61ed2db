//! Storage backends.
//!
//! [`ElectionStore`] is the seam between the domain code and whatever persists it.
//! Each method is a single-record operation that the backend performs atomically;
//! anything spanning several records is composed on top by
//! [`ElectionRepository`](crate::repository::ElectionRepository).

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::model::{
    common::{
        election::{ElectionCode, ElectionDocument},
        photo::PhotoId,
    },
    db::{election::Election, photo::Photo},
};

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// A write against a single election record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Commit {
    /// Only apply if the record is still at this revision.
    pub expected_revision: Option<i64>,
    /// Replacement document.
    pub document: Option<ElectionDocument>,
    /// Added to `join_count`.
    pub joins: u32,
    /// Added to `voter_count`.
    pub voters: u32,
    /// New value for `last_used`.
    pub last_used: Option<DateTime<Utc>>,
}

#[rocket::async_trait]
pub trait ElectionStore: Send + Sync {
    /// Insert a new election, failing with
    /// [`Error::DuplicateCode`](crate::error::Error::DuplicateCode) if the code is taken.
    async fn insert_election(&self, election: &Election) -> Result<()>;

    async fn find_election(&self, code: &ElectionCode) -> Result<Option<Election>>;

    async fn election_exists(&self, code: &ElectionCode) -> Result<bool>;

    /// Apply `commit` and bump the revision. Returns false if no record matched,
    /// either because it is gone or because its revision moved on.
    async fn commit(&self, code: &ElectionCode, commit: Commit) -> Result<bool>;

    /// Remove an election, returning it if it existed.
    async fn remove_election(&self, code: &ElectionCode) -> Result<Option<Election>>;

    /// Codes of every election last used strictly before `cutoff`.
    async fn elections_unused_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<ElectionCode>>;

    async fn find_photo(&self, id: PhotoId) -> Result<Option<Photo>>;

    /// Take a reference to the photo with this content, storing it first if
    /// no such photo exists yet.
    async fn acquire_photo(&self, content: String) -> Result<PhotoId>;

    /// Drop one reference to a photo, deleting it once none remain.
    /// Returns true iff the photo was deleted.
    async fn release_photo(&self, id: PhotoId) -> Result<bool>;
}
