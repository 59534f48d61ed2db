use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rocket::tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::model::{
    common::{election::ElectionCode, photo::PhotoId},
    db::{election::Election, photo::Photo},
};

use super::{Commit, ElectionStore};

/// Process-local storage with the same semantics as [`MongoStore`](super::MongoStore).
///
/// Every method takes the single table lock, so each operation is atomic with
/// respect to the others.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    elections: HashMap<ElectionCode, Election>,
    photos: BTreeMap<PhotoId, Photo>,
    next_photo_id: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of photos currently held.
    pub async fn photo_count(&self) -> usize {
        self.tables.lock().await.photos.len()
    }
}

#[rocket::async_trait]
impl ElectionStore for MemoryStore {
    async fn insert_election(&self, election: &Election) -> Result<()> {
        let mut tables = self.tables.lock().await;
        if tables.elections.contains_key(&election.code) {
            return Err(Error::DuplicateCode(election.code.clone()));
        }
        tables
            .elections
            .insert(election.code.clone(), election.clone());
        Ok(())
    }

    async fn find_election(&self, code: &ElectionCode) -> Result<Option<Election>> {
        Ok(self.tables.lock().await.elections.get(code).cloned())
    }

    async fn election_exists(&self, code: &ElectionCode) -> Result<bool> {
        Ok(self.tables.lock().await.elections.contains_key(code))
    }

    async fn commit(&self, code: &ElectionCode, commit: Commit) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let election = match tables.elections.get_mut(code) {
            Some(election) => election,
            None => return Ok(false),
        };
        if let Some(revision) = commit.expected_revision {
            if election.revision != revision {
                return Ok(false);
            }
        }
        if let Some(document) = commit.document {
            election.document = document;
        }
        if let Some(last_used) = commit.last_used {
            election.last_used = last_used;
        }
        election.join_count += commit.joins;
        election.voter_count += commit.voters;
        election.revision += 1;
        Ok(true)
    }

    async fn remove_election(&self, code: &ElectionCode) -> Result<Option<Election>> {
        Ok(self.tables.lock().await.elections.remove(code))
    }

    async fn elections_unused_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<ElectionCode>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .elections
            .values()
            .filter(|election| election.last_used < cutoff)
            .map(|election| election.code.clone())
            .collect())
    }

    async fn find_photo(&self, id: PhotoId) -> Result<Option<Photo>> {
        Ok(self.tables.lock().await.photos.get(&id).cloned())
    }

    async fn acquire_photo(&self, content: String) -> Result<PhotoId> {
        let mut tables = self.tables.lock().await;
        if let Some(photo) = tables
            .photos
            .values_mut()
            .find(|photo| photo.content == content)
        {
            photo.references += 1;
            return Ok(photo.id);
        }
        tables.next_photo_id += 1;
        let id = PhotoId(tables.next_photo_id);
        let photo = Photo {
            id,
            content,
            references: 1,
        };
        tables.photos.insert(id, photo);
        Ok(id)
    }

    async fn release_photo(&self, id: PhotoId) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let remaining = match tables.photos.get_mut(&id) {
            Some(photo) => {
                photo.references = photo.references.saturating_sub(1);
                photo.references
            }
            None => return Ok(false),
        };
        if remaining > 0 {
            return Ok(false);
        }
        Ok(tables.photos.remove(&id).is_some())
    }
}
