use chrono::{DateTime, Utc};
use mongodb::{
    bson::{doc, to_bson, DateTime as BsonDateTime, Document},
    options::CountOptions,
    Database,
};
use rocket::futures::TryStreamExt;

use crate::error::{Error, Result};
use crate::model::{
    common::{election::ElectionCode, photo::PhotoId},
    db::{election::Election, photo::Photo},
    mongodb::{is_duplicate_key_error, Coll, Counter, PHOTO_ID_COUNTER_ID},
};

use super::{Commit, ElectionStore};

/// MongoDB-backed storage.
#[derive(Clone)]
pub struct MongoStore {
    elections: Coll<Election>,
    photos: Coll<Photo>,
    counters: Coll<Counter>,
}

impl MongoStore {
    pub fn new(db: &Database) -> Self {
        Self {
            elections: Coll::from_db(db),
            photos: Coll::from_db(db),
            counters: Coll::from_db(db),
        }
    }
}

/// Storing a photo only conflicts when the same content is stored and released
/// concurrently, so a couple of rounds always suffice in practice.
const PHOTO_STORE_ATTEMPTS: u32 = 3;

fn code_filter(code: &ElectionCode) -> Document {
    doc! { "_id": code }
}

/// Existence checks only ever need one match.
fn at_most_one() -> CountOptions {
    CountOptions::builder().limit(1).build()
}

#[rocket::async_trait]
impl ElectionStore for MongoStore {
    async fn insert_election(&self, election: &Election) -> Result<()> {
        match self.elections.insert_one(election, None).await {
            Ok(_) => Ok(()),
            Err(err) if is_duplicate_key_error(&err) => {
                Err(Error::DuplicateCode(election.code.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_election(&self, code: &ElectionCode) -> Result<Option<Election>> {
        Ok(self.elections.find_one(code_filter(code), None).await?)
    }

    async fn election_exists(&self, code: &ElectionCode) -> Result<bool> {
        let count = self
            .elections
            .count_documents(code_filter(code), at_most_one())
            .await?;
        Ok(count > 0)
    }

    async fn commit(&self, code: &ElectionCode, commit: Commit) -> Result<bool> {
        let mut filter = code_filter(code);
        if let Some(revision) = commit.expected_revision {
            filter.insert("revision", revision);
        }

        let mut set = Document::new();
        if let Some(document) = &commit.document {
            set.insert("document", to_bson(document)?);
        }
        if let Some(last_used) = commit.last_used {
            set.insert("last_used", BsonDateTime::from_chrono(last_used));
        }
        let mut inc = doc! { "revision": 1_i64 };
        if commit.joins > 0 {
            inc.insert("join_count", i64::from(commit.joins));
        }
        if commit.voters > 0 {
            inc.insert("voter_count", i64::from(commit.voters));
        }

        let mut update = doc! { "$inc": inc };
        if !set.is_empty() {
            update.insert("$set", set);
        }

        let result = self.elections.update_one(filter, update, None).await?;
        Ok(result.matched_count == 1)
    }

    async fn remove_election(&self, code: &ElectionCode) -> Result<Option<Election>> {
        Ok(self
            .elections
            .find_one_and_delete(code_filter(code), None)
            .await?)
    }

    async fn elections_unused_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<ElectionCode>> {
        let filter = doc! {
            "last_used": { "$lt": BsonDateTime::from_chrono(cutoff) },
        };
        let stale: Vec<Election> = self.elections.find(filter, None).await?.try_collect().await?;
        Ok(stale.into_iter().map(|election| election.code).collect())
    }

    async fn find_photo(&self, id: PhotoId) -> Result<Option<Photo>> {
        Ok(self.photos.find_one(doc! { "_id": id }, None).await?)
    }

    async fn acquire_photo(&self, content: String) -> Result<PhotoId> {
        let filter = doc! { "content": content.as_str() };
        let take_reference = doc! { "$inc": { "references": 1 } };
        for _ in 0..PHOTO_STORE_ATTEMPTS {
            if let Some(photo) = self
                .photos
                .find_one_and_update(filter.clone(), take_reference.clone(), None)
                .await?
            {
                return Ok(photo.id);
            }

            let id = PhotoId(Counter::next(&self.counters, PHOTO_ID_COUNTER_ID).await?);
            let photo = Photo {
                id,
                content: content.clone(),
                references: 1,
            };
            match self.photos.insert_one(&photo, None).await {
                Ok(_) => return Ok(id),
                // The same content was stored concurrently; take a reference to that one.
                Err(err) if is_duplicate_key_error(&err) => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Err(Error::PhotoContended)
    }

    async fn release_photo(&self, id: PhotoId) -> Result<bool> {
        self.photos
            .update_one(
                doc! { "_id": id, "references": { "$gt": 0 } },
                doc! { "$inc": { "references": -1 } },
                None,
            )
            .await?;
        // Only delete if nobody took a new reference in the meantime.
        let result = self
            .photos
            .delete_one(doc! { "_id": id, "references": { "$lte": 0 } }, None)
            .await?;
        Ok(result.deleted_count == 1)
    }
}
