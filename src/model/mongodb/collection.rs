use std::ops::Deref;

use mongodb::{
    bson::doc, error::Error as DbError, options::IndexOptions, Collection, Database, IndexModel,
};

use crate::model::db::{election::Election, photo::Photo};

use super::counter::Counter;

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl MongoCollection for Election {
    const NAME: &'static str = "elections";
}

impl MongoCollection for Photo {
    const NAME: &'static str = "photos";
}

impl MongoCollection for Counter {
    const NAME: &'static str = "counters";
}

/// Ensure that all the required indexes exist on the given database.
///
/// Election codes need no index of their own: they are the `_id`, which MongoDB
/// already keeps unique.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    let elections = Coll::<Election>::from_db(db);

    // Retention sweeps scan by age.
    let last_used_index = IndexModel::builder().keys(doc! {"last_used": 1}).build();
    elections.create_index(last_used_index, None).await?;

    // Identical photos are stored once.
    let photos = Coll::<Photo>::from_db(db);
    let unique = IndexOptions::builder().unique(true).build();
    let content_index = IndexModel::builder()
        .keys(doc! {"content": 1})
        .options(unique)
        .build();
    photos.create_index(content_index, None).await?;

    Ok(())
}
