use mongodb::{
    bson::doc,
    error::Error as DbError,
    options::{FindOneAndUpdateOptions, ReturnDocument, UpdateOptions},
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::mongodb::Coll;

/// ID of the counter that hands out photo IDs.
pub const PHOTO_ID_COUNTER_ID: &str = "photo_id";

/// A counter object used to implement auto-increment fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    #[serde(rename = "_id")]
    pub id: String,
    pub next: u32,
}

impl Counter {
    /// Atomically retrieve the next value of the counter with the given ID.
    pub async fn next(counters: &Coll<Counter>, id: &str) -> Result<u32> {
        let update = doc! {
            "$inc": { "next": 1 }
        };
        let options: FindOneAndUpdateOptions = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::Before)
            .build();
        let counter = counters
            .find_one_and_update(doc! {"_id": id}, update, options)
            .await?
            .ok_or_else(|| Error::MissingCounter(id.to_string()))?;
        Ok(counter.next)
    }
}

/// Create the photo ID counter if it does not already exist.
///
/// This operation is idempotent.
pub async fn ensure_photo_id_counter_exists(
    counters: &Coll<Counter>,
) -> std::result::Result<(), DbError> {
    let update = doc! {
        "$setOnInsert": { "next": 1 }
    };
    let options = UpdateOptions::builder().upsert(true).build();
    counters
        .update_one(doc! {"_id": PHOTO_ID_COUNTER_ID}, update, options)
        .await?;
    Ok(())
}
