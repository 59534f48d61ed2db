use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::common::{
    election::{ElectionCode, ElectionDocument, ElectionKind},
    photo::PhotoId,
};

/// An election as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Election {
    /// Join code, also the primary key.
    #[serde(rename = "_id")]
    pub code: ElectionCode,
    /// Shared or virtual; never changes.
    pub kind: ElectionKind,
    /// How many times anyone has joined.
    pub join_count: u32,
    /// Ballots cast through the virtual voting endpoint.
    pub voter_count: u32,
    /// Refreshed on every join and mutation; drives retention.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub last_used: DateTime<Utc>,
    /// The election's photo, if it has one.
    pub photo_id: Option<PhotoId>,
    /// Bumped on every write, used to detect concurrent read-modify-write cycles.
    pub revision: i64,
    /// The organiser's payload.
    pub document: ElectionDocument,
}

impl Election {
    /// A freshly created election with zeroed counters.
    pub fn new(
        code: ElectionCode,
        kind: ElectionKind,
        document: ElectionDocument,
        photo_id: Option<PhotoId>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            code,
            kind,
            join_count: 0,
            voter_count: 0,
            last_used: now,
            photo_id,
            revision: 0,
            document,
        }
    }
}
