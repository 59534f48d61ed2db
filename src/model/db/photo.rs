use serde::{Deserialize, Serialize};

use crate::model::common::photo::PhotoId;

/// A stored photo. Content is unique across the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    #[serde(rename = "_id")]
    pub id: PhotoId,
    pub content: String,
    /// How many elections hold this photo. It is deleted when this drops to zero.
    #[serde(default)]
    pub references: u32,
}
