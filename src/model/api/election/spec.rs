use serde::{Deserialize, Serialize};

use crate::model::common::election::{CandidateState, ElectionDocument};

/// The body an organiser sends to create an election.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionSpec {
    /// Optional photo. Split off and stored separately.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_image: Option<String>,
    /// Everything else becomes the stored document.
    #[serde(flatten)]
    pub document: ElectionDocument,
}

impl ElectionSpec {
    /// Split into the photo content (if any) and the document to store.
    /// An empty photo string counts as no photo.
    pub fn into_parts(self) -> (Option<String>, ElectionDocument) {
        let photo = self.group_image.filter(|content| !content.is_empty());
        (photo, self.document)
    }
}

/// New state for the candidate with the given name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateUpdate {
    pub name: String,
    pub selected_state: CandidateState,
}
