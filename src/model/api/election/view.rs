use rocket::serde::json::{serde_json::Map, Value};
use serde::Serialize;

use crate::model::common::election::{ElectionCode, ElectionDocument};

/// The document as sent to clients, with the photo merged back in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionData {
    #[serde(flatten)]
    pub document: ElectionDocument,
    /// Left out when the election has no photo.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_image: Option<String>,
}

/// Response to creating an election.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedView {
    pub code: ElectionCode,
    pub data: ElectionDocument,
}

/// Response to joining a shared election.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinView {
    pub code: ElectionCode,
    pub data: ElectionData,
}

/// Response to joining a virtual election.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualJoinView {
    pub code: ElectionCode,
    pub is_election_finished: bool,
    /// Withheld from participants once voting has finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ElectionData>,
}

/// Response to a vote or other state change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationView {
    pub data: ElectionDocument,
}

/// Response to a (possibly field-filtered) retrieval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrieveView {
    pub code: ElectionCode,
    pub data: Map<String, Value>,
}

/// Response to a virtual retrieval, which also reports how many ballots arrived.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualRetrieveView {
    pub code: ElectionCode,
    pub data: Map<String, Value>,
    pub voter_count: u32,
}
