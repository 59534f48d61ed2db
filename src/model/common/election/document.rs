use rocket::serde::json::{serde_json::Map, Value};
use serde::{Deserialize, Serialize};

/// The organiser-defined payload of an election.
///
/// Only the fields the voting operations touch are modelled, and all of them are
/// optional: whatever the organiser leaves out stays out. Everything else the
/// organiser sends is carried through untouched in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionDocument {
    /// Candidates, addressed by position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<Candidate>>,
    /// How many ballots are expected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_voters: Option<u32>,
    /// How many ballots have been cast so far.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_voted: Option<u32>,
    /// Absent until the first seat is taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_seats_taken: Option<u32>,
    /// Absent until someone skips.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_skipped: Option<bool>,
    /// Opaque organiser fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ElectionDocument {
    /// The candidates, or none if the organiser gave no list.
    pub fn candidates(&self) -> &[Candidate] {
        self.candidates.as_deref().unwrap_or_default()
    }

    pub fn voters(&self) -> u32 {
        self.number_of_voters.unwrap_or(0)
    }

    pub fn voted(&self) -> u32 {
        self.number_of_voted.unwrap_or(0)
    }

    /// Voting is over once every expected voter has cast a ballot.
    pub fn is_finished(&self) -> bool {
        self.voted() == self.voters()
    }
}

/// A single candidate and their running tally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_state: Option<CandidateState>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Candidate {
    pub fn votes(&self) -> u32 {
        self.vote_count.unwrap_or(0)
    }

    /// The anonymous form shown to participants of a virtual election.
    pub fn redacted(&self) -> Self {
        Self {
            name: self.name.clone(),
            vote_count: Some(0),
            selected_state: Some(CandidateState::unselected()),
            extra: Map::new(),
        }
    }
}

/// How the organiser has marked a candidate.
///
/// The set of states belongs to the organiser's client, so any string is kept
/// as given. Only `unselected` means anything here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateState(String);

impl CandidateState {
    pub const UNSELECTED: &'static str = "unselected";

    pub fn new(state: impl Into<String>) -> Self {
        Self(state.into())
    }

    pub fn unselected() -> Self {
        Self::new(Self::UNSELECTED)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CandidateState {
    fn from(state: &str) -> Self {
        Self::new(state)
    }
}

#[cfg(test)]
mod tests {
    use rocket::serde::json::{json, serde_json};

    use super::*;

    #[test]
    fn unknown_fields_pass_through() {
        let body = json!({
            "title": "Patrol leader",
            "numberOfVoters": 3,
            "candidates": [{"name": "Ada", "voteCount": 1, "selectedState": "selected", "colour": "red"}],
        });
        let document: ElectionDocument = serde_json::from_value(body).unwrap();
        assert_eq!(document.number_of_voters, Some(3));
        assert_eq!(document.voted(), 0);
        assert_eq!(document.number_of_seats_taken, None);
        assert_eq!(document.candidates()[0].selected_state, Some("selected".into()));
        assert_eq!(document.extra["title"], json!("Patrol leader"));

        let round_tripped = serde_json::to_value(&document).unwrap();
        assert_eq!(round_tripped["title"], json!("Patrol leader"));
        assert_eq!(round_tripped["candidates"][0]["colour"], json!("red"));
        assert!(round_tripped.get("numberOfSeatsTaken").is_none());
        assert!(round_tripped.get("hasSkipped").is_none());
    }

    #[test]
    fn absent_fields_stay_absent() {
        let body = json!({ "title": "Patrol leader" });
        let document: ElectionDocument = serde_json::from_value(body.clone()).unwrap();
        assert!(document.candidates().is_empty());
        assert_eq!(serde_json::to_value(&document).unwrap(), body);
    }

    #[test]
    fn organiser_states_are_kept_verbatim() {
        let body = json!({
            "candidates": [{"name": "Ada", "selectedState": "pending"}],
        });
        let document: ElectionDocument = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(
            document.candidates()[0].selected_state.as_ref().map(CandidateState::as_str),
            Some("pending")
        );
        assert_eq!(serde_json::to_value(&document).unwrap(), body);
    }

    #[test]
    fn null_counters_are_accepted() {
        let body = json!({ "numberOfVoters": null, "numberOfVoted": null });
        let document: ElectionDocument = serde_json::from_value(body).unwrap();
        assert_eq!(document.number_of_voters, None);
        assert_eq!(document.voters(), 0);
        assert!(document.is_finished());
    }

    #[test]
    fn finished_when_everyone_voted() {
        let mut document = ElectionDocument {
            number_of_voters: Some(2),
            ..Default::default()
        };
        assert!(!document.is_finished());
        document.number_of_voted = Some(2);
        assert!(document.is_finished());
    }

    #[test]
    fn redaction_hides_tally_and_state() {
        let candidate = Candidate {
            name: Some("Ada".to_string()),
            vote_count: Some(4),
            selected_state: Some("elected".into()),
            extra: serde_json::from_value(json!({"colour": "red"})).unwrap(),
        };
        let redacted = serde_json::to_value(candidate.redacted()).unwrap();
        assert_eq!(
            redacted,
            json!({"name": "Ada", "voteCount": 0, "selectedState": "unselected"})
        );
    }
}
