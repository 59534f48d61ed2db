//! Shaping of outbound payloads by role and election progress.

use rocket::serde::json::{serde_json, serde_json::Map, Value};

use crate::error::Result;
use crate::model::{
    api::election::{
        ElectionData, JoinView, RetrieveView, VirtualJoinView, VirtualRetrieveView,
    },
    common::election::{Candidate, ElectionDocument, PHOTO_KEY},
    db::{election::Election, photo::Photo},
};

/// Who is looking at a virtual election.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Viewer {
    /// Sees real tallies and selections, even after voting has finished.
    Admin,
    /// Sees a zeroed tally while voting is open, and nothing afterwards.
    Participant,
}

/// Fields requested by a retrieval.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSelection {
    /// Document fields wanted, in request order.
    pub fields: Vec<String>,
    /// Whether the photo should be merged in.
    pub wants_photo: bool,
}

impl FieldSelection {
    /// Build a selection from request keys. The photo key toggles
    /// `wants_photo` rather than naming a document field.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self::default();
        for key in keys {
            let key = key.into();
            if key == PHOTO_KEY {
                selection.wants_photo = true;
            } else if !selection.fields.contains(&key) {
                selection.fields.push(key);
            }
        }
        selection
    }
}

fn photo_content(photo: Option<Photo>) -> Option<String> {
    photo.map(|photo| photo.content)
}

/// Everyone sees everything in a shared election.
pub fn shared_join(election: Election, photo: Option<Photo>) -> JoinView {
    JoinView {
        code: election.code,
        data: ElectionData {
            document: election.document,
            group_image: photo_content(photo),
        },
    }
}

/// Participants get a zeroed tally until voting finishes, then nothing.
/// Admins always get the real document.
pub fn virtual_join(election: Election, photo: Option<Photo>, viewer: Viewer) -> VirtualJoinView {
    let is_election_finished = election.document.is_finished();
    let data = match viewer {
        Viewer::Participant if is_election_finished => None,
        Viewer::Participant => Some(redact(election.document)),
        Viewer::Admin => Some(election.document),
    };
    VirtualJoinView {
        code: election.code,
        is_election_finished,
        data: data.map(|document| ElectionData {
            document,
            group_image: photo_content(photo),
        }),
    }
}

/// Hide tallies and selections from participants.
fn redact(mut document: ElectionDocument) -> ElectionDocument {
    document.candidates = document
        .candidates
        .map(|candidates| candidates.iter().map(Candidate::redacted).collect());
    document
}

/// Mirror JavaScript truthiness, which is what clients filter on.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Keep the requested fields whose values are truthy, plus the photo if asked for.
///
/// If nothing survives, the whole document is returned instead.
pub fn project(
    document: &ElectionDocument,
    selection: &FieldSelection,
    photo: Option<&Photo>,
) -> Result<Map<String, Value>> {
    let full = match serde_json::to_value(document)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let mut projected = Map::new();
    for field in &selection.fields {
        if let Some(value) = full.get(field).filter(|value| is_truthy(value)) {
            projected.insert(field.clone(), value.clone());
        }
    }
    if selection.wants_photo {
        let content = photo.map_or(Value::Null, |photo| Value::String(photo.content.clone()));
        projected.insert(PHOTO_KEY.to_string(), content);
    }

    if projected.is_empty() {
        Ok(full)
    } else {
        Ok(projected)
    }
}

pub fn retrieve(
    election: &Election,
    selection: &FieldSelection,
    photo: Option<&Photo>,
) -> Result<RetrieveView> {
    Ok(RetrieveView {
        code: election.code.clone(),
        data: project(&election.document, selection, photo)?,
    })
}

pub fn retrieve_virtual(
    election: &Election,
    selection: &FieldSelection,
    photo: Option<&Photo>,
) -> Result<VirtualRetrieveView> {
    Ok(VirtualRetrieveView {
        code: election.code.clone(),
        data: project(&election.document, selection, photo)?,
        voter_count: election.voter_count,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rocket::serde::json::json;

    use crate::model::common::{election::CandidateState, photo::PhotoId};

    use super::*;

    fn voted_election() -> Election {
        let mut election = Election::example_aged("K7QX2M", Duration::zero(), Some(PhotoId(1)));
        let candidates = election.document.candidates.as_mut().unwrap();
        candidates[0].vote_count = Some(2);
        candidates[0].selected_state = Some("selected".into());
        candidates[1].vote_count = Some(1);
        election.document.number_of_voted = Some(1);
        election
    }

    fn photo() -> Photo {
        Photo {
            id: PhotoId(1),
            content: "data:image/png;base64,AAAA".to_string(),
            references: 1,
        }
    }

    #[test]
    fn shared_join_merges_photo() {
        let view = shared_join(voted_election(), Some(photo()));
        assert_eq!(view.data.group_image.as_deref(), Some("data:image/png;base64,AAAA"));
        assert_eq!(view.data.document.candidates()[0].votes(), 2);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["data"]["groupImage"], json!("data:image/png;base64,AAAA"));
        assert_eq!(json["code"], json!("K7QX2M"));
    }

    #[test]
    fn join_without_photo_leaves_key_out() {
        let json = serde_json::to_value(shared_join(voted_election(), None)).unwrap();
        assert!(json["data"].get("groupImage").is_none());

        let view = virtual_join(voted_election(), None, Viewer::Participant);
        let json = serde_json::to_value(view).unwrap();
        assert!(json["data"].get("groupImage").is_none());
    }

    #[test]
    fn participants_see_zeroed_tallies() {
        let view = virtual_join(voted_election(), None, Viewer::Participant);
        assert!(!view.is_election_finished);
        let data = view.data.unwrap();
        for candidate in data.document.candidates() {
            assert_eq!(candidate.vote_count, Some(0));
            assert_eq!(candidate.selected_state, Some(CandidateState::unselected()));
        }
        assert_eq!(data.document.candidates()[0].name.as_deref(), Some("Ada"));
    }

    #[test]
    fn admins_see_real_tallies() {
        let view = virtual_join(voted_election(), None, Viewer::Admin);
        assert_eq!(view.data.unwrap().document, voted_election().document);
    }

    #[test]
    fn finished_election_is_withheld_from_participants() {
        let mut election = voted_election();
        election.document.number_of_voted = election.document.number_of_voters;
        assert!(election.document.is_finished());

        let participant = virtual_join(election.clone(), None, Viewer::Participant);
        assert!(participant.is_election_finished);
        assert_eq!(participant.data, None);
        let json = serde_json::to_value(&participant).unwrap();
        assert!(json.get("data").is_none());
        assert_eq!(json["isElectionFinished"], json!(true));

        let admin = virtual_join(election.clone(), None, Viewer::Admin);
        assert!(admin.is_election_finished);
        assert_eq!(admin.data.unwrap().document, election.document);
    }

    #[test]
    fn projection_keeps_requested_truthy_fields() {
        let mut document = voted_election().document;
        document.extra.insert("title".to_string(), json!("Patrol leader"));
        document.extra.insert("notes".to_string(), json!(""));

        let selection = FieldSelection::from_keys(["title", "notes", "numberOfVoted"]);
        let projected = project(&document, &selection, None).unwrap();
        assert_eq!(projected.len(), 2);
        assert_eq!(projected["title"], json!("Patrol leader"));
        assert_eq!(projected["numberOfVoted"], json!(1));
    }

    #[test]
    fn projection_falls_back_to_whole_document() {
        let document = voted_election().document;
        let everything = serde_json::to_value(&document).unwrap();

        let unknown = FieldSelection::from_keys(["nope", "numberOfSeatsTaken"]);
        assert_eq!(Value::Object(project(&document, &unknown, None).unwrap()), everything);

        let none = FieldSelection::default();
        assert_eq!(Value::Object(project(&document, &none, None).unwrap()), everything);
    }

    #[test]
    fn requested_photo_is_always_merged() {
        let document = voted_election().document;
        let selection = FieldSelection::from_keys(["groupImage"]);
        assert!(selection.wants_photo);
        assert!(selection.fields.is_empty());

        let with_photo = project(&document, &selection, Some(&photo())).unwrap();
        assert_eq!(with_photo.len(), 1);
        assert_eq!(with_photo["groupImage"], json!("data:image/png;base64,AAAA"));

        let without_photo = project(&document, &selection, None).unwrap();
        assert_eq!(without_photo.len(), 1);
        assert_eq!(without_photo["groupImage"], Value::Null);
    }

    #[test]
    fn participants_of_election_without_candidates_get_no_list() {
        let mut election = voted_election();
        election.document.candidates = None;
        let view = virtual_join(election, None, Viewer::Participant);
        let json = serde_json::to_value(view).unwrap();
        assert!(json["data"].get("candidates").is_none());
    }

    #[test]
    fn virtual_retrieval_reports_voter_count() {
        let mut election = voted_election();
        election.voter_count = 7;
        let view = retrieve_virtual(&election, &FieldSelection::default(), None).unwrap();
        assert_eq!(view.voter_count, 7);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["voterCount"], json!(7));
    }
}
