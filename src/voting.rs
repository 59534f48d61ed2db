//! Pure mutations of an election document.
//!
//! Each operation either applies completely or, on error, leaves the document untouched.

use crate::error::{Error, Result};
use crate::model::common::election::{CandidateState, ElectionDocument};

/// Record one ballot. Every index in `selections` gains a vote (repeats count
/// repeatedly), and `numberOfVoted` goes up by exactly one.
pub fn vote(document: &mut ElectionDocument, selections: &[usize]) -> Result<()> {
    let candidate_count = document.candidates().len();
    if let Some(&index) = selections.iter().find(|&&index| index >= candidate_count) {
        return Err(Error::UnknownCandidateIndex(index));
    }

    if let Some(candidates) = &mut document.candidates {
        for &index in selections {
            let candidate = &mut candidates[index];
            candidate.vote_count = Some(candidate.votes() + 1);
        }
    }
    document.number_of_voted = Some(document.voted() + 1);
    Ok(())
}

/// Count another seat as taken, starting from one.
pub fn take_seat(document: &mut ElectionDocument) {
    document.number_of_seats_taken = Some(document.number_of_seats_taken.map_or(1, |n| n + 1));
}

pub fn skip(document: &mut ElectionDocument) {
    document.has_skipped = Some(true);
}

/// Set the state of the first candidate called `name`.
pub fn update_candidate_state(
    document: &mut ElectionDocument,
    name: &str,
    state: CandidateState,
) -> Result<()> {
    let candidate = document
        .candidates
        .iter_mut()
        .flatten()
        .find(|candidate| candidate.name.as_deref() == Some(name))
        .ok_or_else(|| Error::UnknownCandidateName(name.to_string()))?;
    candidate.selected_state = Some(state);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tallies(document: &ElectionDocument) -> Vec<u32> {
        document.candidates().iter().map(|c| c.votes()).collect()
    }

    fn state_of(document: &ElectionDocument, index: usize) -> Option<&str> {
        document.candidates()[index]
            .selected_state
            .as_ref()
            .map(CandidateState::as_str)
    }

    #[test]
    fn vote_counts_each_selection_once_per_occurrence() {
        let mut document = ElectionDocument::example();
        vote(&mut document, &[0, 2, 0]).unwrap();

        assert_eq!(tallies(&document), vec![2, 0, 1]);
        assert_eq!(document.number_of_voted, Some(1));
    }

    #[test]
    fn empty_ballot_still_counts_as_voted() {
        let mut document = ElectionDocument::example();
        vote(&mut document, &[]).unwrap();
        assert_eq!(tallies(&document), vec![0, 0, 0]);
        assert_eq!(document.number_of_voted, Some(1));
    }

    #[test]
    fn missing_counters_start_from_zero() {
        let mut document = ElectionDocument::example();
        document.number_of_voted = None;
        document.candidates.as_mut().unwrap()[1].vote_count = None;

        vote(&mut document, &[1]).unwrap();
        assert_eq!(document.candidates()[1].vote_count, Some(1));
        assert_eq!(document.number_of_voted, Some(1));
    }

    #[test]
    fn document_without_candidates_takes_only_empty_ballots() {
        let mut document = ElectionDocument::default();
        let result = vote(&mut document, &[0]);
        assert!(matches!(result, Err(Error::UnknownCandidateIndex(0))));
        assert_eq!(document, ElectionDocument::default());

        vote(&mut document, &[]).unwrap();
        assert_eq!(document.candidates, None);
        assert_eq!(document.number_of_voted, Some(1));
    }

    #[test]
    fn out_of_range_vote_changes_nothing() {
        let mut document = ElectionDocument::example();
        let before = document.clone();
        let result = vote(&mut document, &[1, 3]);
        assert!(matches!(result, Err(Error::UnknownCandidateIndex(3))));
        assert_eq!(document, before);
    }

    #[test]
    fn seats_start_at_one() {
        let mut document = ElectionDocument::example();
        assert_eq!(document.number_of_seats_taken, None);
        take_seat(&mut document);
        assert_eq!(document.number_of_seats_taken, Some(1));
        take_seat(&mut document);
        assert_eq!(document.number_of_seats_taken, Some(2));
    }

    #[test]
    fn skip_is_idempotent() {
        let mut document = ElectionDocument::example();
        skip(&mut document);
        skip(&mut document);
        assert_eq!(document.has_skipped, Some(true));
    }

    #[test]
    fn candidate_state_updates_first_match() {
        let mut document = ElectionDocument::example();
        document.candidates.as_mut().unwrap()[2].name = Some("Ada".to_string());

        update_candidate_state(&mut document, "Ada", "elected".into()).unwrap();
        assert_eq!(state_of(&document, 0), Some("elected"));
        assert_eq!(state_of(&document, 2), Some(CandidateState::UNSELECTED));
    }

    #[test]
    fn any_state_the_organiser_uses_is_stored() {
        let mut document = ElectionDocument::example();
        update_candidate_state(&mut document, "Grace", "pending".into()).unwrap();
        assert_eq!(state_of(&document, 1), Some("pending"));
    }

    #[test]
    fn unknown_candidate_name_is_an_error() {
        let mut document = ElectionDocument::example();
        let before = document.clone();
        let result = update_candidate_state(&mut document, "Nobody", "selected".into());
        assert!(matches!(result, Err(Error::UnknownCandidateName(name)) if name == "Nobody"));
        assert_eq!(document, before);
    }
}
