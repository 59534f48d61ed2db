mod code;
mod document;
mod kind;

pub use code::{ElectionCode, InvalidCode, CODE_ALPHABET, CODE_LENGTH};
pub use document::{Candidate, CandidateState, ElectionDocument};
pub use kind::ElectionKind;

/// Key under which the election photo travels in request and response bodies.
/// It is never part of the stored document.
pub const PHOTO_KEY: &str = "groupImage";
