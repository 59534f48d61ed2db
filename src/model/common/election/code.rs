use std::fmt::{Display, Formatter};
use std::str::FromStr;

use mongodb::bson::Bson;
use rand::Rng;
use rocket::request::FromParam;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Symbols an election code may contain. `0` and `O` are left out so codes
/// can be read aloud and copied from a projector without ambiguity.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNPQRSTUVWXYZ123456789";

/// Every election code has exactly this many symbols.
pub const CODE_LENGTH: usize = 6;

/// The short code participants type in to join an election.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElectionCode(String);

impl ElectionCode {
    /// Sample a uniformly random code. Says nothing about whether it is in use.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..CODE_LENGTH)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ElectionCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a well-formed election code")]
pub struct InvalidCode(pub String);

impl FromStr for ElectionCode {
    type Err = InvalidCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let well_formed =
            s.len() == CODE_LENGTH && s.bytes().all(|b| CODE_ALPHABET.contains(&b));
        if well_formed {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidCode(s.to_string()))
        }
    }
}

impl<'a> FromParam<'a> for ElectionCode {
    type Error = InvalidCode;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse()
    }
}

impl From<&ElectionCode> for Bson {
    fn from(code: &ElectionCode) -> Self {
        Bson::String(code.0.clone())
    }
}
