use mongodb::{bson::ser::Error as BsonError, error::Error as DbError};
use rocket::{
    http::{Status, StatusClass},
    response::{self, Responder},
    serde::json::serde_json::Error as JsonError,
    Request,
};
use thiserror::Error;

use crate::model::common::election::{ElectionCode, InvalidCode};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Bson(#[from] BsonError),
    #[error(transparent)]
    Json(#[from] JsonError),
    #[error("Bad request: {0}")]
    Validation(String),
    #[error("No election with code {0} found!")]
    NotFound(String),
    #[error("No candidate at position {0}")]
    UnknownCandidateIndex(usize),
    #[error("No candidate named '{0}'")]
    UnknownCandidateName(String),
    #[error("Election code {0} is already in use")]
    DuplicateCode(ElectionCode),
    #[error("No unused election code found after {0} attempts")]
    CodeSpaceExhausted(u32),
    #[error("Election {0} is being modified too often, try again")]
    Contended(ElectionCode),
    #[error("Photo storage is being modified too often, try again")]
    PhotoContended,
    #[error("Counter '{0}' does not exist")]
    MissingCounter(String),
}

/// A malformed code can't name any election.
impl From<InvalidCode> for Error {
    fn from(err: InvalidCode) -> Self {
        Self::NotFound(err.0)
    }
}

impl Error {
    pub fn not_found(code: impl ToString) -> Self {
        Self::NotFound(code.to_string())
    }

    pub fn validation(msg: impl ToString) -> Self {
        Self::Validation(msg.to_string())
    }

    /// The HTTP status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::Validation(_) => Status::BadRequest,
            Self::NotFound(_) => Status::NotFound,
            Self::UnknownCandidateIndex(_) | Self::UnknownCandidateName(_) => {
                Status::UnprocessableEntity
            }
            Self::Contended(_) | Self::PhotoContended => Status::Conflict,
            Self::CodeSpaceExhausted(_) => Status::ServiceUnavailable,
            Self::Db(_)
            | Self::Bson(_)
            | Self::Json(_)
            | Self::DuplicateCode(_)
            | Self::MissingCounter(_) => Status::InternalServerError,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        if status.class() == StatusClass::ServerError {
            error!("{self}");
        } else {
            debug!("{self}");
        }
        (status, self.to_string()).respond_to(req)
    }
}
