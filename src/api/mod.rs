use rocket::{serde::json::Json, Route};

use crate::error::{Error, Result};

mod query;
mod shared;
mod virtual_election;

pub fn routes() -> Vec<Route> {
    let mut routes = routes![home];
    routes.extend(shared::routes());
    routes.extend(virtual_election::routes());
    routes
}

#[get("/")]
fn home() -> &'static str {
    "This is the Scouts Elections API!"
}

/// Unwrap a JSON body, reporting a missing or malformed one as a bad request.
fn body<T>(data: std::result::Result<Json<T>, rocket::serde::json::Error<'_>>) -> Result<T> {
    use rocket::serde::json::Error as JsonError;

    match data {
        Ok(Json(value)) => Ok(value),
        Err(JsonError::Parse(raw, _)) if raw.trim().is_empty() => {
            Err(Error::validation("No data given!"))
        }
        Err(JsonError::Parse(_, e)) => Err(Error::validation(e)),
        Err(JsonError::Io(e)) => Err(Error::validation(e)),
    }
}
