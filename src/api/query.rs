use rocket::request::{FromRequest, Outcome, Request};

use crate::view::{FieldSelection, Viewer};

/// Bare query keys, in request order. Values are ignored.
fn query_keys(req: &Request<'_>) -> Vec<String> {
    match req.uri().query() {
        Some(query) => query
            .segments()
            .map(|(key, _)| key)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for FieldSelection {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(FieldSelection::from_keys(query_keys(req)))
    }
}

/// Anyone passing `?admin` is treated as the organiser.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for Viewer {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let viewer = if query_keys(req).iter().any(|key| key == "admin") {
            Viewer::Admin
        } else {
            Viewer::Participant
        };
        Outcome::Success(viewer)
    }
}
