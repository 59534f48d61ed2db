use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::{
    api::election::{CandidateUpdate, CreatedView, ElectionSpec, JoinView, MutationView, RetrieveView},
    common::election::{ElectionCode, ElectionKind, InvalidCode},
};
use crate::service::{ElectionService, Retrieval};
use crate::view::FieldSelection;

use super::body;

type Code = std::result::Result<ElectionCode, InvalidCode>;

pub fn routes() -> Vec<Route> {
    routes![
        create,
        join,
        vote,
        take_seat,
        skip,
        update_candidate,
        retrieve,
        delete_election,
    ]
}

#[post("/elections", data = "<spec>")]
async fn create(
    spec: std::result::Result<Json<ElectionSpec>, rocket::serde::json::Error<'_>>,
    service: &State<ElectionService>,
) -> Result<Json<CreatedView>> {
    let spec = body(spec)?;
    let created = service.create_election(spec, ElectionKind::Shared).await?;
    Ok(Json(created))
}

#[get("/elections/<code>/join")]
async fn join(code: Code, service: &State<ElectionService>) -> Result<Json<JoinView>> {
    Ok(Json(service.join(&code?).await?))
}

#[post("/elections/<code>/vote", data = "<selections>")]
async fn vote(
    code: Code,
    selections: std::result::Result<Json<Vec<usize>>, rocket::serde::json::Error<'_>>,
    service: &State<ElectionService>,
) -> Result<Json<MutationView>> {
    let code = code?;
    let selections = body(selections)?;
    Ok(Json(service.vote(&code, &selections).await?))
}

#[post("/elections/<code>/seat")]
async fn take_seat(code: Code, service: &State<ElectionService>) -> Result<Json<MutationView>> {
    Ok(Json(service.take_seat(&code?).await?))
}

#[post("/elections/<code>/skip")]
async fn skip(code: Code, service: &State<ElectionService>) -> Result<Json<MutationView>> {
    Ok(Json(service.skip(&code?).await?))
}

#[put("/elections/<code>/candidate", data = "<update>")]
async fn update_candidate(
    code: Code,
    update: std::result::Result<Json<CandidateUpdate>, rocket::serde::json::Error<'_>>,
    service: &State<ElectionService>,
) -> Result<Json<MutationView>> {
    let code = code?;
    let update = body(update)?;
    Ok(Json(service.update_candidate_state(&code, &update).await?))
}

#[get("/elections/<code>")]
async fn retrieve(
    code: Code,
    selection: FieldSelection,
    service: &State<ElectionService>,
) -> Result<Json<RetrieveView>> {
    let view = service
        .retrieve(&code?, &selection, Retrieval::Read)
        .await?;
    Ok(Json(view))
}

#[delete("/elections/<code>")]
async fn delete_election(
    code: Code,
    selection: FieldSelection,
    service: &State<ElectionService>,
) -> Result<Json<RetrieveView>> {
    Ok(Json(service.delete_election(&code?, &selection).await?))
}
