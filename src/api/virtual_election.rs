use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::{
    api::election::{CreatedView, ElectionSpec, VirtualJoinView, VirtualRetrieveView},
    common::election::{ElectionCode, ElectionKind, InvalidCode},
};
use crate::service::ElectionService;
use crate::view::{FieldSelection, Viewer};

use super::body;

type Code = std::result::Result<ElectionCode, InvalidCode>;

pub fn routes() -> Vec<Route> {
    routes![create, join, vote, retrieve]
}

#[post("/virtual/elections", data = "<spec>")]
async fn create(
    spec: std::result::Result<Json<ElectionSpec>, rocket::serde::json::Error<'_>>,
    service: &State<ElectionService>,
) -> Result<Json<CreatedView>> {
    let spec = body(spec)?;
    let created = service.create_election(spec, ElectionKind::Virtual).await?;
    Ok(Json(created))
}

#[get("/virtual/elections/<code>/join")]
async fn join(
    code: Code,
    viewer: Viewer,
    service: &State<ElectionService>,
) -> Result<Json<VirtualJoinView>> {
    Ok(Json(service.join_virtual(&code?, viewer).await?))
}

#[post("/virtual/elections/<code>/vote", data = "<selections>")]
async fn vote(
    code: Code,
    selections: std::result::Result<Json<Vec<usize>>, rocket::serde::json::Error<'_>>,
    service: &State<ElectionService>,
) -> Result<&'static str> {
    let code = code?;
    let selections = body(selections)?;
    service.vote_virtual(&code, &selections).await?;
    Ok("Successfully sent votes!")
}

#[get("/virtual/elections/<code>")]
async fn retrieve(
    code: Code,
    selection: FieldSelection,
    service: &State<ElectionService>,
) -> Result<Json<VirtualRetrieveView>> {
    Ok(Json(service.retrieve_virtual(&code?, &selection).await?))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::{json, Value},
    };

    use super::*;

    async fn create_example(client: &Client) -> String {
        let response = client
            .post("/virtual/elections")
            .header(ContentType::JSON)
            .body(json!(ElectionSpec::example()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let created: Value = response.into_json().await.unwrap();
        created["code"].as_str().unwrap().to_string()
    }

    async fn cast(client: &Client, code: &str, selections: Value) {
        let response = client
            .post(format!("/virtual/elections/{code}/vote"))
            .header(ContentType::JSON)
            .body(selections.to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        assert_eq!(
            Some("Successfully sent votes!".to_string()),
            response.into_string().await
        );
    }

    async fn join_as(client: &Client, code: &str, query: &str) -> Value {
        let response = client
            .get(format!("/virtual/elections/{code}/join{query}"))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        response.into_json().await.unwrap()
    }

    /// Three voters, two ballots for Ada and one for Barbara.
    #[backend_test]
    async fn virtual_election_from_open_to_finished(client: Client) {
        let code = create_example(&client).await;

        cast(&client, &code, json!([0])).await;
        let participant = join_as(&client, &code, "").await;
        assert_eq!(participant["isElectionFinished"], json!(false));
        for candidate in participant["data"]["candidates"].as_array().unwrap() {
            assert_eq!(candidate["voteCount"], json!(0));
            assert_eq!(candidate["selectedState"], json!("unselected"));
        }
        assert!(participant["data"].get("groupImage").is_none());

        cast(&client, &code, json!([0])).await;
        cast(&client, &code, json!([2])).await;

        let participant = join_as(&client, &code, "").await;
        assert_eq!(
            participant,
            json!({"code": code, "isElectionFinished": true})
        );

        let admin = join_as(&client, &code, "?admin").await;
        assert_eq!(admin["isElectionFinished"], json!(true));
        let tallies: Vec<_> = admin["data"]["candidates"]
            .as_array()
            .unwrap()
            .iter()
            .map(|candidate| candidate["voteCount"].clone())
            .collect();
        assert_eq!(tallies, vec![json!(2), json!(0), json!(1)]);

        let response = client
            .get(format!("/virtual/elections/{code}?numberOfVoted"))
            .dispatch()
            .await;
        let retrieved: Value = response.into_json().await.unwrap();
        assert_eq!(
            retrieved,
            json!({"code": code, "data": {"numberOfVoted": 3}, "voterCount": 3})
        );
    }

    #[backend_test]
    async fn unknown_virtual_election(client: Client) {
        let response = client.get("/virtual/elections/ZZZZZZ/join").dispatch().await;
        assert_eq!(Status::NotFound, response.status());

        let response = client
            .post("/virtual/elections/ZZZZZZ/vote")
            .header(ContentType::JSON)
            .body("[0]")
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
        assert_eq!(
            Some("No election with code ZZZZZZ found!".to_string()),
            response.into_string().await
        );
    }
}
