mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn postings_crud() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token().await?;
    let client = &server.client;

    // Empty collection lists as []
    let res = client.get(server.url("/postings")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!([]));

    let res = client
        .post(server.url("/postings"))
        .bearer_auth(&token)
        .json(&json!({ "jobTitle": "Backend Engineer", "office": "NY" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let id = res.json::<Value>().await?["id"].as_str().unwrap().to_string();

    let res = client.get(server.url(&format!("/postings/{}", id))).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let posting: Value = res.json().await?;
    assert_eq!(posting["id"], id.as_str());
    assert_eq!(posting["jobTitle"], "Backend Engineer");
    assert!(posting["createdAt"].as_str().unwrap().ends_with('Z'));

    // Updates merge and never touch createdAt
    let res = client
        .put(server.url(&format!("/postings/{}", id)))
        .bearer_auth(&token)
        .json(&json!({ "jobTitle": "Staff Engineer", "createdAt": "1970-01-01T00:00:00.000Z" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.json::<Value>().await?["writeTime"].is_string());

    let res = client.get(server.url(&format!("/postings/{}", id))).bearer_auth(&token).send().await?;
    let updated: Value = res.json().await?;
    assert_eq!(updated["jobTitle"], "Staff Engineer");
    assert_eq!(updated["office"], "NY");
    assert_eq!(updated["createdAt"], posting["createdAt"]);

    let res = client.delete(server.url(&format!("/postings/{}", id))).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(server.url(&format!("/postings/{}", id))).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["message"], "No such posting document.");
    Ok(())
}

#[tokio::test]
async fn posting_requires_job_title() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token().await?;

    for body in [json!({}), json!({ "jobTitle": "" }), json!({ "jobTitle": 42 })] {
        let res = server
            .client
            .post(server.url("/postings"))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            res.json::<Value>().await?["message"],
            "Input is invalid. Job Title cannot be empty"
        );
    }
    Ok(())
}

#[tokio::test]
async fn listing_is_oldest_first() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token().await?;

    for title in ["first", "second", "third"] {
        server
            .client
            .post(server.url("/postings"))
            .bearer_auth(&token)
            .json(&json!({ "jobTitle": title }))
            .send()
            .await?;
    }

    let res = server.client.get(server.url("/postings")).bearer_auth(&token).send().await?;
    let list: Vec<Value> = res.json().await?;
    let titles: Vec<&str> = list.iter().filter_map(|p| p["jobTitle"].as_str()).collect();
    assert_eq!(titles, ["first", "second", "third"]);
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token().await?;

    let res = server
        .client
        .post(server.url("/postings"))
        .bearer_auth(&token)
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert!(body["message"].as_str().unwrap().starts_with("Invalid JSON body."));
    Ok(())
}
