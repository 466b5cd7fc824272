mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

fn candidate(name: &str, office: &str) -> Value {
    json!({
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
        "contactNumber": "555-0100",
        "office": office,
        "posting": "posting-1",
        "source": "Referral",
    })
}

#[tokio::test]
async fn status_defaults_to_inbox() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token().await?;
    let client = &server.client;

    let res = client
        .post(server.url("/candidates"))
        .bearer_auth(&token)
        .json(&candidate("Ada", "NY"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let id = res.json::<Value>().await?["id"].as_str().unwrap().to_string();

    let res = client.get(server.url(&format!("/candidates/{}", id))).bearer_auth(&token).send().await?;
    let stored: Value = res.json().await?;
    assert_eq!(stored["status"], "Inbox");
    assert_eq!(stored["id"], id.as_str());
    Ok(())
}

#[tokio::test]
async fn reports_first_missing_field() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token().await?;

    let cases = [
        (json!({}), "Name"),
        (json!({ "name": "Ada" }), "Email"),
        (json!({ "name": "Ada", "email": "a@example.com", "contactNumber": "" }), "Contact Number"),
    ];
    for (body, label) in cases {
        let res = server
            .client
            .post(server.url("/candidates"))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            res.json::<Value>().await?["message"],
            format!("Input is invalid. {} cannot be empty", label)
        );
    }
    Ok(())
}

#[tokio::test]
async fn filters_by_status_and_office() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token().await?;
    let client = &server.client;

    let mut hired = candidate("Grace", "NY");
    hired["status"] = json!("Hired");
    for body in [candidate("Ada", "NY"), candidate("Linus", "SF"), hired, candidate("Alan", "NY")] {
        client.post(server.url("/candidates")).bearer_auth(&token).json(&body).send().await?;
    }

    let res = client
        .get(server.url("/candidates?status=Inbox&office=NY"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let list: Vec<Value> = res.json().await?;
    let names: Vec<&str> = list.iter().filter_map(|c| c["name"].as_str()).collect();
    assert_eq!(names, ["Ada", "Alan"]);

    // Blank optional filters are ignored
    let res = client
        .get(server.url("/candidates?status=Inbox&posting="))
        .bearer_auth(&token)
        .send()
        .await?;
    let list: Vec<Value> = res.json().await?;
    assert_eq!(list.len(), 3);
    Ok(())
}

#[tokio::test]
async fn listing_requires_status() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token().await?;

    for path in ["/candidates", "/candidates?status=", "/candidates?office=NY"] {
        let res = server.client.get(server.url(path)).bearer_auth(&token).send().await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}", path);
        assert_eq!(
            res.json::<Value>().await?["message"],
            "Input is invalid. Status cannot be empty"
        );
    }
    Ok(())
}

#[tokio::test]
async fn update_and_delete() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token().await?;
    let client = &server.client;

    let res = client
        .post(server.url("/candidates"))
        .bearer_auth(&token)
        .json(&candidate("Ada", "NY"))
        .send()
        .await?;
    let id = res.json::<Value>().await?["id"].as_str().unwrap().to_string();

    let mut moved = candidate("Ada", "SF");
    moved["status"] = json!("Interview");
    let res = client
        .put(server.url(&format!("/candidates/{}", id)))
        .bearer_auth(&token)
        .json(&moved)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(server.url("/candidates?status=Interview"))
        .bearer_auth(&token)
        .send()
        .await?;
    let list: Vec<Value> = res.json().await?;
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["office"], "SF");

    let res = client.delete(server.url(&format!("/candidates/{}", id))).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Deleting again still acknowledges
    let res = client.delete(server.url(&format!("/candidates/{}", id))).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.json::<Value>().await?["writeTime"].is_string());
    Ok(())
}
