mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn root_describes_service() -> Result<()> {
    let server = common::start_server().await?;

    let body = reqwest::get(format!("{}/", server.base_url))
        .await?
        .json::<serde_json::Value>()
        .await?;

    assert_eq!(body["success"], true);
    assert!(body["data"]["endpoints"].is_object());
    Ok(())
}

#[tokio::test]
async fn each_test_runs_an_isolated_server() -> Result<()> {
    let first = common::start_server().await?;
    let second = common::start_server().await?;
    assert_ne!(first.base_url, second.base_url);

    // Separate stores: the same email registers on both.
    let body = serde_json::json!({ "email": "same@example.com", "password": "pw", "role": "buyer" });
    for server in [&first, &second] {
        let res = reqwest::Client::new()
            .post(format!("{}/api/signup", server.base_url))
            .json(&body)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
    }
    Ok(())
}
