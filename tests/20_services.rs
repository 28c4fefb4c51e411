mod common;

use anyhow::Result;
use car_genius::database::Collection;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn list_services_returns_every_document() -> Result<()> {
    let server = common::spawn_server().await?;
    server
        .seed(Collection::Services, json!({ "title": "Oil change", "price": "20.00", "service_id": "01" }))
        .await?;
    server
        .seed(Collection::Services, json!({ "title": "Brake repair", "price": "80.00", "service_id": "02" }))
        .await?;

    let res = server.client.get(server.url("/services")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    let services = body.as_array().expect("array body");
    assert_eq!(services.len(), 2);
    assert!(services.iter().all(|s| s.get("_id").is_some()));
    Ok(())
}

#[tokio::test]
async fn get_service_projects_card_fields() -> Result<()> {
    let server = common::spawn_server().await?;
    let id = server
        .seed(
            Collection::Services,
            json!({
                "title": "Engine diagnostics",
                "price": "55.00",
                "service_id": "03",
                "img": "https://img.example/engine.png",
                "description": "Full engine check",
                "facility": [{ "name": "Instant service" }]
            }),
        )
        .await?;

    let res = server.client.get(server.url(&format!("/services/{}", id))).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(
        body,
        json!({
            "_id": id,
            "title": "Engine diagnostics",
            "price": "55.00",
            "service_id": "03",
            "img": "https://img.example/engine.png"
        })
    );
    Ok(())
}

#[tokio::test]
async fn unknown_service_is_empty_not_404() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .get(server.url(&format!("/services/{}", uuid_like())))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, Value::Null);
    Ok(())
}

#[tokio::test]
async fn malformed_service_id_is_bad_request() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(server.url("/services/not-an-id")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["code"], "BAD_REQUEST");
    Ok(())
}

fn uuid_like() -> &'static str {
    "7f1c2a9e-3b4d-4c5e-8f60-718293a4b5c6"
}
