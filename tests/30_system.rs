mod common;

use anyhow::Result;
use common::*;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn root_describes_service() -> Result<()> {
    let server = spawn_server().await?;

    let res = server.client.get(server.url("/")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["name"], "catalog-api");
    assert!(body["endpoints"]["users"].is_string());
    Ok(())
}

#[tokio::test]
async fn health_reports_storage() -> Result<()> {
    let server = spawn_server().await?;

    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
    Ok(())
}

#[tokio::test]
async fn body_without_json_content_type_is_unsupported() -> Result<()> {
    let server = spawn_server().await?;

    let res = server
        .client
        .post(server.url("/api/users"))
        .body(r#"{"name":"x","email":"y"}"#)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(server.user_count().await?, 0);
    Ok(())
}
