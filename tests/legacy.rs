mod common;

use axum::http::{Method, StatusCode};
use common::{png, spawn};
use sea_orm::{ConnectionTrait, Statement};
use serde_json::json;

#[tokio::test]
async fn create_then_patch_flat_page() {
    let app = spawn().await;
    let (status, page) = app
        .json(
            Method::POST,
            "/api/pages",
            json!({
                "slug": "mot-du-president",
                "title_fr": "Mot du président",
                "content_fr": "<p>Bienvenue</p>",
                "extra": {"map_url": "<iframe src=\"https://maps.example/e\"></iframe>", "hero": true}
            }),
            true,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(page["extra"]["map_url"], "https://maps.example/e");
    assert_eq!(page["extra"]["hero"], true);
    assert_eq!(page["blocks"], json!([]));

    let (status, page) = app
        .json(
            Method::PUT,
            "/api/pages/mot-du-president",
            json!({"content_ar": "مرحبا", "title_fr": null}),
            true,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["content_fr"], "<p>Bienvenue</p>");
    assert_eq!(page["content_ar"], "مرحبا");
    assert_eq!(page["title_fr"], serde_json::Value::Null);
}

#[tokio::test]
async fn duplicate_slug_is_rejected() {
    let app = spawn().await;
    let body = json!({"slug": "contact", "title_fr": "Contact"});
    let (status, _) = app.json(Method::POST, "/api/pages", body.clone(), true).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.json(Method::POST, "/api/pages", body, true).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["slug"].is_array());
}

#[tokio::test]
async fn patching_missing_page_is_not_found() {
    let app = spawn().await;
    let (status, _) = app
        .json(Method::PUT, "/api/pages/absent", json!({"title_fr": "x"}), true)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn gallery_indices_shift_after_removal() {
    let app = spawn().await;
    app.json(
        Method::POST,
        "/api/pages",
        json!({"slug": "patrimoine", "extra": {"gallery": ["pages/a.png", "pages/b.png", "pages/c.png"]}}),
        true,
    )
    .await;

    let (status, gallery) = app.delete("/api/pages/patrimoine/gallery/1", true).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(gallery["gallery"], json!(["pages/a.png", "pages/c.png"]));
    assert_eq!(
        gallery["gallery_urls"][1],
        "http://localhost:8000/storage/pages/c.png"
    );

    let (status, body) = app.delete("/api/pages/patrimoine/gallery/5", true).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "not_found");

    let (_, page) = app.get("/api/pages/patrimoine").await;
    assert_eq!(page["extra"]["gallery"], json!(["pages/a.png", "pages/c.png"]));
}

#[tokio::test]
async fn gallery_upload_appends_and_stores() {
    let app = spawn().await;
    app.json(Method::POST, "/api/pages", json!({"slug": "galerie"}), true)
        .await;

    let (status, gallery) = app
        .multipart("/api/pages/galerie/gallery", &[png("file", "lac.png")], true)
        .await;
    assert_eq!(status, StatusCode::OK);

    let path = gallery["gallery"][0].as_str().unwrap();
    assert!(path.starts_with("pages/"));
    assert!(app.storage().join(path).exists());

    let (_, page) = app.get("/api/pages/galerie").await;
    assert_eq!(page["gallery_urls"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn gallery_upload_needs_an_existing_page() {
    let app = spawn().await;
    let (status, _) = app
        .multipart("/api/pages/absent/gallery", &[png("file", "lac.png")], true)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!app.storage().exists());
}

#[tokio::test]
async fn non_admin_cannot_touch_flat_pages() {
    let app = spawn().await;
    app.json(
        Method::POST,
        "/api/pages",
        json!({"slug": "patrimoine", "title_fr": "Patrimoine", "extra": {"gallery": ["pages/a.png"]}}),
        true,
    )
    .await;

    let (status, _) = app
        .json(Method::POST, "/api/pages", json!({"slug": "autre"}), false)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .json(Method::PUT, "/api/pages/patrimoine", json!({"title_fr": "x"}), false)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .multipart("/api/pages/patrimoine/gallery", &[png("file", "b.png")], false)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.delete("/api/pages/patrimoine/gallery/0", false).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, page) = app.get("/api/pages/patrimoine").await;
    assert_eq!(page["title_fr"], "Patrimoine");
    assert_eq!(page["extra"]["gallery"], json!(["pages/a.png"]));
    let (status, _) = app.get("/api/pages/autre").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_extra_is_rejected_not_emptied() {
    let app = spawn().await;
    let (status, body) = app
        .json(
            Method::POST,
            "/api/pages",
            json!({"slug": "p", "extra": {"gallery": "nope", "map_url": "https://maps.example/e", "hero": true}}),
            true,
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["extra.gallery"].is_array());
    let (status, _) = app.get("/api/pages/p").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.json(Method::POST, "/api/pages", json!({"slug": "p"}), true)
        .await;
    let (status, _) = app
        .json(Method::PUT, "/api/pages/p", json!({"extra": {"gallery": 7}}), true)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn gallery_change_keeps_other_keys_of_a_bad_stored_extra() {
    let app = spawn().await;
    app.json(Method::POST, "/api/pages", json!({"slug": "ancienne"}), true)
        .await;

    let db = &app.state.database;
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"UPDATE pages SET extra = '{"gallery":"nope","map_url":"https://maps.example/e","hero":true}' WHERE slug = 'ancienne'"#
            .to_string(),
    ))
    .await
    .unwrap();

    let (status, gallery) = app
        .multipart("/api/pages/ancienne/gallery", &[png("file", "lac.png")], true)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(gallery["gallery"].as_array().unwrap().len(), 1);

    let (_, page) = app.get("/api/pages/ancienne").await;
    assert_eq!(page["extra"]["map_url"], "https://maps.example/e");
    assert_eq!(page["extra"]["hero"], true);
    assert_eq!(page["extra"]["gallery"].as_array().unwrap().len(), 1);
}
