// Copyright 2024-2026 Sitt Guruvanich
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Integration tests for the host application router.

use std::fs;
use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use rizzler::{AssetMode, Manifest, RizzleTemplates, RizzlerConfig};
use rizzler_cli::server::create_app;
use tempfile::tempdir;

const INDEX: &str = r#"<!DOCTYPE html>
<html>
  <head><title>{{ title }}</title></head>
  <body>
    <div id="app"></div>
    {{ vite_hmr_client() | safe }}
    {{ vite_asset(path="pages/main.js") | safe }}
  </body>
</html>
"#;

fn config_in(root: &std::path::Path) -> RizzlerConfig {
    let mut config = RizzlerConfig::default();
    config.dev.public_dir = root.join("public").to_string_lossy().into_owned();
    config.build.dist_dir = root.join("dist").to_string_lossy().into_owned();
    config.dev.title = "Rizz Test".to_string();
    config
}

#[tokio::test]
async fn test_index_in_dev_mode() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("public")).unwrap();
    fs::write(dir.path().join("public/vite.svg"), "<svg></svg>").unwrap();
    let config = config_in(dir.path());

    let mode = AssetMode::Dev {
        vite_url: config.dev.vite_url.clone(),
    };
    let templates = RizzleTemplates::from_raw([("index.html", INDEX)], mode).unwrap();
    let (app, _state) = create_app(templates, &config);
    let server = TestServer::new(app).unwrap();

    let response = server.get("/").await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("<title>Rizz Test</title>"));
    assert!(html.contains(r#"<script type="module" src="http://localhost:5173/@vite/client"></script>"#));
    assert!(html.contains(
        r#"<script async defer type="module" src="http://localhost:5173/pages/main.js"></script>"#
    ));

    let response = server.get("/public/vite.svg").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "<svg></svg>");
}

#[tokio::test]
async fn test_index_in_production_mode() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("dist/assets")).unwrap();
    fs::write(dir.path().join("dist/assets/main-a1.js"), "export {}").unwrap();
    let config = config_in(dir.path());

    let manifest = Manifest::parse(
        r#"{"pages/main.js": {"file": "assets/main-a1.js", "isEntry": true, "css": ["assets/main-b2.css"]}}"#,
    )
    .unwrap();
    let mode = AssetMode::Production {
        manifest: Arc::new(manifest),
        base: config.build.assets_base.clone(),
    };
    let templates = RizzleTemplates::from_raw([("index.html", INDEX)], mode).unwrap();
    let (app, _state) = create_app(templates, &config);
    let server = TestServer::new(app).unwrap();

    let html = server.get("/").await.text();
    assert!(!html.contains("@vite/client"));
    assert!(html.contains(r#"<link rel="stylesheet" href="/dist/assets/main-b2.css" />"#));
    assert!(html.contains(r#"<script type="module" src="/dist/assets/main-a1.js"></script>"#));

    let response = server.get("/dist/assets/main-a1.js").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "export {}");
}

#[tokio::test]
async fn test_render_error_is_a_500() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    let mode = AssetMode::Production {
        manifest: Arc::new(Manifest::default()),
        base: "/dist".to_string(),
    };
    let templates = RizzleTemplates::from_raw([("index.html", INDEX)], mode).unwrap();
    let (app, _state) = create_app(templates, &config);
    let server = TestServer::new(app).unwrap();

    let response = server.get("/").expect_failure().await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_templates_reload_through_state() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("templates")).unwrap();
    fs::write(dir.path().join("templates/index.html"), "<p>{{ title }} v1</p>").unwrap();
    let config = config_in(dir.path());

    let mode = AssetMode::Dev {
        vite_url: config.dev.vite_url.clone(),
    };
    let templates = RizzleTemplates::new(dir.path().join("templates"), mode).unwrap();
    let (app, state) = create_app(templates, &config);
    let server = TestServer::new(app).unwrap();

    assert_eq!(server.get("/").await.text(), "<p>Rizz Test v1</p>");

    fs::write(dir.path().join("templates/index.html"), "<p>{{ title }} v2</p>").unwrap();
    state.templates.write().await.reload().unwrap();

    assert_eq!(server.get("/").await.text(), "<p>Rizz Test v2</p>");
}
