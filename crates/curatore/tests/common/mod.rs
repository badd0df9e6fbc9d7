#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(dead_code)]
//! Common test utilities for integration tests.
//!
//! Composes the real router over in-memory components; requests are driven
//! through `tower::ServiceExt::oneshot` with no network involved.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use axum::response::Response;
use http_body_util::BodyExt;
use tower::ServiceExt;
use tower_sessions::cookie::SameSite;

use curatore::access::StaticAccessPolicy;
use curatore::lookup::MemoryContentLookup;
use curatore::models::{Account, ContentKind, ContentRecord};
use curatore::routes;
use curatore::session;
use curatore::state::AppState;
use curatore::store::MemoryCurationStore;

/// Token mapped to an account with the editor flag.
pub const EDITOR_TOKEN: &str = "editor-token";

/// Token mapped to an account without edit capability.
pub const VISITOR_TOKEN: &str = "visitor-token";

/// A composed application plus handles on its backing components.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryCurationStore>,
    pub lookup: Arc<MemoryContentLookup>,
}

/// Build a fresh app with an editor and a visitor account registered.
pub fn test_app() -> TestApp {
    let store = Arc::new(MemoryCurationStore::new());
    let lookup = Arc::new(MemoryContentLookup::new());
    let policy = Arc::new(
        StaticAccessPolicy::new()
            .with_account(
                Account {
                    id: 1,
                    name: "editor".to_string(),
                    is_admin: false,
                    is_editor: true,
                },
                Some(EDITOR_TOKEN),
            )
            .with_account(
                Account {
                    id: 2,
                    name: "visitor".to_string(),
                    is_admin: false,
                    is_editor: false,
                },
                Some(VISITOR_TOKEN),
            ),
    );

    let state = AppState::with_components(store.clone(), lookup.clone(), policy);
    let router = routes::app(state, session::create_session_layer(SameSite::Strict));

    TestApp {
        router,
        store,
        lookup,
    }
}

/// A published (or not) post record.
pub fn post_record(id: i64, title: &str, published: bool) -> ContentRecord {
    ContentRecord {
        id,
        kind: ContentKind::Post,
        slug: format!("post-{id}"),
        title: title.to_string(),
        status: i16::from(published),
        created: id,
        permalink: format!("https://example.test/post-{id}"),
    }
}

/// A published page record.
pub fn page_record(id: i64, title: &str) -> ContentRecord {
    ContentRecord {
        id,
        kind: ContentKind::Page,
        slug: format!("page-{id}"),
        title: title.to_string(),
        status: 1,
        created: id,
        permalink: format!("https://example.test/page-{id}"),
    }
}

/// A curation entity record.
pub fn curation_record(id: i64, slug: &str) -> ContentRecord {
    ContentRecord {
        id,
        kind: ContentKind::Curation,
        slug: slug.to_string(),
        title: slug.to_string(),
        status: 0,
        created: id,
        permalink: format!("https://example.test/{slug}"),
    }
}

/// GET a path, optionally with a Bearer token.
pub async fn get(router: &Router, uri: &str, token: Option<&str>) -> Response {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    router
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// POST a form body, optionally with a session cookie.
pub async fn post_form(router: &Router, uri: &str, body: &str, cookie: Option<&str>) -> Response {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    router
        .clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

/// Extract the session cookie pair from a response.
pub fn session_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("response should set a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

/// Read a response body to a string.
pub async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
