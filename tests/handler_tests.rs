//! End-to-end tests for the HTTP API.
//!
//! Each test spins up a fresh router over a temp-file database and drives
//! it with `tower::ServiceExt::oneshot`, covering the auth flow, entry and
//! relation lifecycles, and the uniform not-found policy for foreign rows.
//!
//! Run with: `cargo test --test handler_tests`

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use lucid_journal::config::ServerConfig;
use lucid_journal::handlers::router::build_router;
use lucid_journal::handlers::state::{AppContext, AppState};

struct Harness {
    state: AppState,
    _dir: TempDir,
}

impl Harness {
    fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let config = ServerConfig {
            database_path: dir.path().join("journal.db"),
            backup_code_count: 4,
            ..ServerConfig::default()
        };
        let state = AppContext::new(config).expect("open database");
        Self { state, _dir: dir }
    }

    fn app(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Register a user and return the bearer token plus backup codes.
    async fn register(&self, username: &str) -> (String, Vec<String>) {
        let (status, body) = json_of(
            self.app(),
            request(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": "hunter2hunter2",
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");

        let token = body["data"]["token"].as_str().unwrap().to_string();
        let codes = body["data"]["backup_codes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c.as_str().unwrap().to_string())
            .collect();
        (token, codes)
    }

    /// Create an entry and return its id.
    async fn create_entry(&self, token: &str, entry_type: &str, content: &str) -> i64 {
        let (status, body) = json_of(
            self.app(),
            request(
                Method::POST,
                "/api/v1/entries",
                Some(token),
                Some(json!({ "entry_type": entry_type, "content": content })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "create entry failed: {body}");
        body["data"]["id"].as_i64().unwrap()
    }

    /// Create a relation between two entries; returns (relation id, has_cycle).
    async fn relate(&self, token: &str, from: i64, to: i64, ty: &str) -> (i64, bool) {
        let (status, body) = json_of(
            self.app(),
            request(
                Method::POST,
                "/api/v1/relations",
                Some(token),
                Some(json!({
                    "from_entry_id": from,
                    "to_entry_id": to,
                    "relation_type": ty,
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "create relation failed: {body}");
        (
            body["data"]["relation"]["id"].as_i64().unwrap(),
            body["data"]["has_cycle"].as_bool().unwrap(),
        )
    }
}

fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_of(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let val = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };
    (status, val)
}

// ── auth ──

#[tokio::test]
async fn test_health_is_public() {
    let h = Harness::new();
    let (status, body) = json_of(h.app(), request(Method::GET, "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let h = Harness::new();
    let (status, body) = json_of(h.app(), request(Method::GET, "/api/v1/entries", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = json_of(
        h.app(),
        request(
            Method::GET,
            "/api/v1/entries",
            Some("not-a-real-token"),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_validates_input() {
    let h = Harness::new();
    let (status, body) = json_of(
        h.app(),
        request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "username": "alice",
                "email": "not-an-email",
                "password": "hunter2hunter2",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "email");
}

#[tokio::test]
async fn test_login_and_me() {
    let h = Harness::new();
    h.register("alice").await;

    let (status, body) = json_of(
        h.app(),
        request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "alice", "password": "hunter2hunter2" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().unwrap();

    let (status, body) = json_of(
        h.app(),
        request(Method::GET, "/api/v1/auth/me", Some(token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "alice");

    // Wrong password and unknown user fail identically
    for (user, pass) in [("alice", "wrong-password"), ("nobody", "hunter2hunter2")] {
        let (status, _) = json_of(
            h.app(),
            request(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({ "username": user, "password": pass })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_backup_code_recovery() {
    let h = Harness::new();
    let (_, codes) = h.register("alice").await;

    let recover = |code: String, new_password: &str| {
        request(
            Method::POST,
            "/api/v1/auth/recover",
            None,
            Some(json!({
                "username": "alice",
                "backup_code": code,
                "new_password": new_password,
            })),
        )
    };

    let (status, body) = json_of(h.app(), recover(codes[0].clone(), "new-password-1")).await;
    assert_eq!(status, StatusCode::OK, "recover failed: {body}");
    assert!(body["data"]["token"].is_string());

    // The code is burned; replaying it fails
    let (status, _) = json_of(h.app(), recover(codes[0].clone(), "new-password-2")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Old password is dead, the new one works
    let login = |password: &str| {
        request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "alice", "password": password })),
        )
    };
    let (status, _) = json_of(h.app(), login("hunter2hunter2")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = json_of(h.app(), login("new-password-1")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_backup_code_regeneration_invalidates_old_codes() {
    let h = Harness::new();
    let (token, old_codes) = h.register("alice").await;

    let (status, body) = json_of(
        h.app(),
        request(Method::POST, "/api/v1/auth/backup-codes", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let new_codes = body["data"]["backup_codes"].as_array().unwrap();
    assert_eq!(new_codes.len(), 4);

    let (status, _) = json_of(
        h.app(),
        request(
            Method::POST,
            "/api/v1/auth/recover",
            None,
            Some(json!({
                "username": "alice",
                "backup_code": old_codes[0].clone(),
                "new_password": "whatever-password",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ── entries ──

#[tokio::test]
async fn test_entry_lifecycle() {
    let h = Harness::new();
    let (token, _) = h.register("alice").await;

    let id = h.create_entry(&token, "dream", "flying over the city").await;

    let (status, body) = json_of(
        h.app(),
        request(Method::GET, &format!("/api/v1/entries/{id}"), Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"], "flying over the city");
    assert_eq!(body["data"]["entry_type"], "dream");
    assert_eq!(body["data"]["tags"], json!([]));

    let (status, body) = json_of(
        h.app(),
        request(
            Method::PUT,
            &format!("/api/v1/entries/{id}"),
            Some(&token),
            Some(json!({ "content": "flying over the sea", "completed": false })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"], "flying over the sea");

    let (status, _) = json_of(
        h.app(),
        request(Method::DELETE, &format!("/api/v1/entries/{id}"), Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = json_of(
        h.app(),
        request(Method::GET, &format!("/api/v1/entries/{id}"), Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_entry_validation() {
    let h = Harness::new();
    let (token, _) = h.register("alice").await;

    let (status, body) = json_of(
        h.app(),
        request(
            Method::POST,
            "/api/v1/entries",
            Some(&token),
            Some(json!({ "entry_type": "thought", "content": "   " })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "content");
}

#[tokio::test]
async fn test_cross_user_rows_are_not_found() {
    let h = Harness::new();
    let (alice, _) = h.register("alice").await;
    let (bob, _) = h.register("bob").await;

    let id = h.create_entry(&alice, "memory", "private memory").await;

    // Bob sees 404, not 403, for every verb
    for method in [Method::GET, Method::DELETE] {
        let (status, _) = json_of(
            h.app(),
            request(method, &format!("/api/v1/entries/{id}"), Some(&bob), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    // And it never leaks through listings
    let (_, body) = json_of(
        h.app(),
        request(Method::GET, "/api/v1/entries", Some(&bob), None),
    )
    .await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_entry_tag_attachment() {
    let h = Harness::new();
    let (token, _) = h.register("alice").await;
    let id = h.create_entry(&token, "dream", "tagged dream").await;

    let (status, body) = json_of(
        h.app(),
        request(
            Method::POST,
            "/api/v1/tags",
            Some(&token),
            Some(json!({ "name": "lucid" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let tag_id = body["data"]["id"].as_i64().unwrap();

    // Duplicate name conflicts
    let (status, _) = json_of(
        h.app(),
        request(
            Method::POST,
            "/api/v1/tags",
            Some(&token),
            Some(json!({ "name": "lucid" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = json_of(
        h.app(),
        request(
            Method::PUT,
            &format!("/api/v1/entries/{id}/tags"),
            Some(&token),
            Some(json!({ "tag_ids": [tag_id] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tags"][0]["name"], "lucid");
}

#[tokio::test]
async fn test_entry_emotions_intensity_validated() {
    let h = Harness::new();
    let (token, _) = h.register("alice").await;
    let id = h.create_entry(&token, "dream", "intense dream").await;

    let (_, body) = json_of(
        h.app(),
        request(
            Method::POST,
            "/api/v1/emotions",
            Some(&token),
            Some(json!({ "name": "awe" })),
        ),
    )
    .await;
    let emotion_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = json_of(
        h.app(),
        request(
            Method::PUT,
            &format!("/api/v1/entries/{id}/emotions"),
            Some(&token),
            Some(json!({ "emotions": [{ "emotion_id": emotion_id, "intensity": 11 }] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "intensity");

    let (status, body) = json_of(
        h.app(),
        request(
            Method::PUT,
            &format!("/api/v1/entries/{id}/emotions"),
            Some(&token),
            Some(json!({ "emotions": [{ "emotion_id": emotion_id, "intensity": 7 }] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["emotions"][0]["intensity"], 7);
}

// ── relations ──

#[tokio::test]
async fn test_relation_types_listing() {
    let h = Harness::new();
    let (token, _) = h.register("alice").await;

    let (status, body) = json_of(
        h.app(),
        request(Method::GET, "/api/v1/relations/types", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let types = body["data"].as_array().unwrap();
    assert_eq!(types.len(), 6);
    assert!(types.contains(&json!("led_to")));
}

#[tokio::test]
async fn test_self_relation_rejected() {
    let h = Harness::new();
    let (token, _) = h.register("alice").await;
    let id = h.create_entry(&token, "thought", "solo").await;

    let (status, _) = json_of(
        h.app(),
        request(
            Method::POST,
            "/api/v1/relations",
            Some(&token),
            Some(json!({
                "from_entry_id": id,
                "to_entry_id": id,
                "relation_type": "related_to",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cycle_is_created_with_warning() {
    let h = Harness::new();
    let (token, _) = h.register("alice").await;
    let a = h.create_entry(&token, "dream", "a").await;
    let b = h.create_entry(&token, "thought", "b").await;
    let c = h.create_entry(&token, "plan", "c").await;

    let (_, cycle) = h.relate(&token, a, b, "led_to").await;
    assert!(!cycle);
    let (_, cycle) = h.relate(&token, b, c, "led_to").await;
    assert!(!cycle);

    // Closing the loop succeeds but is flagged
    let (id, cycle) = h.relate(&token, c, a, "resulted_in").await;
    assert!(cycle);

    let (status, _) = json_of(
        h.app(),
        request(Method::GET, &format!("/api/v1/relations/entry/{a}"), Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The flagged relation exists and can be deleted normally
    let (status, _) = json_of(
        h.app(),
        request(Method::DELETE, &format!("/api/v1/relations/{id}"), Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_relation_delete_removes_from_both_listings() {
    let h = Harness::new();
    let (token, _) = h.register("alice").await;
    let a = h.create_entry(&token, "dream", "a").await;
    let b = h.create_entry(&token, "memory", "b").await;
    let (id, _) = h.relate(&token, a, b, "reminded_of").await;

    let (_, body) = json_of(
        h.app(),
        request(Method::GET, &format!("/api/v1/relations/entry/{b}"), Some(&token), None),
    )
    .await;
    assert_eq!(body["data"]["incoming"].as_array().unwrap().len(), 1);

    json_of(
        h.app(),
        request(Method::DELETE, &format!("/api/v1/relations/{id}"), Some(&token), None),
    )
    .await;

    for entry in [a, b] {
        let (_, body) = json_of(
            h.app(),
            request(
                Method::GET,
                &format!("/api/v1/relations/entry/{entry}"),
                Some(&token),
                None,
            ),
        )
        .await;
        assert_eq!(body["data"]["incoming"], json!([]));
        assert_eq!(body["data"]["outgoing"], json!([]));
    }
}

#[tokio::test]
async fn test_chain_walk_depth_and_direction() {
    let h = Harness::new();
    let (token, _) = h.register("alice").await;
    let a = h.create_entry(&token, "dream", "a").await;
    let b = h.create_entry(&token, "thought", "b").await;
    let c = h.create_entry(&token, "plan", "c").await;
    h.relate(&token, a, b, "led_to").await;
    h.relate(&token, b, c, "led_to").await;

    let (status, body) = json_of(
        h.app(),
        request(
            Method::GET,
            &format!("/api/v1/relations/chain/{a}?depth=1&direction=forward"),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["entry_count"], 2);

    let (_, body) = json_of(
        h.app(),
        request(
            Method::GET,
            &format!("/api/v1/relations/chain/{a}?depth=5"),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(body["data"]["entry_count"], 3);
    assert_eq!(body["data"]["total_depth"], 2);

    let (status, _) = json_of(
        h.app(),
        request(
            Method::GET,
            &format!("/api/v1/relations/chain/{a}?direction=sideways"),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_most_connected_ranking() {
    let h = Harness::new();
    let (token, _) = h.register("alice").await;
    let hub = h.create_entry(&token, "dream", "hub").await;
    let b = h.create_entry(&token, "thought", "b").await;
    let c = h.create_entry(&token, "plan", "c").await;
    let d = h.create_entry(&token, "memory", "d").await;

    h.relate(&token, hub, b, "led_to").await;
    h.relate(&token, hub, c, "led_to").await;
    h.relate(&token, d, hub, "caused_by").await;

    let (status, body) = json_of(
        h.app(),
        request(
            Method::GET,
            "/api/v1/relations/most-connected?limit=2",
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ranked = body["data"].as_array().unwrap();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0]["entry_id"].as_i64().unwrap(), hub);
    assert_eq!(ranked[0]["connections"], 3);
}

#[tokio::test]
async fn test_graph_export_scoped_to_entry() {
    let h = Harness::new();
    let (token, _) = h.register("alice").await;
    let a = h.create_entry(&token, "dream", "a").await;
    let b = h.create_entry(&token, "thought", "b").await;
    let c = h.create_entry(&token, "plan", "c").await;
    h.relate(&token, a, b, "led_to").await;
    h.relate(&token, b, c, "led_to").await;

    let (_, body) = json_of(
        h.app(),
        request(Method::GET, "/api/v1/relations/graph", Some(&token), None),
    )
    .await;
    assert_eq!(body["data"]["edges"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["nodes"].as_array().unwrap().len(), 3);

    let (_, body) = json_of(
        h.app(),
        request(
            Method::GET,
            &format!("/api/v1/relations/graph?entry_id={a}"),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(body["data"]["edges"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_graph_export_includes_isolated_focal_entry() {
    let h = Harness::new();
    let (token, _) = h.register("alice").await;
    let lone = h.create_entry(&token, "thought", "no relations yet").await;

    let (status, body) = json_of(
        h.app(),
        request(
            Method::GET,
            &format!("/api/v1/relations/graph?entry_id={lone}"),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["nodes"], json!([lone]));
    assert_eq!(body["data"]["edges"], json!([]));
}

// ── skills and stats ──

#[tokio::test]
async fn test_skill_progress_levels_up() {
    let h = Harness::new();
    let (token, _) = h.register("alice").await;

    let (_, body) = json_of(
        h.app(),
        request(
            Method::POST,
            "/api/v1/skills",
            Some(&token),
            Some(json!({ "name": "lucid dreaming" })),
        ),
    )
    .await;
    let skill_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["level"], 1);

    let (status, body) = json_of(
        h.app(),
        request(
            Method::POST,
            &format!("/api/v1/skills/{skill_id}/progress"),
            Some(&token),
            Some(json!({ "experience": 150 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["experience"], 150);
    assert_eq!(body["data"]["level"], 2);

    let (status, _) = json_of(
        h.app(),
        request(
            Method::POST,
            &format!("/api/v1/skills/{skill_id}/progress"),
            Some(&token),
            Some(json!({ "experience": 0 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats_overview_and_streak() {
    let h = Harness::new();
    let (token, _) = h.register("alice").await;
    h.create_entry(&token, "dream", "one").await;
    h.create_entry(&token, "plan", "two").await;

    let (status, body) = json_of(
        h.app(),
        request(Method::GET, "/api/v1/stats/overview", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["entries"]["total"], 2);
    assert_eq!(body["data"]["entries"]["dreams"], 1);

    let (status, body) = json_of(
        h.app(),
        request(Method::GET, "/api/v1/stats/streak", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["current"], 1);
    assert_eq!(body["data"]["longest"], 1);

    let (status, body) = json_of(
        h.app(),
        request(Method::GET, "/api/v1/stats/heatmap", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["count"], 2);
}
