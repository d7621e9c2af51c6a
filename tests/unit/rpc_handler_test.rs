//! Unit tests for the JSON-RPC method dispatcher.

use serde_json::{json, Value};
use smart_bookmarks::app::App;
use smart_bookmarks::rpc_handler::handle_method;
use smart_bookmarks::services::settings_engine::SettingsEngine;
use tempfile::TempDir;
use tokio::sync::Mutex;

fn app(dir: &TempDir) -> Mutex<App> {
    let db_path = dir.path().join("bookmarks.db");
    let settings_path = dir.path().join("settings.json");
    let engine = SettingsEngine::new(Some(settings_path.to_string_lossy().to_string()));
    Mutex::new(App::new(&db_path.to_string_lossy(), engine).unwrap())
}

async fn call(app: &Mutex<App>, method: &str, params: Value) -> Result<Value, String> {
    handle_method(app, method, &params).await
}

async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_ping_and_unknown_method() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    assert_eq!(call(&app, "ping", json!({})).await, Ok(json!({"pong": true})));
    assert_eq!(
        call(&app, "bookmark.rename", json!({})).await,
        Err("unknown method: bookmark.rename".to_string())
    );
}

#[tokio::test]
async fn test_calls_before_sign_in_fail() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    assert_eq!(
        call(&app, "bookmark.add", json!({"title": "A", "url": "https://a.dev"})).await,
        Err("Unauthorized".to_string())
    );
    assert_eq!(
        call(&app, "bookmark.list", json!({})).await,
        Err("session not started".to_string())
    );
    assert_eq!(
        call(&app, "bookmark.refresh", json!({})).await,
        Err("Session not started".to_string())
    );
    assert_eq!(
        call(&app, "auth.sign_in", json!({})).await,
        Err("missing user_id".to_string())
    );
}

#[tokio::test]
async fn test_add_list_delete_flow() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let status = call(&app, "auth.sign_in", json!({"user_id": "alice", "email": "a@x.dev"}))
        .await
        .unwrap();
    assert_eq!(status["started"], true);
    assert_eq!(status["user"], "alice");

    let empty = call(&app, "bookmark.list", json!({})).await.unwrap();
    assert_eq!(empty["items"], json!([]));
    assert_eq!(empty["empty_message"], "No bookmarks yet. Add your first one!");
    assert_eq!(
        empty["categories"],
        json!(["All", "General", "Work", "Personal", "Learning", "Tools"])
    );

    let created = call(
        &app,
        "bookmark.add",
        json!({"title": "Go Docs", "url": "https://go.dev", "category": "Learning"}),
    )
    .await
    .unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["category"], "Learning");
    assert_eq!(created["user_id"], "alice");
    settle().await;

    let listed = call(&app, "bookmark.list", json!({"query": "GO"})).await.unwrap();
    assert_eq!(listed["items"][0]["id"], json!(id));
    assert_eq!(listed["empty_message"], Value::Null);

    let filtered = call(&app, "bookmark.list", json!({"category": "Work"})).await.unwrap();
    assert_eq!(filtered["items"], json!([]));
    assert_eq!(filtered["empty_message"], "No bookmarks match your search.");

    assert_eq!(
        call(&app, "bookmark.delete", json!({"id": id})).await,
        Ok(json!({"ok": true}))
    );
    let after = call(&app, "session.status", json!({})).await.unwrap();
    assert_eq!(after["bookmarks"], 0);
    assert_eq!(after["subscription"]["phase"], "active");
}

#[tokio::test]
async fn test_bad_params_are_reported() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);
    call(&app, "auth.sign_in", json!({"user_id": "alice"})).await.unwrap();

    assert_eq!(
        call(&app, "bookmark.add", json!({"url": "https://a.dev"})).await,
        Err("missing title".to_string())
    );
    assert_eq!(
        call(&app, "bookmark.add", json!({"title": "A"})).await,
        Err("missing url".to_string())
    );
    assert_eq!(
        call(&app, "bookmark.add", json!({"title": "A", "url": "u", "category": "Misc"})).await,
        Err("unknown category 'Misc'".to_string())
    );
    assert_eq!(
        call(&app, "bookmark.list", json!({"category": "work"})).await,
        Err("unknown category 'work'".to_string())
    );
    assert_eq!(
        call(&app, "bookmark.delete", json!({})).await,
        Err("missing id".to_string())
    );
}

#[tokio::test]
async fn test_sign_out_stops_session() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);
    call(&app, "auth.sign_in", json!({"user_id": "alice"})).await.unwrap();

    let out = call(&app, "auth.sign_out", json!({})).await.unwrap();
    assert_eq!(out, json!({"ok": true, "user_id": "alice"}));

    let status = call(&app, "session.status", json!({})).await.unwrap();
    assert_eq!(status["started"], false);
    assert_eq!(status["user"], Value::Null);
    assert!(app.lock().await.feed.live_handles().is_empty());
}

#[tokio::test]
async fn test_settings_set_reaches_session() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    call(
        &app,
        "settings.set",
        json!({"key": "realtime.rollback_failed_deletes", "value": true}),
    )
    .await
    .unwrap();

    let settings = call(&app, "settings.get", json!({})).await.unwrap();
    assert_eq!(settings["realtime"]["rollback_failed_deletes"], true);
    assert!(app.lock().await.session.settings().rollback_failed_deletes);

    assert!(call(&app, "settings.set", json!({"key": "realtime.nope", "value": 1}))
        .await
        .unwrap_err()
        .starts_with("Invalid settings key"));
}

async fn list_len(app: &Mutex<App>) -> usize {
    let listed = call(app, "bookmark.list", json!({})).await.unwrap();
    listed["items"].as_array().map(Vec::len).unwrap_or(0)
}

#[tokio::test]
async fn test_table_changed_before_sign_in_still_delivers_adds() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    call(&app, "settings.set", json!({"key": "realtime.table", "value": "links"}))
        .await
        .unwrap();
    assert_eq!(app.lock().await.store.feed_table().as_deref(), Some("links"));

    call(&app, "auth.sign_in", json!({"user_id": "alice"})).await.unwrap();
    settle().await;
    call(&app, "bookmark.add", json!({"title": "A", "url": "https://a.dev"}))
        .await
        .unwrap();
    settle().await;

    assert_eq!(list_len(&app).await, 1);
}

#[tokio::test]
async fn test_table_changed_mid_session_reattaches() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);
    call(&app, "auth.sign_in", json!({"user_id": "alice"})).await.unwrap();
    settle().await;
    let before = app.lock().await.feed.live_handles();

    call(&app, "settings.set", json!({"key": "realtime.table", "value": "links"}))
        .await
        .unwrap();
    settle().await;
    let after = app.lock().await.feed.live_handles();
    assert_eq!(after.len(), 1);
    assert_ne!(before, after);

    call(&app, "bookmark.add", json!({"title": "B", "url": "https://b.dev"}))
        .await
        .unwrap();
    settle().await;
    assert_eq!(list_len(&app).await, 1);
}
