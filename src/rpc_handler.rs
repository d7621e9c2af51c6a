//! RPC method handler for the Smart Bookmarks JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested without stdio.

use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::app::App;
use crate::managers::bookmark_filter::{empty_view_message, BookmarkFilter};
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::bookmark::{Category, CategoryFilter, NewBookmark};
use crate::types::identity::UserIdentity;

fn str_param<'a>(params: &'a Value, name: &str) -> Option<&'a str> {
    params.get(name).and_then(|v| v.as_str())
}

/// Dispatch a JSON-RPC method call.
///
/// Returns `Ok(Value)` on success or `Err(String)` with the message to show.
pub async fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Auth ───
        "auth.sign_in" => {
            let user_id = str_param(params, "user_id").ok_or("missing user_id")?;
            let mut user = UserIdentity::new(user_id);
            if let Some(email) = str_param(params, "email") {
                user = user.with_email(email);
            }
            let mut a = app.lock().await;
            let status = a.sign_in(user).await.map_err(|e| e.to_string())?;
            serde_json::to_value(status).map_err(|e| e.to_string())
        }
        "auth.sign_out" => {
            let mut a = app.lock().await;
            let user = a.sign_out();
            Ok(json!({"ok": true, "user_id": user.map(|u| u.id)}))
        }

        // ─── Bookmarks ───
        "bookmark.add" => {
            let title = str_param(params, "title").ok_or("missing title")?;
            let url = str_param(params, "url").ok_or("missing url")?;
            let category = match str_param(params, "category") {
                Some(c) => c.parse::<Category>()?,
                None => Category::default(),
            };
            let a = app.lock().await;
            let record = a
                .session
                .add_bookmark(NewBookmark::new(title, url, category))
                .await
                .map_err(|e| e.to_string())?;
            serde_json::to_value(record).map_err(|e| e.to_string())
        }
        "bookmark.delete" => {
            let id = str_param(params, "id").ok_or("missing id")?;
            let a = app.lock().await;
            a.session.delete_bookmark(id).await.map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "bookmark.list" => {
            let query = str_param(params, "query").unwrap_or("");
            let category = match str_param(params, "category") {
                Some(c) => c.parse::<CategoryFilter>()?,
                None => CategoryFilter::All,
            };
            let filter = BookmarkFilter::new(query, category);
            let a = app.lock().await;
            if !a.session.is_started() {
                return Err("session not started".to_string());
            }
            let items = a.session.view(&filter);
            let empty_message = items.is_empty().then(|| empty_view_message(&filter));
            Ok(json!({
                "items": items,
                "categories": CategoryFilter::labels(),
                "empty_message": empty_message,
            }))
        }
        "bookmark.refresh" => {
            let mut a = app.lock().await;
            a.session.refresh().await.map_err(|e| e.to_string())?;
            serde_json::to_value(a.session.status()).map_err(|e| e.to_string())
        }

        // ─── Session ───
        "session.status" => {
            let a = app.lock().await;
            serde_json::to_value(a.session.status()).map_err(|e| e.to_string())
        }

        // ─── Settings ───
        "settings.get" => {
            let a = app.lock().await;
            serde_json::to_value(a.settings_engine.get_settings()).map_err(|e| e.to_string())
        }
        "settings.set" => {
            let key = str_param(params, "key").ok_or("missing key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            let mut a = app.lock().await;
            a.settings_engine.set_value(key, value).map_err(|e| e.to_string())?;
            a.apply_settings().await.map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
