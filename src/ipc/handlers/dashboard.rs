use crate::ipc::helpers::{get_optional_str, to_json, with_conn, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::stats;
use crate::store::{self, Collection};
use rusqlite::Connection;
use serde_json::json;
use tracing::warn;

fn dashboard_get(conn: &Connection) -> Result<serde_json::Value, HandlerErr> {
    to_json(&stats::load_dashboard(conn)?)
}

fn profile_get(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let Some(id) = get_optional_str(params, "studentId") else {
        return Err(HandlerErr::bad_params("Please enter a Student ID"));
    };
    to_json(&stats::profile_summary(conn, &id)?)
}

fn storage_reset(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let raw = get_optional_str(params, "collection").unwrap_or_default();
    let Some(collection) = Collection::parse(&raw) else {
        return Err(HandlerErr::bad_params(
            "collection must be students, attendance or marks",
        ));
    };
    store::reset(conn, collection)?;
    warn!(collection = collection.name(), "collection reset to empty");
    Ok(json!({ "collection": collection.name() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.get" => Some(with_conn(state, req, |conn, _| dashboard_get(conn))),
        "profile.get" => Some(with_conn(state, req, profile_get)),
        "storage.reset" => Some(with_conn(state, req, storage_reset)),
        _ => None,
    }
}
