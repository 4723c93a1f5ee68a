use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::today;
use crate::ipc::types::{AppState, Request};
use crate::seed;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct OpenedWorkspace {
    pub schema_version: i64,
    pub seeded: bool,
}

/// Opens (or creates) the workspace store and makes it current.
///
/// Sample data is written only when `seed_if_empty` is set and the store has
/// no students. An unreadable Students collection is left alone so the
/// caller can decide whether to reset it.
pub fn open_workspace(
    state: &mut AppState,
    path: &Path,
    seed_if_empty: bool,
) -> anyhow::Result<OpenedWorkspace> {
    let conn = db::open_db(path)?;
    let schema_version = db::schema_version(&conn)?.unwrap_or(db::SCHEMA_VERSION);

    let seeded = if seed_if_empty {
        match seed::seed_if_empty(&conn, today(), &mut rand::thread_rng()) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "skipping sample data");
                false
            }
        }
    } else {
        false
    };

    info!(workspace = %path.to_string_lossy(), seeded, "workspace opened");
    state.workspace = Some(path.to_path_buf());
    state.db = Some(conn);
    Ok(OpenedWorkspace {
        schema_version,
        seeded,
    })
}

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };
    let seed_if_empty = req
        .params
        .get("seedIfEmpty")
        .and_then(|v| v.as_bool())
        .unwrap_or(state.seed_on_open);

    match open_workspace(state, &path, seed_if_empty) {
        Ok(opened) => ok(
            &req.id,
            json!({
                "workspacePath": path.to_string_lossy(),
                "schemaVersion": opened.schema_version,
                "seeded": opened.seeded,
            }),
        ),
        Err(e) => err(&req.id, "db_open_failed", format!("{e:?}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
