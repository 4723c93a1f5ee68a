use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    /// Default for `workspace.select` when the request does not say.
    pub seed_on_open: bool,
}

impl AppState {
    pub fn new(seed_on_open: bool) -> Self {
        Self {
            workspace: None,
            db: None,
            seed_on_open,
        }
    }
}
