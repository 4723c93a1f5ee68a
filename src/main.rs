mod attendance;
mod config;
mod db;
mod error;
mod export;
mod ipc;
mod model;
mod seed;
mod stats;
mod store;
mod students;
mod validate;

use std::io::{self, BufRead, Write};
use tracing::{error, info};

fn main() {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recordbookd=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let config = config::Config::from_env();
    let mut state = ipc::AppState::new(config.seed_on_open);

    if let Some(path) = config.workspace.as_ref() {
        if let Err(e) = ipc::open_workspace(&mut state, path, config.seed_on_open) {
            error!(workspace = %path.to_string_lossy(), "failed to open workspace: {e:?}");
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "recordbookd ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                let _ = writeln!(stdout, "{}", ipc::bad_json(e.to_string()));
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}
