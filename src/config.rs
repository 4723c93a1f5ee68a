use std::{env, path::PathBuf};

#[derive(Debug, Clone)]
pub struct Config {
    /// Workspace opened before the first request, if set.
    pub workspace: Option<PathBuf>,
    /// Whether an empty workspace gets sample data when opened.
    pub seed_on_open: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let workspace = env::var("RECORDBOOK_WORKSPACE")
            .ok()
            .map(|v| v.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let seed_on_open = env::var("RECORDBOOK_SEED")
            .ok()
            .map(|v| parse_flag(&v))
            .unwrap_or(true);

        Self {
            workspace,
            seed_on_open,
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
