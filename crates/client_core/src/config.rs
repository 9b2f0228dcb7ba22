//! Client settings: defaults, then `board.toml`, then environment overrides.

use std::{fs, path::Path};

use shared::domain::{BoardId, DEFAULT_BOARD_ID};
use tracing::warn;
use url::Url;

use crate::error::{StoreError, StoreResult};

pub const SETTINGS_FILE: &str = "board.toml";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_DRAG_THRESHOLD: f32 = 8.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    /// Origin of the board store; requests go to `{api_url}/api/...`.
    pub api_url: String,
    pub board_id: BoardId,
    pub drag_threshold: f32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            board_id: DEFAULT_BOARD_ID,
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
        }
    }
}

pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(SETTINGS_FILE), |name| std::env::var(name).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match raw.parse::<toml::Table>() {
            Ok(table) => {
                if let Some(v) = table_string(&table, "api_url") {
                    settings.api_url = v;
                }
                if let Some(v) = table_string(&table, "board_id") {
                    apply_board_id(&mut settings, &v, "board_id");
                }
                if let Some(v) = table_string(&table, "drag_threshold") {
                    apply_drag_threshold(&mut settings, &v, "drag_threshold");
                }
            }
            Err(err) => warn!(path = %path.display(), "ignoring unreadable settings file: {err}"),
        }
    }

    if let Some(v) = env("BOARD_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = env("BOARD_ID") {
        apply_board_id(&mut settings, &v, "BOARD_ID");
    }
    if let Some(v) = env("APP__BOARD_ID") {
        apply_board_id(&mut settings, &v, "APP__BOARD_ID");
    }

    if let Some(v) = env("BOARD_DRAG_THRESHOLD") {
        apply_drag_threshold(&mut settings, &v, "BOARD_DRAG_THRESHOLD");
    }

    settings
}

/// Validates a store origin and strips trailing slashes so paths can be appended.
pub fn normalize_api_url(raw: &str) -> StoreResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|err| StoreError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(StoreError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(trimmed.to_string())
}

fn table_string(table: &toml::Table, key: &str) -> Option<String> {
    match table.get(key)? {
        toml::Value::String(v) => Some(v.clone()),
        toml::Value::Integer(v) => Some(v.to_string()),
        toml::Value::Float(v) => Some(v.to_string()),
        other => {
            warn!(key, "ignoring settings value of unexpected type {}", other.type_str());
            None
        }
    }
}

fn apply_board_id(settings: &mut ClientSettings, raw: &str, source: &str) {
    match raw.trim().parse::<i64>() {
        Ok(id) => settings.board_id = BoardId(id),
        Err(err) => warn!(source, value = raw, "ignoring invalid board id: {err}"),
    }
}

fn apply_drag_threshold(settings: &mut ClientSettings, raw: &str, source: &str) {
    match raw.trim().parse::<f32>() {
        Ok(v) if v.is_finite() && v >= 0.0 => settings.drag_threshold = v,
        Ok(v) => warn!(source, value = v, "ignoring out-of-range drag threshold"),
        Err(err) => warn!(source, value = raw, "ignoring invalid drag threshold: {err}"),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
