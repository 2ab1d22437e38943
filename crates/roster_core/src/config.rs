use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::Context;

pub const SETTINGS_FILE: &str = "roster.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub request_timeout_secs: u64,
    pub feedback_hide_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            request_timeout_secs: 10,
            feedback_hide_ms: 5000,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn feedback_hide_after(&self) -> Duration {
        Duration::from_millis(self.feedback_hide_ms)
    }
}

/// Defaults, then `roster.toml` in the working directory, then environment.
pub fn load_settings() -> anyhow::Result<Settings> {
    let mut settings = Settings::default();
    if Path::new(SETTINGS_FILE).exists() {
        let raw = fs::read_to_string(SETTINGS_FILE)
            .with_context(|| format!("failed to read {SETTINGS_FILE}"))?;
        apply_file(&mut settings, &raw)?;
    }
    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg = toml::from_str::<HashMap<String, String>>(raw)
        .with_context(|| format!("{SETTINGS_FILE} must contain flat string keys"))?;

    if let Some(v) = file_cfg.get("server_url") {
        settings.server_url = v.clone();
    }
    if let Some(v) = file_cfg.get("request_timeout_secs") {
        settings.request_timeout_secs = parse_number("request_timeout_secs", v)?;
    }
    if let Some(v) = file_cfg.get("feedback_hide_ms") {
        settings.feedback_hide_ms = parse_number("feedback_hide_ms", v)?;
    }
    Ok(())
}

fn apply_env(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = lookup("ROSTER_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = parse_number("APP__REQUEST_TIMEOUT_SECS", &v)?;
    }
    if let Some(v) = lookup("APP__FEEDBACK_HIDE_MS") {
        settings.feedback_hide_ms = parse_number("APP__FEEDBACK_HIDE_MS", &v)?;
    }
    Ok(())
}

fn parse_number(key: &str, raw: &str) -> anyhow::Result<u64> {
    raw.trim()
        .parse::<u64>()
        .with_context(|| format!("{key} must be a non-negative integer, got '{raw}'"))
}
