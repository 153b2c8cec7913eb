use std::{
    collections::HashMap,
    fs,
    path::Path,
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use intake_core::{
    summary::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL},
    CaseSink, GeminiSummarizer, IntakeController, MissingCaseSink, MissingSummarizer, Summarizer,
    SupportContact, WebhookSink, DEFAULT_MIN_PROCESSING,
};
use shared::domain::FormData;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub webhook_url: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub min_processing_ms: u64,
    pub support: SupportContact,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            webhook_url: None,
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.into(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.into(),
            min_processing_ms: DEFAULT_MIN_PROCESSING.as_millis() as u64,
            support: SupportContact::default(),
        }
    }
}

pub fn load_settings(path: &Path) -> Settings {
    let raw = fs::read_to_string(path).ok();
    resolve_settings(raw.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then the flat `intake.toml` table, then environment overrides.
pub fn resolve_settings(raw_file: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = raw_file {
        match toml::from_str::<HashMap<String, toml::Value>>(raw) {
            Ok(file_cfg) => {
                let get = |key: &str| file_cfg.get(key).and_then(scalar_to_string);
                if let Some(v) = get("webhook_url") {
                    settings.webhook_url = Some(v);
                }
                if let Some(v) = get("gemini_api_key") {
                    settings.gemini_api_key = Some(v);
                }
                if let Some(v) = get("gemini_model") {
                    settings.gemini_model = v;
                }
                if let Some(v) = get("gemini_base_url") {
                    settings.gemini_base_url = v;
                }
                if let Some(v) = get("min_processing_ms").and_then(|v| v.parse().ok()) {
                    settings.min_processing_ms = v;
                }
                if let Some(v) = get("support_phone") {
                    settings.support.phone = v;
                }
                if let Some(v) = get("support_email") {
                    settings.support.email = v;
                }
            }
            Err(err) => warn!("config: ignoring unreadable settings file: {err}"),
        }
    }

    if let Some(v) = env("INTAKE_WEBHOOK_URL") {
        settings.webhook_url = Some(v);
    }
    if let Some(v) = env("APP__WEBHOOK_URL") {
        settings.webhook_url = Some(v);
    }

    if let Some(v) = env("API_KEY") {
        settings.gemini_api_key = Some(v);
    }
    if let Some(v) = env("GEMINI_API_KEY") {
        settings.gemini_api_key = Some(v);
    }

    if let Some(v) = env("APP__GEMINI_MODEL") {
        settings.gemini_model = v;
    }
    if let Some(v) = env("APP__GEMINI_BASE_URL") {
        settings.gemini_base_url = v;
    }

    if let Some(v) = env("APP__MIN_PROCESSING_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.min_processing_ms = parsed;
        }
    }

    if let Some(v) = env("APP__SUPPORT_PHONE") {
        settings.support.phone = v;
    }
    if let Some(v) = env("APP__SUPPORT_EMAIL") {
        settings.support.email = v;
    }

    settings.webhook_url = settings.webhook_url.filter(|v| !v.trim().is_empty());
    settings.gemini_api_key = settings.gemini_api_key.filter(|v| !v.trim().is_empty());
    settings
}

fn scalar_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn build_controller(settings: &Settings) -> Result<IntakeController> {
    let summarizer: Arc<dyn Summarizer> = match &settings.gemini_api_key {
        Some(key) => Arc::new(GeminiSummarizer::new(
            key.as_str(),
            &settings.gemini_model,
            &settings.gemini_base_url,
        )?),
        None => {
            info!("config: no summary credential configured, filings use the fallback summary");
            Arc::new(MissingSummarizer)
        }
    };

    let sink: Arc<dyn CaseSink> = match &settings.webhook_url {
        Some(url) => Arc::new(WebhookSink::new(url)?),
        None => {
            warn!("config: no webhook url configured, submissions will fail");
            Arc::new(MissingCaseSink)
        }
    };

    Ok(IntakeController::new(summarizer, sink)
        .with_min_processing(Duration::from_millis(settings.min_processing_ms)))
}

/// Reads a saved case as JSON or TOML, chosen by extension.
pub fn load_case(path: &Path) -> Result<FormData> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read case file '{}'", path.display()))?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        toml::from_str(&raw)
            .with_context(|| format!("invalid case file '{}'", path.display()))
    } else {
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid case file '{}'", path.display()))
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
