// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Runtime configuration.
//!
//! Resolved once at process startup and handed to the app state. Request handling never reads
//! the process environment.

use crate::MediBotError;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_OPENFDA_LABEL_URL: &str = "https://api.fda.gov/drug/label.json";
pub const DEFAULT_TUNNEL_FILE: &str = "api_url.json";

const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 60;
const DEFAULT_OPENFDA_TIMEOUT_SECS: u64 = 15;
const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Service configuration resolved at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    /// Google AI key. `None` when unset or empty.
    pub google_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub gemini_timeout: Duration,
    pub openfda_label_url: String,
    pub openfda_timeout: Duration,
    /// JSON file written by the demo tunnel, holding `{"url": ...}`.
    pub tunnel_file: PathBuf,
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_ADDR.to_string(),
            google_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            gemini_timeout: Duration::from_secs(DEFAULT_GEMINI_TIMEOUT_SECS),
            openfda_label_url: DEFAULT_OPENFDA_LABEL_URL.to_string(),
            openfda_timeout: Duration::from_secs(DEFAULT_OPENFDA_TIMEOUT_SECS),
            tunnel_file: PathBuf::from(DEFAULT_TUNNEL_FILE),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl Config {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self, MediBotError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Unset variables fall back to defaults. Numeric variables that fail to parse are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MediBotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let string_or = |key: &str, default: String| lookup(key).unwrap_or(default);

        Ok(Self {
            bind_addr: string_or("MEDIBOT_ADDR", defaults.bind_addr),
            google_api_key: lookup("GOOGLE_API_KEY").filter(|key| !key.trim().is_empty()),
            gemini_model: string_or("GEMINI_MODEL", defaults.gemini_model),
            gemini_base_url: string_or("GEMINI_BASE_URL", defaults.gemini_base_url),
            gemini_timeout: parse_secs(&lookup, "GEMINI_TIMEOUT_SECS", defaults.gemini_timeout)?,
            openfda_label_url: string_or("OPENFDA_LABEL_URL", defaults.openfda_label_url),
            openfda_timeout: parse_secs(&lookup, "OPENFDA_TIMEOUT_SECS", defaults.openfda_timeout)?,
            tunnel_file: lookup("MEDIBOT_TUNNEL_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.tunnel_file),
            max_body_bytes: match lookup("MEDIBOT_MAX_BODY_BYTES") {
                Some(raw) => raw.trim().parse().map_err(|e| {
                    MediBotError::InvalidConfig(format!("MEDIBOT_MAX_BODY_BYTES={raw}: {e}"))
                })?,
                None => defaults.max_body_bytes,
            },
        })
    }

    /// Whether a Google AI key was supplied. Says nothing about whether it authenticates.
    pub fn google_ai_configured(&self) -> bool {
        self.google_api_key.is_some()
    }
}

fn parse_secs<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration, MediBotError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| MediBotError::InvalidConfig(format!("{key}={raw}: {e}"))),
        None => Ok(default),
    }
}
