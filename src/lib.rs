// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;

pub mod apps {
    #[cfg(feature = "medibot")]
    #[path = "medibot/mod.rs"]
    pub mod medibot;
}

pub mod app {
    #[cfg(feature = "medibot")]
    pub use crate::apps::medibot::*;
}

pub mod common;
pub mod config;

pub use config::Config;

/// App state shared by every handler. Built once at startup and never mutated.
pub struct AppState {
    /// Configuration resolved from the environment on boot.
    pub config: Config,
    /// The chat pipeline: knowledge tables, label client and vision model.
    #[cfg(feature = "medibot")]
    pub bot: app::MediBot,
}

/// Implement IntoResponse for MediBotError.
impl IntoResponse for MediBotError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            MediBotError::InvalidRequest(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.clone()),
            other => {
                tracing::error!("Request failed: {other}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Internal server error: {other}"),
                )
            }
        };
        let body = Json(json!({
            "detail": detail,
        }));
        (status, body).into_response()
    }
}

/// MediBot errors enum.
#[derive(Debug, thiserror::Error)]
pub enum MediBotError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    ImageDecode(String),
    #[error("{0}")]
    VisionModel(String),
    #[error("label lookup failed: {0}")]
    LabelLookup(String),
    #[error("{0}")]
    Internal(String),
}
