// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Service-level endpoints that do not depend on the chat pipeline.

use crate::AppState;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::warn;
use utoipa::ToSchema;

pub const API_VERSION: &str = "2.0";

/// Response for /
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    pub endpoints: Vec<String>,
}

/// Response for /health
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthCheck {
    pub status: String,
    pub timestamp: String,
    /// Whether a Google AI key was supplied, not whether it is valid.
    pub google_ai_configured: bool,
    pub version: String,
}

/// Response for /get-ngrok-url
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TunnelUrl {
    pub url: Option<String>,
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service descriptor", body = ServiceInfo))
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: format!("MediBot API v{API_VERSION} is live"),
        version: API_VERSION.to_string(),
        endpoints: ["/chat", "/health", "/docs"].map(String::from).to_vec(),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Health check response", body = HealthCheck))
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "healthy".to_string(),
        timestamp: iso_timestamp(),
        google_ai_configured: state.config.google_ai_configured(),
        version: API_VERSION.to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/get-ngrok-url",
    responses((status = 200, description = "Public demo tunnel URL, if one is running", body = TunnelUrl))
)]
pub async fn get_ngrok_url(State(state): State<Arc<AppState>>) -> Json<TunnelUrl> {
    Json(TunnelUrl {
        url: read_tunnel_url(&state.config.tunnel_file).await,
    })
}

/// The `url` field of the tunnel descriptor file. Missing or unreadable files give `None`.
pub async fn read_tunnel_url(path: &Path) -> Option<String> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!("Cannot read tunnel file {}: {e}", path.display());
            return None;
        }
    };

    match serde_json::from_str::<TunnelUrl>(&raw) {
        Ok(descriptor) => descriptor.url,
        Err(e) => {
            warn!("Malformed tunnel file {}: {e}", path.display());
            None
        }
    }
}

/// Local wall-clock time as `YYYY-MM-DDTHH:MM:SS.ffffff`.
pub fn iso_timestamp() -> String {
    chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

#[cfg(test)]
mod test {
    use super::*;

    fn scratch_file(contents: Option<&str>) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("medibot-tunnel-{}.json", uuid::Uuid::new_v4()));
        if let Some(contents) = contents {
            std::fs::write(&path, contents).unwrap();
        }
        path
    }

    #[tokio::test]
    async fn tunnel_url_is_read_from_file() {
        let path = scratch_file(Some(r#"{"url": "https://abc.ngrok.app"}"#));
        assert_eq!(
            read_tunnel_url(&path).await.as_deref(),
            Some("https://abc.ngrok.app")
        );
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn missing_or_malformed_tunnel_file_gives_none() {
        assert!(read_tunnel_url(&scratch_file(None)).await.is_none());

        let path = scratch_file(Some("not json"));
        assert!(read_tunnel_url(&path).await.is_none());
        std::fs::remove_file(path).unwrap();

        let path = scratch_file(Some(r#"{"other": 1}"#));
        assert!(read_tunnel_url(&path).await.is_none());
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn root_lists_endpoints() {
        let Json(info) = root().await;
        assert_eq!(info.message, "MediBot API v2.0 is live");
        assert_eq!(info.version, "2.0");
        assert_eq!(info.endpoints, ["/chat", "/health", "/docs"]);
    }
}
