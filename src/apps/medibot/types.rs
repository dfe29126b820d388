// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::common::iso_timestamp;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Structured facts about one medication. Absent fields serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MedicationInfo {
    pub name: String,
    pub purpose: Option<String>,
    pub warnings: Option<String>,
    pub dosage: Option<String>,
    /// At most five entries.
    pub interactions: Option<Vec<String>>,
    /// At most five entries.
    pub side_effects: Option<Vec<String>>,
}

/// Request body for /chat
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// Free-text question. May be empty.
    #[serde(default)]
    pub message: String,
    /// Base64 image, raw or as a data URL.
    #[serde(default)]
    pub image_data: Option<String>,
}

impl ChatRequest {
    /// Image payload, if one was sent. Empty strings count as absent.
    pub fn image(&self) -> Option<&str> {
        self.image_data.as_deref().filter(|data| !data.is_empty())
    }
}

/// Response for /chat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    /// Answer text. Always ends with the medical disclaimer.
    pub response: String,
    pub medication_info: Option<MedicationInfo>,
    /// Between 0 and 1.
    pub confidence: f64,
    /// ISO-8601 local time at which the response was started.
    pub timestamp: String,
    /// Provenance labels in the order they were added.
    pub sources: Vec<String>,
}

impl ChatResponse {
    /// Empty response shape stamped with the current time.
    pub fn started_now() -> Self {
        Self {
            response: String::new(),
            medication_info: None,
            confidence: 0.0,
            timestamp: iso_timestamp(),
            sources: Vec::new(),
        }
    }
}
