// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

// Medication packaging analysis with a multimodal model (Google Gemini).
// Decodes the uploaded photo, asks the model for a patient-friendly write-up and pulls the
// labeled lines it answers with into a MedicationInfo.

use super::types::MedicationInfo;
use crate::MediBotError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::ImageFormat;
use regex::Regex;
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

pub const IMAGE_ANALYSIS_SOURCE: &str = "Google Gemini AI Image Analysis";
pub const IMAGE_ANALYSIS_CONFIDENCE: f64 = 0.9;

const DEFAULT_QUESTION: &str = "Please identify and describe this medication";

// ============================================
// Image decoding
// ============================================

/// An image ready to be sent inline to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }
}

/// Decode a raw base64 string or a data URL into an image the model accepts.
///
/// For data URLs everything after the first comma is the payload. The bytes must decode as an
/// image; JPEG, PNG and WebP are forwarded unchanged and any other format is re-encoded as PNG.
pub fn decode_image(image_data: &str) -> Result<EncodedImage, MediBotError> {
    let payload = match image_data.split_once(',') {
        Some((_, rest)) => rest,
        None => image_data,
    };
    let payload: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = BASE64
        .decode(payload.as_bytes())
        .map_err(|e| MediBotError::ImageDecode(format!("invalid base64 data: {e}")))?;

    let format = image::guess_format(&bytes)
        .map_err(|e| MediBotError::ImageDecode(format!("cannot identify image file: {e}")))?;
    let decoded = image::load_from_memory_with_format(&bytes, format)
        .map_err(|e| MediBotError::ImageDecode(format!("cannot decode image: {e}")))?;

    let mime_type = match format {
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Png => Some("image/png"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    };
    if let Some(mime_type) = mime_type {
        return Ok(EncodedImage { mime_type, bytes });
    }

    let mut png = Cursor::new(Vec::new());
    decoded
        .write_to(&mut png, image::ImageOutputFormat::Png)
        .map_err(|e| MediBotError::ImageDecode(format!("cannot re-encode image: {e}")))?;
    Ok(EncodedImage {
        mime_type: "image/png",
        bytes: png.into_inner(),
    })
}

// ============================================
// Prompt
// ============================================

/// Instructions sent with every image.
pub fn build_prompt(user_message: &str) -> String {
    let question = if user_message.is_empty() {
        DEFAULT_QUESTION
    } else {
        user_message
    };

    format!(
        r#"
You are a trusted AI medical assistant trained to provide detailed, patient-friendly information about medications.

The user may provide either:
- A medication image
- A text-based question
- Or both

Analyze the input and respond using the following format:

---

**💊 MEDICATION OVERVIEW**
- Name: [Brand and/or Generic Name]
- Dosage: [Strength and Form]
- Active Ingredient(s): [Chemical composition]

**📘 MEDICAL INFORMATION**
- Purpose: [What it treats]
- How to Take: [Administration instructions]
- Common Side Effects: [3–5 expected side effects]
- Warnings: [Important safety notes, allergies, misuse]

**⚠️ SAFETY & INTERACTIONS**
- Drug Interactions: [Major medications or substances to avoid]
- When to Contact a Doctor: [Red flag symptoms or emergencies]

---

User’s specific question or concern: "{question}"

If an image is provided, describe its likely contents. If only a message is provided, analyze the query accordingly. Always prioritize clarity and patient safety.
"#
    )
}

// ============================================
// Model
// ============================================

/// A multimodal model that answers a text prompt about an image.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn describe_image(
        &self,
        prompt: &str,
        image: &EncodedImage,
    ) -> Result<String, MediBotError>;
}

/// Gemini `generateContent` over REST.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        api_key: Option<String>,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, MediBotError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MediBotError::InvalidConfig(format!("Gemini client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl VisionModel for GeminiClient {
    async fn describe_image(
        &self,
        prompt: &str,
        image: &EncodedImage,
    ) -> Result<String, MediBotError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            MediBotError::VisionModel("GOOGLE_API_KEY is not configured".to_string())
        })?;

        let request_body = json!({
            "contents": [{
                "parts": [
                    { "text": prompt },
                    {
                        "inline_data": {
                            "mime_type": image.mime_type,
                            "data": image.to_base64()
                        }
                    }
                ]
            }]
        });

        info!("Calling Gemini for image analysis with model: {}", self.model);

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| MediBotError::VisionModel(format!("Gemini request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(MediBotError::VisionModel(format!(
                "Gemini API error {status}: {error_text}"
            )));
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| MediBotError::VisionModel(format!("Failed to parse response: {e}")))?;

        let parts = response_json["candidates"]
            .get(0)
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
            .ok_or_else(|| MediBotError::VisionModel("No content in Gemini response".into()))?;

        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect();
        if text.is_empty() {
            return Err(MediBotError::VisionModel(
                "No text in Gemini response".to_string(),
            ));
        }
        Ok(text)
    }
}

// ============================================
// Labeled-line extraction
// ============================================

lazy_static::lazy_static! {
    static ref NAME_LINE: Regex = Regex::new(r"(?i)Name:\s*([^\n]+)").expect("valid regex");
    static ref PURPOSE_LINE: Regex = Regex::new(r"(?i)Purpose:\s*([^\n]+)").expect("valid regex");
    static ref DOSAGE_LINE: Regex = Regex::new(r"(?i)Dosage:\s*([^\n]+)").expect("valid regex");
    static ref WARNINGS_LINE: Regex = Regex::new(r"(?i)Warnings:\s*([^\n]+)").expect("valid regex");
}

fn labeled_value(regex: &Regex, text: &str) -> Option<String> {
    regex
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Structured fields from the model's answer. Without a `Name:` line there is nothing.
pub fn extract_medication_info(text: &str) -> Option<MedicationInfo> {
    let name = labeled_value(&NAME_LINE, text)?;
    Some(MedicationInfo {
        name,
        purpose: labeled_value(&PURPOSE_LINE, text),
        dosage: labeled_value(&DOSAGE_LINE, text),
        warnings: labeled_value(&WARNINGS_LINE, text),
        interactions: None,
        side_effects: None,
    })
}

// ============================================
// Analyzer
// ============================================

/// Outcome of an image analysis, ready to merge into a chat response.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReply {
    pub response: String,
    pub medication_info: Option<MedicationInfo>,
    pub confidence: f64,
    pub sources: Vec<String>,
}

impl AnalysisReply {
    fn failed(e: &MediBotError) -> Self {
        Self {
            response: format!(
                "❌ I couldn't analyze the image. Please ensure it's a clear photo of medication packaging. Error: {e}"
            ),
            medication_info: None,
            confidence: 0.0,
            sources: Vec::new(),
        }
    }
}

pub struct ImageAnalyzer {
    model: Arc<dyn VisionModel>,
}

impl ImageAnalyzer {
    pub fn new(model: Arc<dyn VisionModel>) -> Self {
        Self { model }
    }

    /// Analyze a medication photo.
    ///
    /// Decode and model failures are turned into an apology reply. `Err` is only returned when
    /// the decoding task itself dies.
    pub async fn analyze(
        &self,
        image_data: &str,
        user_message: &str,
    ) -> Result<AnalysisReply, MediBotError> {
        let owned = image_data.to_string();
        let decoded = tokio::task::spawn_blocking(move || decode_image(&owned))
            .await
            .map_err(|e| MediBotError::Internal(format!("image decoding task failed: {e}")))?;

        let image = match decoded {
            Ok(image) => image,
            Err(e) => {
                error!("Image analysis error: {e}");
                return Ok(AnalysisReply::failed(&e));
            }
        };

        let prompt = build_prompt(user_message);
        let text = match self.model.describe_image(&prompt, &image).await {
            Ok(text) => text,
            Err(e) => {
                error!("Image analysis error: {e}");
                return Ok(AnalysisReply::failed(&e));
            }
        };

        let medication_info = extract_medication_info(&text);
        info!(
            "Image analysis complete, structured info extracted: {}",
            medication_info.is_some()
        );

        Ok(AnalysisReply {
            response: text,
            medication_info,
            confidence: IMAGE_ANALYSIS_CONFIDENCE,
            sources: vec![IMAGE_ANALYSIS_SOURCE.to_string()],
        })
    }
}
