// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

pub mod endpoints;
pub mod extract;
pub mod knowledge;
pub mod openfda;
pub mod responder;
pub mod types;
pub mod vision;

pub use endpoints::{chat, router, serve};
pub use extract::extract_drug_name;
pub use knowledge::KnowledgeBase;
pub use openfda::LabelClient;
pub use types::*;
pub use vision::{GeminiClient, ImageAnalyzer, VisionModel};

use crate::{Config, MediBotError};
use std::sync::Arc;
use tracing::info;

/// Provenance label added when openFDA enriches a response.
pub const FDA_SOURCE: &str = "FDA Database";

/// The chat pipeline. One instance serves every request; it holds no per-request state.
pub struct MediBot {
    knowledge: KnowledgeBase,
    labels: LabelClient,
    analyzer: ImageAnalyzer,
}

impl MediBot {
    pub fn new(knowledge: KnowledgeBase, labels: LabelClient, vision: Arc<dyn VisionModel>) -> Self {
        Self {
            knowledge,
            labels,
            analyzer: ImageAnalyzer::new(vision),
        }
    }

    /// Build the pipeline with the embedded tables, openFDA and Gemini as configured.
    pub fn from_config(config: &Config) -> Result<Self, MediBotError> {
        let knowledge = KnowledgeBase::embedded()?;
        let labels = LabelClient::new(config.openfda_label_url.clone(), config.openfda_timeout)?;
        let gemini = GeminiClient::new(
            config.google_api_key.clone(),
            config.gemini_model.clone(),
            config.gemini_base_url.clone(),
            config.gemini_timeout,
        )?;
        Ok(Self::new(knowledge, labels, Arc::new(gemini)))
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Answer one chat request.
    ///
    /// Images go to the vision model, text goes to the knowledge tables; either path may be
    /// enriched from openFDA. The disclaimer is always appended. Failures of the external
    /// services degrade the answer instead of failing the request.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, MediBotError> {
        let mut reply = ChatResponse::started_now();

        if let Some(image_data) = request.image() {
            info!("Analyzing uploaded image");
            let analysis = self.analyzer.analyze(image_data, &request.message).await?;
            reply.response = analysis.response;
            reply.medication_info = analysis.medication_info;
            reply.confidence = analysis.confidence;
            reply.sources = analysis.sources;

            let extracted_name = reply.medication_info.as_ref().map(|info| info.name.clone());
            if let Some(name) = extracted_name {
                if let Some(label) = self.labels.lookup(&name).await {
                    reply.medication_info = Some(label);
                    reply.sources.push(FDA_SOURCE.to_string());
                }
            }
        } else if !request.message.is_empty() {
            let text = responder::respond(&self.knowledge, &request.message);
            reply.response = text.response;
            reply.confidence = text.confidence;
            reply.sources = text.sources;

            if let Some(name) = extract_drug_name(&request.message) {
                if let Some(label) = self.labels.lookup(&name).await {
                    reply.medication_info = Some(label);
                    reply.sources.push(FDA_SOURCE.to_string());
                }
            }
        }

        reply.response = responder::add_disclaimer(&reply.response);
        Ok(reply)
    }
}
