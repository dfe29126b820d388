use super::types::MedicationInfo;
use crate::MediBotError;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info, warn};

const MAX_LIST_ITEMS: usize = 5;

/// Subset of an openFDA drug label result. Every section is an array of strings.
#[derive(Debug, Default, Deserialize)]
struct LabelResult {
    #[serde(default)]
    purpose: Vec<String>,
    #[serde(default)]
    warnings: Vec<String>,
    #[serde(default)]
    dosage_and_administration: Vec<String>,
    #[serde(default)]
    drug_interactions: Vec<String>,
    #[serde(default)]
    adverse_reactions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LabelSearchResponse {
    #[serde(default)]
    results: Vec<LabelResult>,
}

/// Client for the openFDA drug label search endpoint.
#[derive(Debug, Clone)]
pub struct LabelClient {
    client: reqwest::Client,
    url: String,
}

impl LabelClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, MediBotError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MediBotError::InvalidConfig(format!("openFDA client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Label facts for `drug_name`, matched by brand or generic name.
    ///
    /// Never fails: transport errors, non-200 answers, bad payloads and empty result sets
    /// are logged and reported as `None`.
    pub async fn lookup(&self, drug_name: &str) -> Option<MedicationInfo> {
        match self.fetch(drug_name).await {
            Ok(Some(result)) => Some(to_medication_info(drug_name, result)),
            Ok(None) => {
                info!("No openFDA label found for {drug_name:?}");
                None
            }
            Err(e) => {
                error!("FDA API error: {e}");
                None
            }
        }
    }

    async fn fetch(&self, drug_name: &str) -> Result<Option<LabelResult>, MediBotError> {
        let search = format!(
            r#"openfda.brand_name:"{drug_name}" OR openfda.generic_name:"{drug_name}""#
        );

        info!("Querying openFDA label for {drug_name:?}");

        let response = self
            .client
            .get(&self.url)
            .query(&[("search", search.as_str()), ("limit", "1")])
            .send()
            .await
            .map_err(|e| MediBotError::LabelLookup(format!("request failed: {e}")))?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!("FDA API returned status {}", status.as_u16());
            return Ok(None);
        }

        let body: LabelSearchResponse = response
            .json()
            .await
            .map_err(|e| MediBotError::LabelLookup(format!("malformed payload: {e}")))?;

        Ok(body.results.into_iter().next())
    }
}

fn to_medication_info(drug_name: &str, result: LabelResult) -> MedicationInfo {
    MedicationInfo {
        name: drug_name.to_string(),
        purpose: result.purpose.into_iter().next(),
        warnings: result.warnings.into_iter().next(),
        dosage: result.dosage_and_administration.into_iter().next(),
        interactions: Some(
            result
                .drug_interactions
                .into_iter()
                .take(MAX_LIST_ITEMS)
                .collect(),
        ),
        side_effects: Some(
            result
                .adverse_reactions
                .into_iter()
                .take(MAX_LIST_ITEMS)
                .collect(),
        ),
    }
}
