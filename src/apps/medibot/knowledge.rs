// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::MediBotError;
use serde::{Deserialize, Serialize};

const EMBEDDED_KNOWLEDGE_BASE: &str = include_str!("knowledge_base.yaml");

/// Guidance for one symptom keyword.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymptomEntry {
    /// Lowercase keyword matched against messages.
    pub name: String,
    pub causes: Vec<String>,
    pub otc_treatments: Vec<String>,
    pub home_remedies: Vec<String>,
    pub red_flags: Vec<String>,
}

/// Drugs known to interact with `drug`. Pairs appear from both sides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrugInteraction {
    pub drug: String,
    pub interacts_with: Vec<String>,
}

/// Static symptom and drug interaction tables, in match order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "KnowledgeBaseRaw")]
pub struct KnowledgeBase {
    symptoms: Vec<SymptomEntry>,
    drug_interactions: Vec<DrugInteraction>,
}

#[derive(Debug, Deserialize)]
struct KnowledgeBaseRaw {
    symptoms: Vec<SymptomEntry>,
    drug_interactions: Vec<DrugInteraction>,
}

impl TryFrom<KnowledgeBaseRaw> for KnowledgeBase {
    type Error = String;

    fn try_from(raw: KnowledgeBaseRaw) -> Result<Self, Self::Error> {
        let keys = raw
            .symptoms
            .iter()
            .map(|s| s.name.as_str())
            .chain(raw.drug_interactions.iter().map(|d| d.drug.as_str()));
        for key in keys {
            if key.is_empty() || key != key.to_lowercase() {
                return Err(format!("table keys must be non-empty and lowercase: {key:?}"));
            }
        }

        Ok(KnowledgeBase {
            symptoms: raw.symptoms,
            drug_interactions: raw.drug_interactions,
        })
    }
}

impl KnowledgeBase {
    /// Load the tables compiled into the binary.
    pub fn embedded() -> Result<Self, MediBotError> {
        Self::from_yaml(EMBEDDED_KNOWLEDGE_BASE)
    }

    pub fn from_yaml(source: &str) -> Result<Self, MediBotError> {
        serde_yaml::from_str(source)
            .map_err(|e| MediBotError::InvalidConfig(format!("knowledge base: {e}")))
    }

    pub fn symptoms(&self) -> &[SymptomEntry] {
        &self.symptoms
    }

    pub fn drug_interactions(&self) -> &[DrugInteraction] {
        &self.drug_interactions
    }

    /// First symptom, in table order, whose keyword is contained in `lowered`.
    pub fn find_symptom(&self, lowered: &str) -> Option<&SymptomEntry> {
        self.symptoms.iter().find(|s| lowered.contains(s.name.as_str()))
    }

    /// First drug, in table order, whose name is contained in `lowered`.
    pub fn find_drug(&self, lowered: &str) -> Option<&DrugInteraction> {
        self.drug_interactions
            .iter()
            .find(|d| lowered.contains(d.drug.as_str()))
    }
}
