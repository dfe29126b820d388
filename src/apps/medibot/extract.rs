// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use regex::Regex;
use tracing::debug;

/// Shapes of drug mentions recognised in free text, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrugMention {
    /// "Amoxicillin 500 mg"
    Milligrams,
    /// "Levothyroxine 100mcg"
    Micrograms,
    /// "Metformin tablet"
    Tablet,
    /// "Omeprazole capsule"
    Capsule,
}

impl DrugMention {
    pub const ORDERED: [DrugMention; 4] = [
        DrugMention::Milligrams,
        DrugMention::Micrograms,
        DrugMention::Tablet,
        DrugMention::Capsule,
    ];

    fn pattern(self) -> &'static str {
        match self {
            DrugMention::Milligrams => r"(?i)\b([A-Z][a-z]{3,})\s*\d+\s*mg\b",
            DrugMention::Micrograms => r"(?i)\b([A-Z][a-z]{3,})\s*\d+\s*mcg\b",
            DrugMention::Tablet => r"(?i)\b([A-Z][a-z]{3,})\s*tablet\b",
            DrugMention::Capsule => r"(?i)\b([A-Z][a-z]{3,})\s*capsule\b",
        }
    }
}

lazy_static::lazy_static! {
    /// Compiled rules, in `DrugMention::ORDERED` order.
    static ref DRUG_MENTION_RULES: Vec<(DrugMention, Regex)> = DrugMention::ORDERED
        .iter()
        .map(|mention| {
            let regex = Regex::new(mention.pattern()).expect("drug mention patterns are valid");
            (*mention, regex)
        })
        .collect();
}

/// Best-effort drug name from free text.
///
/// Rules are tried in order and the first rule with any match wins; its first match is
/// returned lower-cased.
pub fn extract_drug_name(text: &str) -> Option<String> {
    DRUG_MENTION_RULES.iter().find_map(|(mention, regex)| {
        let name = regex.captures(text)?.get(1)?.as_str().to_lowercase();
        debug!("Drug name {name:?} matched {mention:?} rule");
        Some(name)
    })
}
