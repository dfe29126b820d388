// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Canned answers for text-only messages, built from the static knowledge tables.

use super::knowledge::{DrugInteraction, KnowledgeBase, SymptomEntry};

pub const KNOWLEDGE_BASE_SOURCE: &str = "MediBot Knowledge Base";
pub const INTERACTION_SOURCE: &str = "Drug Interaction Database";
pub const GENERAL_SOURCE: &str = "MediBot General Response";

pub const SYMPTOM_CONFIDENCE: f64 = 0.85;
pub const INTERACTION_CONFIDENCE: f64 = 0.9;
pub const GENERAL_CONFIDENCE: f64 = 0.6;

/// Appended to every chat response.
pub const MEDICAL_DISCLAIMER: &str = "\n\n⚠️ **MEDICAL DISCLAIMER:** This information is for educational purposes only and should not replace professional medical advice. Always consult with a qualified healthcare provider for diagnosis and treatment.";

/// Answer produced for a text message.
#[derive(Debug, Clone, PartialEq)]
pub struct TextReply {
    pub response: String,
    pub confidence: f64,
    pub sources: Vec<String>,
}

/// Match `message` against the symptom table, then the drug table, and fall back to a
/// general answer. Table order decides ties.
pub fn respond(knowledge: &KnowledgeBase, message: &str) -> TextReply {
    let lowered = message.to_lowercase();

    if let Some(symptom) = knowledge.find_symptom(&lowered) {
        return TextReply {
            response: symptom_response(symptom),
            confidence: SYMPTOM_CONFIDENCE,
            sources: vec![KNOWLEDGE_BASE_SOURCE.to_string()],
        };
    }

    if let Some(drug) = knowledge.find_drug(&lowered) {
        return TextReply {
            response: interaction_response(drug),
            confidence: INTERACTION_CONFIDENCE,
            sources: vec![INTERACTION_SOURCE.to_string()],
        };
    }

    TextReply {
        response: general_response(message),
        confidence: GENERAL_CONFIDENCE,
        sources: vec![GENERAL_SOURCE.to_string()],
    }
}

pub fn add_disclaimer(text: &str) -> String {
    format!("{text}{MEDICAL_DISCLAIMER}")
}

fn symptom_response(symptom: &SymptomEntry) -> String {
    format!(
        r#"
**{title} Information**

🔍 **Common Causes:**
{causes}

💊 **Over-the-Counter Options:**
{otc}

🏠 **Home Remedies:**
{remedies}

🚨 **Seek Medical Attention If:**
{red_flags}

**Remember:** This is general information only. Individual cases may vary.
"#,
        title = title_case(&symptom.name),
        causes = format_list(&symptom.causes),
        otc = format_list(&symptom.otc_treatments),
        remedies = format_list(&symptom.home_remedies),
        red_flags = format_list(&symptom.red_flags),
    )
}

fn interaction_response(drug: &DrugInteraction) -> String {
    format!(
        r#"
**{title} - Drug Interaction Warning**

⚠️ **May interact with:**
{interactions}

**Important:** Always inform your healthcare provider about all medications you're taking, including over-the-counter drugs and supplements.
"#,
        title = title_case(&drug.drug),
        interactions = format_list(&drug.interacts_with),
    )
}

fn general_response(message: &str) -> String {
    format!(
        r#"
🤖 **I received your query:** "{message}"

I can help you with:
- 📷 **Image Analysis** - Upload photos of medication packaging
- 💊 **Drug Information** - Details about medications and interactions
- 🩺 **Symptom Guidance** - Information about common health concerns
- ⚕️ **OTC Recommendations** - Over-the-counter treatment options

Please provide more specific information or upload an image for better assistance.
"#
    )
}

/// One bullet per item, each title-cased.
fn format_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("• {}", title_case(item)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Upper-case the first letter of every run of letters and lower-case the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
