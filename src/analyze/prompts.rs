// src/analyze/prompts.rs
//! Prompt templates for the three oracle stages.

use crate::acquire::truncate_chars;

/// Characters of page text sent to the category stage.
pub const CATEGORY_TEXT_LIMIT: usize = 2000;
/// Characters of page text sent to the component stage.
pub const COMPONENTS_TEXT_LIMIT: usize = 3000;

const COMPONENTS_SCHEMA: &str = r#"{
    "cta": { "observations": [list of findings as simple strings] },
    "visual_hierarchy": { "observations": [list of findings as simple strings] },
    "copy_effectiveness": { "observations": [list of findings as simple strings] },
    "trust_signals": { "observations": [list of findings as simple strings] }
}"#;

const SUGGESTIONS_SCHEMA: &str = r#"{
    "cta": {
        "high_priority": [2 highest impact suggestions as simple strings],
        "additional": [remaining suggestions as simple strings]
    },
    "visual_hierarchy": {
        "high_priority": [2 highest impact suggestions as simple strings],
        "additional": [remaining suggestions as simple strings]
    },
    "copy_effectiveness": {
        "high_priority": [2 highest impact suggestions as simple strings],
        "additional": [remaining suggestions as simple strings]
    },
    "trust_signals": {
        "high_priority": [2 highest impact suggestions as simple strings],
        "additional": [remaining suggestions as simple strings]
    }
}"#;

const COMPONENTS_BRIEF: &str = "\
1. CTA (Call to Action): Identify all CTAs and evaluate their effectiveness.
2. Visual Hierarchy: Analyze how content is visually prioritized and structured.
3. Copy Effectiveness: Evaluate the quality, clarity and persuasiveness of the text.
4. Trust Signals: Identify elements that build trust (testimonials, certifications, etc).

For each category, provide detailed observations. If any component is missing, note this as well.";

pub fn category_from_text(text: &str) -> String {
    format!(
        "You are an expert web analyst. Identify the most likely category of this website.\n\n\
         Based on this website content, determine the category (e.g. e-commerce, blog, SaaS, portfolio, etc.):\n\n\
         {}\n\n\
         Return ONLY the category name, nothing else.",
        truncate_chars(text, CATEGORY_TEXT_LIMIT)
    )
}

pub fn category_from_image() -> String {
    "You are an expert web analyst. Identify the most likely category of this website screenshot \
     (e.g. e-commerce, blog, SaaS, portfolio, etc.). Return ONLY the category name, nothing else."
        .to_string()
}

pub fn components_from_text(text: &str, category: &str) -> String {
    format!(
        "You are an expert web analyst specializing in UX and conversion optimization.\n\n\
         Analyze this {category} website content and extract the following components:\n\n\
         {COMPONENTS_BRIEF}\n\n\
         Format your response as JSON with the following structure:\n{COMPONENTS_SCHEMA}\n\n\
         Website content:\n{}\n\n\
         Respond with ONLY the properly formatted JSON, nothing else. Each observation must be a simple string, not an object.",
        truncate_chars(text, COMPONENTS_TEXT_LIMIT)
    )
}

pub fn components_from_image(category: &str) -> String {
    format!(
        "You are an expert web analyst specializing in UX and conversion optimization.\n\n\
         Analyze this {category} website screenshot and extract the following components:\n\n\
         {COMPONENTS_BRIEF}\n\n\
         Format your response as JSON with the following structure:\n{COMPONENTS_SCHEMA}\n\n\
         Respond with ONLY the properly formatted JSON, nothing else. Each observation must be a simple string, not an object."
    )
}

pub fn suggestions(analysis_json: &str, category: &str) -> String {
    format!(
        "You are an expert conversion rate optimization consultant known for providing actionable suggestions.\n\n\
         Based on this analysis of a {category} website:\n\n\
         {analysis_json}\n\n\
         Generate specific, actionable improvement suggestions for each component (CTA, Visual Hierarchy, Copy Effectiveness, Trust Signals).\n\n\
         For each component:\n\
         1. Provide at least 3 specific suggestions\n\
         2. Rank each suggestion by impact potential (high, medium, low)\n\
         3. Mark the 2 highest impact suggestions for each component\n\n\
         Format your response as JSON with the following structure:\n{SUGGESTIONS_SCHEMA}\n\n\
         IMPORTANT: Each suggestion MUST be a simple string, not an object. Do not include impact ratings inside the arrays.\n\n\
         Respond with ONLY the properly formatted JSON, nothing else."
    )
}
