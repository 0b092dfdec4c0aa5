// src/analyze/fallback.rs
//! Fixed payloads used in demo mode and when oracle output is unusable.

use super::types::{AnalysisResult, ComponentAnalysis, ComponentCategory, SuggestionSet, Suggestions};

pub const UNKNOWN_CATEGORY_API_ERROR: &str = "Unknown (API Error)";
pub const UNKNOWN_CATEGORY_DEMO: &str = "Unknown (Demo Mode)";
pub const UNKNOWN_CATEGORY: &str = "Unknown";

pub const DEMO_SOURCE: &str = "Demo Data";
pub const DEMO_CATEGORY: &str = "E-commerce";
pub const DEMO_SCORE: f64 = 65.5;
pub const IMAGE_DEMO_SOURCE: &str = "Image input (Demo Mode)";
pub const IMAGE_DEMO_SCORE: f64 = 68.5;
pub const IMAGE_ERROR_SOURCE: &str = "Image input (Error Fallback)";
pub const IMAGE_ERROR_CATEGORY: &str = "Website";
pub const NEUTRAL_SCORE: f64 = 50.0;

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// E-commerce observations shared by both demo payloads.
pub fn demo_analysis() -> ComponentAnalysis {
    ComponentAnalysis::from_fn(|c| match c {
        ComponentCategory::Cta => owned(&[
            "Multiple CTAs are present but lack visual distinction",
            "The primary 'Buy Now' CTA is not visually prominent enough",
            "CTAs use generic wording rather than action-oriented text",
        ]),
        ComponentCategory::VisualHierarchy => owned(&[
            "Product images are well displayed but lack consistent sizing",
            "Important information like price and availability is not emphasized enough",
            "Navigation elements compete with product content for attention",
        ]),
        ComponentCategory::CopyEffectiveness => owned(&[
            "Product descriptions are too technical and lack benefit-focused language",
            "Headers don't clearly communicate unique value propositions",
            "Too much text without proper formatting makes content hard to scan",
        ]),
        ComponentCategory::TrustSignals => owned(&[
            "Customer reviews are present but not prominently displayed",
            "Missing trust badges and security indicators",
            "Return policy and guarantees are buried in footer text",
        ]),
    })
}

/// E-commerce suggestions shared by both demo payloads.
pub fn demo_suggestions() -> SuggestionSet {
    SuggestionSet::from_fn(|c| match c {
        ComponentCategory::Cta => Suggestions::new(
            [
                "Redesign primary CTA with contrasting colors and increased size",
                "Replace generic CTA text with specific action-oriented phrases",
            ],
            [
                "Reduce the number of competing CTAs on each page",
                "Add hover effects to make CTAs more interactive",
            ],
        ),
        ComponentCategory::VisualHierarchy => Suggestions::new(
            [
                "Standardize product image sizes and quality across the site",
                "Use typography and color to emphasize key product information",
            ],
            [
                "Simplify navigation to reduce competition with product content",
                "Add more whitespace to improve content scannability",
            ],
        ),
        ComponentCategory::CopyEffectiveness => Suggestions::new(
            [
                "Rewrite product descriptions to focus on benefits rather than specifications",
                "Create compelling headers that highlight unique selling points",
            ],
            [
                "Break up text blocks with bullet points and subheadings",
                "Add customer-centric language that addresses pain points",
            ],
        ),
        ComponentCategory::TrustSignals => Suggestions::new(
            [
                "Add security badges and payment icons near checkout CTAs",
                "Feature customer reviews more prominently on product pages",
            ],
            [
                "Create a dedicated guarantees section above the footer",
                "Add social proof elements like 'X customers purchased this week'",
            ],
        ),
    })
}

/// Payload of `/demo-data` and of text/URL requests in demo mode.
pub fn demo_result() -> AnalysisResult {
    AnalysisResult {
        source: DEMO_SOURCE.to_string(),
        category: DEMO_CATEGORY.to_string(),
        analysis: demo_analysis(),
        suggestions: demo_suggestions(),
        website_score: Some(DEMO_SCORE),
        demo: None,
        error: None,
    }
}

/// Payload of image requests in demo mode.
pub fn image_demo_result() -> AnalysisResult {
    AnalysisResult {
        source: IMAGE_DEMO_SOURCE.to_string(),
        website_score: Some(IMAGE_DEMO_SCORE),
        demo: Some(true),
        ..demo_result()
    }
}

/// Payload of image requests that failed before the oracle could be consulted.
pub fn image_error_result(error: impl Into<String>) -> AnalysisResult {
    AnalysisResult {
        source: IMAGE_ERROR_SOURCE.to_string(),
        category: IMAGE_ERROR_CATEGORY.to_string(),
        analysis: ComponentAnalysis::from_fn(|c| {
            vec![format!("Unable to analyze {} from image due to API error", c.label())]
        }),
        suggestions: SuggestionSet::from_fn(|c| match c {
            ComponentCategory::Cta => Suggestions::new(
                ["Add clear call-to-action buttons", "Make CTAs visually distinct"],
                ["Use action-oriented text in CTAs"],
            ),
            ComponentCategory::VisualHierarchy => Suggestions::new(
                ["Improve content organization", "Use consistent visual elements"],
                ["Add proper spacing between elements"],
            ),
            ComponentCategory::CopyEffectiveness => Suggestions::new(
                ["Simplify and clarify messaging", "Focus on benefits"],
                ["Use short, scannable content"],
            ),
            ComponentCategory::TrustSignals => Suggestions::new(
                ["Add testimonials or reviews", "Display trust badges"],
                ["Make security information visible"],
            ),
        }),
        website_score: Some(NEUTRAL_SCORE),
        demo: Some(true),
        error: Some(error.into()),
    }
}

/// Generic observations returned by the component stage without an oracle.
pub fn stage_demo_components() -> ComponentAnalysis {
    ComponentAnalysis::from_fn(|c| match c {
        ComponentCategory::Cta => owned(&[
            "Multiple CTAs are present but lack visual distinction",
            "The primary CTA is not visually prominent enough",
            "CTAs use generic wording rather than action-oriented text",
        ]),
        ComponentCategory::VisualHierarchy => owned(&[
            "Content lacks clear visual hierarchy",
            "Important information is not emphasized enough",
            "Layout elements compete for attention",
        ]),
        ComponentCategory::CopyEffectiveness => owned(&[
            "Content is too technical and lacks benefit-focused language",
            "Headers don't clearly communicate value propositions",
            "Too much text without proper formatting makes content hard to scan",
        ]),
        ComponentCategory::TrustSignals => owned(&[
            "Trust indicators are not prominently displayed",
            "Missing trust badges and security indicators",
            "Social proof elements are insufficient",
        ]),
    })
}

/// Generic suggestions returned by the suggestion stage without an oracle.
pub fn stage_demo_suggestions() -> SuggestionSet {
    let mut s = demo_suggestions();
    s.visual_hierarchy = Suggestions::new(
        [
            "Establish clear visual hierarchy with size, color, and spacing",
            "Use typography and color to emphasize key information",
        ],
        [
            "Simplify layout to reduce visual competition",
            "Add more whitespace to improve content scannability",
        ],
    );
    s.copy_effectiveness = Suggestions::new(
        [
            "Focus content on benefits rather than technical specifications",
            "Create compelling headers that highlight unique selling points",
        ],
        [
            "Break up text blocks with bullet points and subheadings",
            "Add customer-centric language that addresses pain points",
        ],
    );
    s.trust_signals = Suggestions::new(
        [
            "Add security badges and verification icons in visible locations",
            "Feature testimonials or reviews more prominently",
        ],
        [
            "Display guarantees and policies more visibly",
            "Add social proof elements throughout the site",
        ],
    );
    s
}

/// Component stage: the oracle call itself failed.
pub fn components_unavailable() -> ComponentAnalysis {
    ComponentAnalysis::from_fn(|c| vec![format!("Error analyzing {}: API unavailable", c.label())])
}

/// Component stage: oracle text could not be recovered as JSON.
pub fn components_unparsed(from_image: bool) -> ComponentAnalysis {
    let suffix = if from_image { " from image" } else { "" };
    ComponentAnalysis::from_fn(|c| vec![format!("Unable to analyze {}{suffix}", c.label())])
}

/// Suggestion stage: oracle failed or returned unusable text.
pub fn suggestions_fallback() -> SuggestionSet {
    SuggestionSet::from_fn(|c| match c {
        ComponentCategory::Cta => Suggestions::new(
            ["Improve CTA visibility", "Make CTA messaging more compelling"],
            ["Test different CTA colors"],
        ),
        ComponentCategory::VisualHierarchy => Suggestions::new(
            ["Improve content organization", "Enhance key element visibility"],
            ["Add more whitespace between sections"],
        ),
        ComponentCategory::CopyEffectiveness => Suggestions::new(
            ["Clarify value proposition", "Make headlines more compelling"],
            ["Simplify complex sentences"],
        ),
        ComponentCategory::TrustSignals => Suggestions::new(
            ["Add customer testimonials", "Display security badges"],
            ["Include company credentials or awards"],
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_payload_shape() {
        let r = demo_result();
        assert_eq!(r.category, "E-commerce");
        assert_eq!(r.website_score, Some(65.5));
        assert!(r.demo.is_none());
        for c in ComponentCategory::ALL {
            assert_eq!(r.analysis.get(c).observations.len(), 3);
            assert_eq!(r.suggestions.get(c).high_priority.len(), 2);
        }
    }

    #[test]
    fn image_demo_differs_only_in_source_score_and_flag() {
        let img = image_demo_result();
        let txt = demo_result();
        assert_eq!(img.source, IMAGE_DEMO_SOURCE);
        assert_eq!(img.website_score, Some(68.5));
        assert_eq!(img.demo, Some(true));
        assert_eq!(img.analysis, txt.analysis);
    }

    #[test]
    fn unparsed_components_name_every_category() {
        let a = components_unparsed(true);
        assert_eq!(a.cta.observations, vec!["Unable to analyze CTAs from image"]);
        assert_eq!(
            components_unparsed(false).trust_signals.observations,
            vec!["Unable to analyze trust signals"]
        );
        assert_eq!(
            components_unavailable().copy_effectiveness.observations,
            vec!["Error analyzing copy: API unavailable"]
        );
    }

    #[test]
    fn image_error_carries_message() {
        let r = image_error_result("image payload is empty");
        assert_eq!(r.error.as_deref(), Some("image payload is empty"));
        assert_eq!(r.website_score, Some(50.0));
        assert_eq!(r.category, "Website");
    }
}
