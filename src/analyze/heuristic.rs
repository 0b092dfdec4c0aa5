// src/analyze/heuristic.rs
//! Keyword-sentiment score for screenshot analyses, where no HTML exists to score.
//!
//! score = clamp(50 + 30 * (positive / (positive + negative) - 0.5), 0, 100)
//! Negative cues are checked first; an observation counts at most once.

use super::types::ComponentAnalysis;

pub const NEGATIVE_CUES: [&str; 12] = [
    "missing",
    "lack",
    "no ",
    "poor",
    "weak",
    "confusing",
    "unclear",
    "ineffective",
    "absent",
    "could be",
    "should be",
    "not",
];

pub const POSITIVE_CUES: [&str; 9] = [
    "clear",
    "effective",
    "good",
    "strong",
    "well",
    "present",
    "prominent",
    "visible",
    "professional",
];

const SKIP_MARKER: &str = "unable to analyze";
const BASE: f64 = 50.0;
const SPAN: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
}

/// Classify one observation, or `None` when it carries no cue (or is a fallback line).
pub fn classify(observation: &str) -> Option<Tone> {
    let lower = observation.to_lowercase();
    if lower.contains(SKIP_MARKER) {
        return None;
    }
    if NEGATIVE_CUES.iter().any(|cue| lower.contains(cue)) {
        Some(Tone::Negative)
    } else if POSITIVE_CUES.iter().any(|cue| lower.contains(cue)) {
        Some(Tone::Positive)
    } else {
        None
    }
}

/// (positive, negative) counts over every observation.
pub fn tally(analysis: &ComponentAnalysis) -> (usize, usize) {
    analysis
        .all_observations()
        .filter_map(classify)
        .fold((0, 0), |(pos, neg), tone| match tone {
            Tone::Positive => (pos + 1, neg),
            Tone::Negative => (pos, neg + 1),
        })
}

pub fn image_score(analysis: &ComponentAnalysis) -> f64 {
    let (pos, neg) = tally(analysis);
    let informative = pos + neg;
    if informative == 0 {
        return BASE;
    }
    let ratio = pos as f64 / informative as f64;
    (BASE + SPAN * (ratio - 0.5)).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::types::ComponentCategory;

    fn analysis(lines: &[&str]) -> ComponentAnalysis {
        let lines: Vec<String> = lines.iter().map(|s| s.to_string()).collect();
        ComponentAnalysis::from_fn(|c| {
            if c == ComponentCategory::Cta {
                lines.clone()
            } else {
                Vec::new()
            }
        })
    }

    #[test]
    fn balanced_observations_score_midpoint() {
        let a = analysis(&[
            "The headline is clear",
            "Strong hero image",
            "Missing testimonials",
            "Weak footer links",
        ]);
        assert_eq!(tally(&a), (2, 2));
        assert!((image_score(&a) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn negative_cue_wins_over_positive() {
        // "not" and "clear" both appear; negative is checked first
        assert_eq!(classify("The CTA is not clear"), Some(Tone::Negative));
        assert_eq!(classify("Looks professional"), Some(Tone::Positive));
        assert_eq!(classify("A hero banner"), None);
    }

    #[test]
    fn fallback_lines_are_skipped() {
        let a = analysis(&["Unable to analyze CTAs from image", "Unable to analyze copy from image"]);
        assert_eq!(tally(&a), (0, 0));
        assert_eq!(image_score(&a), 50.0);
    }

    #[test]
    fn extremes_stay_within_band() {
        let all_pos = analysis(&["clear", "strong", "good"]);
        let all_neg = analysis(&["missing", "poor"]);
        assert!((image_score(&all_pos) - 65.0).abs() < 1e-9);
        assert!((image_score(&all_neg) - 35.0).abs() < 1e-9);
    }
}
