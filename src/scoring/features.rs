//! Structural features of a page, the regression model's input.

use scraper::{Html, Node, Selector};
use serde::{Deserialize, Serialize};

pub const FEATURE_COUNT: usize = 5;

const TESTIMONIAL_CUES: [&str; 2] = ["testimonial", "review"];

/// `[cta_count, hierarchy_score, paragraph_count, list_count, testimonial_flag]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreFeatures {
    pub cta_count: u32,
    /// `3*h1 + 2*h2 + h3`
    pub hierarchy_score: u32,
    pub paragraph_count: u32,
    pub list_count: u32,
    pub testimonial: bool,
}

impl ScoreFeatures {
    pub fn to_vector(self) -> [f64; FEATURE_COUNT] {
        [
            f64::from(self.cta_count),
            f64::from(self.hierarchy_score),
            f64::from(self.paragraph_count),
            f64::from(self.list_count),
            if self.testimonial { 1.0 } else { 0.0 },
        ]
    }
}

/// Zero-pad or truncate an arbitrary-length vector to exactly five features.
/// Non-finite entries become zero.
pub fn normalize_vector(raw: &[f64]) -> [f64; FEATURE_COUNT] {
    let mut out = [0.0; FEATURE_COUNT];
    for (slot, v) in out.iter_mut().zip(raw.iter()) {
        if v.is_finite() {
            *slot = *v;
        }
    }
    out
}

pub fn extract_features(html: &str) -> ScoreFeatures {
    let doc = Html::parse_document(html);
    let count = |css: &str| {
        let sel = Selector::parse(css).expect("static selector");
        doc.select(&sel).count() as u32
    };

    let hierarchy_score = 3 * count("h1") + 2 * count("h2") + count("h3");

    let testimonial = doc.tree.root().descendants().any(|node| match node.value() {
        Node::Text(text) => {
            let lower = text.to_lowercase();
            TESTIMONIAL_CUES.iter().any(|cue| lower.contains(cue))
        }
        _ => false,
    });

    ScoreFeatures {
        cta_count: count("button, a"),
        hierarchy_score,
        paragraph_count: count("p"),
        list_count: count("ul, ol"),
        testimonial,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_structure() {
        let html = r#"
            <h1>Title</h1><h2>A</h2><h2>B</h2><h3>c</h3>
            <p>one</p><p>two</p>
            <ul><li>x</li></ul><ol><li>y</li></ol>
            <a href="/buy">Buy</a><button>Go</button><a href="/more">More</a>
        "#;
        let f = extract_features(html);
        assert_eq!(f.cta_count, 3);
        assert_eq!(f.hierarchy_score, 3 + 4 + 1);
        assert_eq!(f.paragraph_count, 2);
        assert_eq!(f.list_count, 2);
        assert!(!f.testimonial);
    }

    #[test]
    fn testimonial_flag_is_case_insensitive() {
        assert!(extract_features("<p>Great TESTIMONIALS here</p>").testimonial);
        assert!(extract_features("<div>Read our Reviews</div>").testimonial);
        assert!(!extract_features("<p>Nothing to see</p>").testimonial);
    }

    #[test]
    fn empty_or_garbage_html_yields_zeros() {
        for html in ["", "<<<>>>", "plain text only"] {
            let v = extract_features(html).to_vector();
            assert_eq!(v.len(), FEATURE_COUNT);
            assert!(v.iter().all(|x| *x >= 0.0));
            assert_eq!(v[4], 0.0);
        }
    }

    #[test]
    fn vectors_are_padded_or_truncated() {
        assert_eq!(normalize_vector(&[1.0, 2.0]), [1.0, 2.0, 0.0, 0.0, 0.0]);
        assert_eq!(
            normalize_vector(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]),
            [1.0, 2.0, 3.0, 4.0, 5.0]
        );
        assert_eq!(normalize_vector(&[]), [0.0; 5]);
    }
}
