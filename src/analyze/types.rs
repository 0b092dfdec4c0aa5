// src/analyze/types.rs
//! Response model: four fixed component categories, each with observations and suggestions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ParseError;

/// The four fixed analysis dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentCategory {
    Cta,
    VisualHierarchy,
    CopyEffectiveness,
    TrustSignals,
}

impl ComponentCategory {
    pub const ALL: [ComponentCategory; 4] = [
        Self::Cta,
        Self::VisualHierarchy,
        Self::CopyEffectiveness,
        Self::TrustSignals,
    ];

    /// JSON key used in requests to and responses from the oracle.
    pub fn key(self) -> &'static str {
        match self {
            Self::Cta => "cta",
            Self::VisualHierarchy => "visual_hierarchy",
            Self::CopyEffectiveness => "copy_effectiveness",
            Self::TrustSignals => "trust_signals",
        }
    }

    /// Short human label used in fallback observations.
    pub fn label(self) -> &'static str {
        match self {
            Self::Cta => "CTAs",
            Self::VisualHierarchy => "visual hierarchy",
            Self::CopyEffectiveness => "copy",
            Self::TrustSignals => "trust signals",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observations {
    pub observations: Vec<String>,
}

/// Observation lists per category, in oracle order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentAnalysis {
    pub cta: Observations,
    pub visual_hierarchy: Observations,
    pub copy_effectiveness: Observations,
    pub trust_signals: Observations,
}

impl ComponentAnalysis {
    pub fn from_fn(mut f: impl FnMut(ComponentCategory) -> Vec<String>) -> Self {
        Self {
            cta: Observations {
                observations: f(ComponentCategory::Cta),
            },
            visual_hierarchy: Observations {
                observations: f(ComponentCategory::VisualHierarchy),
            },
            copy_effectiveness: Observations {
                observations: f(ComponentCategory::CopyEffectiveness),
            },
            trust_signals: Observations {
                observations: f(ComponentCategory::TrustSignals),
            },
        }
    }

    pub fn get(&self, category: ComponentCategory) -> &Observations {
        match category {
            ComponentCategory::Cta => &self.cta,
            ComponentCategory::VisualHierarchy => &self.visual_hierarchy,
            ComponentCategory::CopyEffectiveness => &self.copy_effectiveness,
            ComponentCategory::TrustSignals => &self.trust_signals,
        }
    }

    /// Every observation across all categories.
    pub fn all_observations(&self) -> impl Iterator<Item = &str> {
        ComponentCategory::ALL
            .into_iter()
            .flat_map(move |c| self.get(c).observations.iter().map(String::as_str))
    }

    /// Lenient conversion of recovered oracle JSON.
    ///
    /// A missing category yields an empty list. `{"cta": [...]}` is accepted as well as
    /// `{"cta": {"observations": [...]}}`.
    pub fn from_value(v: &Value) -> Result<Self, ParseError> {
        let obj = v.as_object().ok_or(ParseError::NotAnObject)?;
        Ok(Self::from_fn(|c| {
            let section = obj.get(c.key());
            let list = match section {
                Some(Value::Object(inner)) => inner.get("observations"),
                other => other,
            };
            coerce_string_list(list)
        }))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestions {
    pub high_priority: Vec<String>,
    pub additional: Vec<String>,
}

impl Suggestions {
    pub fn new<S: Into<String>>(
        high_priority: impl IntoIterator<Item = S>,
        additional: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            high_priority: high_priority.into_iter().map(Into::into).collect(),
            additional: additional.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionSet {
    pub cta: Suggestions,
    pub visual_hierarchy: Suggestions,
    pub copy_effectiveness: Suggestions,
    pub trust_signals: Suggestions,
}

impl SuggestionSet {
    pub fn from_fn(mut f: impl FnMut(ComponentCategory) -> Suggestions) -> Self {
        Self {
            cta: f(ComponentCategory::Cta),
            visual_hierarchy: f(ComponentCategory::VisualHierarchy),
            copy_effectiveness: f(ComponentCategory::CopyEffectiveness),
            trust_signals: f(ComponentCategory::TrustSignals),
        }
    }

    pub fn get(&self, category: ComponentCategory) -> &Suggestions {
        match category {
            ComponentCategory::Cta => &self.cta,
            ComponentCategory::VisualHierarchy => &self.visual_hierarchy,
            ComponentCategory::CopyEffectiveness => &self.copy_effectiveness,
            ComponentCategory::TrustSignals => &self.trust_signals,
        }
    }

    /// Lenient conversion of recovered oracle JSON; every item ends up a plain string.
    pub fn from_value(v: &Value) -> Result<Self, ParseError> {
        let obj = v.as_object().ok_or(ParseError::NotAnObject)?;
        Ok(Self::from_fn(|c| match obj.get(c.key()) {
            Some(Value::Object(inner)) => Suggestions {
                high_priority: coerce_string_list(inner.get("high_priority")),
                additional: coerce_string_list(inner.get("additional")),
            },
            _ => Suggestions::default(),
        }))
    }
}

/// Aggregate returned by `/components` and `/demo-data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub source: String,
    pub category: String,
    pub analysis: ComponentAnalysis,
    pub suggestions: SuggestionSet,
    pub website_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Strings pass through; any other JSON value becomes its compact JSON text.
pub fn coerce_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn coerce_string_list(v: Option<&Value>) -> Vec<String> {
    match v {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(coerce_to_string).collect(),
        Some(single) => vec![coerce_to_string(single)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn suggestions_coerce_non_string_items() {
        let v = json!({
            "cta": {
                "high_priority": ["Bigger button", {"text": "Use verbs"}],
                "additional": [3, true, null]
            }
        });
        let s = SuggestionSet::from_value(&v).unwrap();
        assert_eq!(
            s.cta.high_priority,
            vec![
                "Bigger button".to_string(),
                r#"{"text":"Use verbs"}"#.to_string()
            ]
        );
        assert_eq!(s.cta.additional, vec!["3", "true", "null"]);
        assert_eq!(s.trust_signals, Suggestions::default());
    }

    #[test]
    fn components_accept_both_shapes_and_missing_keys() {
        let v = json!({
            "cta": {"observations": ["ok"]},
            "visual_hierarchy": ["flat list"],
        });
        let a = ComponentAnalysis::from_value(&v).unwrap();
        assert_eq!(a.cta.observations, vec!["ok"]);
        assert_eq!(a.visual_hierarchy.observations, vec!["flat list"]);
        assert!(a.copy_effectiveness.observations.is_empty());
        assert_eq!(a.all_observations().count(), 2);
    }

    #[test]
    fn non_object_is_rejected() {
        assert_eq!(
            ComponentAnalysis::from_value(&json!(["cta"])).unwrap_err(),
            ParseError::NotAnObject
        );
        assert_eq!(
            SuggestionSet::from_value(&json!("text")).unwrap_err(),
            ParseError::NotAnObject
        );
    }

    #[test]
    fn result_omits_absent_flags() {
        let r = AnalysisResult {
            source: "HTML input".into(),
            category: "Blog".into(),
            analysis: ComponentAnalysis::default(),
            suggestions: SuggestionSet::default(),
            website_score: None,
            demo: None,
            error: None,
        };
        let v = serde_json::to_value(&r).unwrap();
        assert!(v.get("demo").is_none());
        assert!(v.get("error").is_none());
        assert!(v["website_score"].is_null());
    }
}
