// src/analyze/staged.rs
use std::fmt;

use crate::error::{OracleError, ParseError};

/// Why a stage produced canned content instead of oracle output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// No oracle configured for this process.
    Demo,
    Oracle(OracleError),
    Parse(ParseError),
}

impl FallbackReason {
    /// Low-cardinality label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Demo => "demo",
            Self::Oracle(_) => "oracle",
            Self::Parse(_) => "parse",
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Demo => f.write_str("demo mode"),
            Self::Oracle(e) => write!(f, "{e}"),
            Self::Parse(e) => write!(f, "{e}"),
        }
    }
}

/// Result of one oracle-facing stage: always carries a usable value.
#[derive(Debug, Clone, PartialEq)]
pub enum Staged<T> {
    Fresh(T),
    Fallback { value: T, reason: FallbackReason },
}

impl<T> Staged<T> {
    pub fn fallback(value: T, reason: FallbackReason) -> Self {
        Self::Fallback { value, reason }
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Fresh(v) | Self::Fallback { value: v, .. } => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Fresh(v) | Self::Fallback { value: v, .. } => v,
        }
    }

    pub fn reason(&self) -> Option<&FallbackReason> {
        match self {
            Self::Fresh(_) => None,
            Self::Fallback { reason, .. } => Some(reason),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.reason().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_keeps_value_and_reason() {
        let s = Staged::fallback("Unknown (API Error)", FallbackReason::Oracle(OracleError::Status(503)));
        assert!(s.is_fallback());
        assert_eq!(s.reason().map(FallbackReason::label), Some("oracle"));
        assert_eq!(*s.value(), "Unknown (API Error)");
        assert_eq!(s.into_value(), "Unknown (API Error)");
    }

    #[test]
    fn fresh_has_no_reason() {
        let s = Staged::Fresh(3);
        assert!(!s.is_fallback());
        assert_eq!(s.into_value(), 3);
    }
}
