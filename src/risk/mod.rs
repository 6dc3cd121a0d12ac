//! Sensitive-access reachability and risk classification
//!
//! A node's risk level is derived from the hop length of the shortest path
//! that takes it to any sensitive node within the hop bound:
//!
//! | Shortest hops | Level    |
//! |---------------|----------|
//! | 0 or 1        | `HIGH`   |
//! | 2             | `MEDIUM` |
//! | 3 or more     | `LOW`    |
//! | unreachable   | `NONE`   |

pub mod reachability;
pub mod report;

pub use reachability::{
    find_sensitive_paths, hash_path, AccessPath, HopBound, SensitiveReach, WorkBudget,
};
pub use report::{analyze_risk, analyze_risk_with_budget, LevelCounts, RiskMatrix, RiskReport, RiskSummary};

use serde::{Deserialize, Serialize};
use std::fmt;

/// How quickly a node can reach sensitive access
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    /// Sensitive itself or one hop away
    High,
    /// Two hops away
    Medium,
    /// Three or more hops away
    Low,
    /// Nothing sensitive within the bound
    None,
}

impl RiskLevel {
    /// Classify from the shortest qualifying hop distance
    pub fn from_hops(hops: Option<usize>) -> Self {
        match hops {
            Some(0) | Some(1) => Self::High,
            Some(2) => Self::Medium,
            Some(_) => Self::Low,
            None => Self::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::None => "NONE",
        }
    }

    /// Any access at all (direct or indirect)
    pub fn has_access(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Reached through at least one intermediate node
    pub fn is_indirect(&self) -> bool {
        matches!(self, Self::Medium | Self::Low)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hops() {
        assert_eq!(RiskLevel::from_hops(Some(0)), RiskLevel::High);
        assert_eq!(RiskLevel::from_hops(Some(1)), RiskLevel::High);
        assert_eq!(RiskLevel::from_hops(Some(2)), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_hops(Some(3)), RiskLevel::Low);
        assert_eq!(RiskLevel::from_hops(Some(20)), RiskLevel::Low);
        assert_eq!(RiskLevel::from_hops(None), RiskLevel::None);
    }

    #[test]
    fn test_ordering_is_severity() {
        assert!(RiskLevel::High < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::Low);
        assert!(RiskLevel::Low < RiskLevel::None);
    }

    #[test]
    fn test_serialize_upper_case() {
        assert_eq!(serde_json::to_string(&RiskLevel::High).unwrap(), "\"HIGH\"");
        assert_eq!(serde_json::to_string(&RiskLevel::None).unwrap(), "\"NONE\"");
        let parsed: RiskLevel = serde_json::from_str("\"MEDIUM\"").unwrap();
        assert_eq!(parsed, RiskLevel::Medium);
    }

    #[test]
    fn test_access_predicates() {
        assert!(RiskLevel::High.has_access());
        assert!(!RiskLevel::High.is_indirect());
        assert!(RiskLevel::Medium.is_indirect());
        assert!(RiskLevel::Low.is_indirect());
        assert!(!RiskLevel::None.has_access());
        assert_eq!(RiskLevel::Low.to_string(), "LOW");
    }
}
