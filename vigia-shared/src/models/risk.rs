use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Risk classification bands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// The one place a score maps to a level. Every component that derives
    /// a level from a score goes through here.
    pub fn from_score(score: u8) -> Self {
        if score >= 70 {
            RiskLevel::High
        } else if score >= 30 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A shipment submitted for assessment. Immutable once submitted;
/// re-assessment is a new request.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShipmentRequest {
    pub shipper: String,
    pub importer: String,
    pub manufacturer: Option<String>,
    pub commodity: String,
    pub origin: String,
    pub destination: Option<String>,
    #[serde(rename = "declaredValue")]
    pub declared_value: Option<f64>,
    pub weight: Option<f64>,
    #[serde(rename = "hsCode")]
    pub hs_code: Option<String>,
    pub notes: Option<String>,
}

/// Risk profile resolved for a single entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityRiskProfile {
    #[serde(rename = "riskLevel")]
    pub risk_level: RiskLevel,
    #[serde(rename = "riskScore")]
    pub risk_score: u8,
    pub flags: Vec<String>,
    #[serde(rename = "isBlacklisted")]
    pub is_blacklisted: bool,
}

impl EntityRiskProfile {
    /// Profile for an entity with no signals at all
    pub fn clean() -> Self {
        Self {
            risk_level: RiskLevel::Low,
            risk_score: 0,
            flags: Vec::new(),
            is_blacklisted: false,
        }
    }
}

/// Full assessment produced for a shipment. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    #[serde(rename = "riskLevel")]
    pub risk_level: RiskLevel,
    #[serde(rename = "riskScore")]
    pub risk_score: u8,
    pub flags: Vec<String>,
    /// Role → verification status text, ordered by role name
    #[serde(rename = "entityChecks")]
    pub entity_checks: BTreeMap<String, String>,
    pub recommendations: Vec<String>,
    #[serde(rename = "patternAnalysis")]
    pub pattern_analysis: String,
    #[serde(rename = "aiInsights")]
    pub ai_insights: String,
}
