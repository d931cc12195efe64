use crate::models::risk::RiskLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Disposition of an order in the approval lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    PendingApproval,
    AutoApproved,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    /// Terminal states admit no further transitions
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ApprovalStatus::PendingApproval)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::PendingApproval => "pending_approval",
            ApprovalStatus::AutoApproved => "auto_approved",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for creating a two-party order with pre-check
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrderInput {
    pub shipper_name: String,
    pub shipper_country: String,
    pub buyer_name: String,
    pub buyer_country: String,
    pub commodity: String,
    pub origin: String,
    pub value: Option<f64>,
    pub order_reference: Option<String>,
}

/// Risk summary for one party on an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityRiskSummary {
    pub name: String,
    pub country: String,
    pub entity_type: String,
    pub risk_level: RiskLevel,
    pub risk_score: u8,
    pub is_blacklisted: bool,
    pub flags: Vec<String>,
    pub news_summary: Option<String>,
}

/// Pre-check assessment record for an order. `order_id` is assigned once
/// at creation and is stable for the record's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAssessment {
    pub order_id: String,
    pub overall_risk_level: RiskLevel,
    pub overall_risk_score: u8,
    pub requires_approval: bool,
    pub approval_status: ApprovalStatus,
    pub shipper_assessment: EntityRiskSummary,
    pub buyer_assessment: EntityRiskSummary,
    pub flags: Vec<String>,
    pub recommendations: Vec<String>,
    pub ai_summary: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
