use crate::transitions::validate_transition;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use vigia_core::narrative::{AssessmentFacts, NarrativeProvider};
use vigia_core::repository::OrderRepository;
use vigia_core::{EngineError, EngineResult};
use vigia_registry::CommodityRuleTable;
use vigia_risk::research::{EntityResearch, EntityResearcher};
use vigia_shared::{
    ApprovalStatus, EntityIdentity, EntityRiskSummary, EntityType, OrderAssessment, OrderInput,
    RiskLevel,
};

const FALLBACK_SUMMARY: &str = "This order exhibits risk factors that warrant careful review. \
    The combination of entity verification results, blacklist status, and pattern analysis \
    suggests elevated risk.";

/// Creates orders with a two-party pre-check and governs the approval
/// lifecycle. Transitions are applied with compare-and-set semantics so
/// two concurrent adjudications cannot race on the same order.
pub struct OrderManager {
    researcher: Arc<EntityResearcher>,
    rules: Arc<CommodityRuleTable>,
    narrative: Arc<dyn NarrativeProvider>,
    orders: Arc<dyn OrderRepository>,
}

impl OrderManager {
    pub fn new(
        researcher: Arc<EntityResearcher>,
        rules: Arc<CommodityRuleTable>,
        narrative: Arc<dyn NarrativeProvider>,
        orders: Arc<dyn OrderRepository>,
    ) -> Self {
        Self {
            researcher,
            rules,
            narrative,
            orders,
        }
    }

    fn validate(input: &OrderInput) -> EngineResult<()> {
        let required = [
            ("shipper_name", &input.shipper_name),
            ("shipper_country", &input.shipper_country),
            ("buyer_name", &input.buyer_name),
            ("buyer_country", &input.buyer_country),
            ("commodity", &input.commodity),
            ("origin", &input.origin),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }

    fn summarize_party(research: &EntityResearch, role: &str) -> EntityRiskSummary {
        let mut flags = research.profile.flags.clone();
        flags.extend(research.research_flags.iter().cloned());
        EntityRiskSummary {
            name: research.identity.name.clone(),
            country: research.identity.country.clone().unwrap_or_default(),
            entity_type: role.to_string(),
            risk_level: research.profile.risk_level,
            risk_score: research.profile.risk_score,
            is_blacklisted: research.profile.is_blacklisted,
            flags,
            news_summary: research.news_summary(),
        }
    }

    /// Run the pre-check on both parties and create the order in its
    /// initial disposition.
    pub async fn create_order(&self, input: OrderInput) -> EngineResult<OrderAssessment> {
        Self::validate(&input)?;

        let order_id = new_order_id();
        info!(
            %order_id,
            shipper = %input.shipper_name,
            buyer = %input.buyer_name,
            commodity = %input.commodity,
            origin = %input.origin,
            "order pre-check started"
        );

        let shipper_research = self
            .researcher
            .research(
                &EntityIdentity::new(input.shipper_name.clone(), EntityType::Shipper)
                    .with_country(input.shipper_country.clone()),
            )
            .await?;
        let buyer_research = self
            .researcher
            .research(
                &EntityIdentity::new(input.buyer_name.clone(), EntityType::Importer)
                    .with_country(input.buyer_country.clone()),
            )
            .await?;

        let shipper = Self::summarize_party(&shipper_research, "shipper");
        let buyer = Self::summarize_party(&buyer_research, "buyer");

        let anomaly = self.rules.evaluate(&input.commodity, &input.origin);

        let mut flags: Vec<String> = Vec::new();
        if let Some(ref anomaly) = anomaly {
            flags.push(anomaly.flag.clone());
        }
        flags.extend(shipper.flags.iter().map(|f| format!("[Shipper] {f}")));
        flags.extend(buyer.flags.iter().map(|f| format!("[Buyer] {f}")));

        // Risk is driven by the worse-behaved party, levels via the
        // shared thresholds
        let overall_score = shipper.risk_score.max(buyer.risk_score);
        let overall_level = RiskLevel::from_score(overall_score);

        let auto_approve = overall_level == RiskLevel::Low
            && !shipper.is_blacklisted
            && !buyer.is_blacklisted
            && anomaly.is_none();
        let (requires_approval, approval_status) = if auto_approve {
            (false, ApprovalStatus::AutoApproved)
        } else {
            (true, ApprovalStatus::PendingApproval)
        };

        let recommendations = Self::recommendations(&shipper, &buyer, anomaly.is_some(), overall_level);

        let ai_summary = self
            .summarize(&input, &shipper, &buyer, &flags)
            .await
            .unwrap_or_else(|_| FALLBACK_SUMMARY.to_string());

        let now = chrono::Utc::now();
        let order = OrderAssessment {
            order_id: order_id.clone(),
            overall_risk_level: overall_level,
            overall_risk_score: overall_score,
            requires_approval,
            approval_status,
            shipper_assessment: shipper,
            buyer_assessment: buyer,
            flags,
            recommendations,
            ai_summary,
            created_at: now,
            updated_at: now,
        };

        self.orders.create_order(&order).await?;
        info!(
            %order_id,
            risk_level = %order.overall_risk_level,
            risk_score = order.overall_risk_score,
            status = %order.approval_status,
            flags = order.flags.len(),
            "order pre-check complete"
        );
        Ok(order)
    }

    /// Apply a human adjudication. Validates the move is legal for the
    /// expected state, then swaps atomically; a stale expectation fails
    /// with `ConcurrentModification`.
    pub async fn transition_order(
        &self,
        order_id: &str,
        expected: ApprovalStatus,
        target: ApprovalStatus,
    ) -> EngineResult<OrderAssessment> {
        validate_transition(expected, target)?;
        let order = self
            .orders
            .compare_and_set_status(order_id, expected, target)
            .await?;
        info!(%order_id, from = %expected, to = %target, "order transitioned");
        Ok(order)
    }

    pub async fn get_order(&self, order_id: &str) -> EngineResult<OrderAssessment> {
        self.orders
            .get_order(order_id)
            .await?
            .ok_or_else(|| EngineError::OrderNotFound(order_id.to_string()))
    }

    fn recommendations(
        shipper: &EntityRiskSummary,
        buyer: &EntityRiskSummary,
        anomaly: bool,
        overall: RiskLevel,
    ) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        if shipper.is_blacklisted {
            out.push("CRITICAL: Shipper is on 60B blacklist - consider rejecting order".to_string());
        }
        if buyer.is_blacklisted {
            out.push("CRITICAL: Buyer is on 60B blacklist - consider rejecting order".to_string());
        }
        if anomaly {
            out.push("Request additional documentation on manufacturing origin".to_string());
        }
        if shipper.risk_level == RiskLevel::High {
            out.push("Request additional documentation from shipper".to_string());
        }
        if buyer.risk_level == RiskLevel::High {
            out.push("Verify buyer's payment history and creditworthiness".to_string());
        }
        match overall {
            RiskLevel::High => {
                out.push("Escalate to legal department for review".to_string());
                out.push("Consider physical inspection of goods".to_string());
            }
            RiskLevel::Medium => out.push("Proceed with enhanced monitoring".to_string()),
            RiskLevel::Low => {
                out.push("Order appears low risk - proceed with standard process".to_string())
            }
        }
        out.dedup();
        out
    }

    async fn summarize(
        &self,
        input: &OrderInput,
        shipper: &EntityRiskSummary,
        buyer: &EntityRiskSummary,
        flags: &[String],
    ) -> EngineResult<String> {
        let mut entity_checks = std::collections::BTreeMap::new();
        entity_checks.insert(
            "shipper".to_string(),
            format!("{} risk (score: {})", shipper.risk_level, shipper.risk_score),
        );
        entity_checks.insert(
            "buyer".to_string(),
            format!("{} risk (score: {})", buyer.risk_level, buyer.risk_score),
        );
        let facts = AssessmentFacts {
            entity_checks,
            pattern_analysis: format!(
                "Order for {} from {}. Shipper: {}, Buyer: {}",
                input.commodity, input.origin, input.shipper_name, input.buyer_name
            ),
            on_tax_list: shipper.is_blacklisted || buyer.is_blacklisted,
            approved_manufacturer: false,
            flags: flags.to_vec(),
        };
        self.narrative.summarize_assessment(&facts).await
    }
}

/// Stable order identifier: ORD- plus eight uppercase hex characters
fn new_order_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("ORD-{}", hex[..8].to_uppercase())
}
