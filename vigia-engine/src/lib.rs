//! Composition root for the risk assessment and order approval engine.
//! Wires the registry, narrative, and repository collaborators to the
//! scoring components and exposes the function-level surface consumed by
//! the transport layer.

use std::sync::Arc;
use tracing::info;
use vigia_core::narrative::{AssessmentFacts, NarrativeProvider};
use vigia_core::registry::BlacklistRegistry;
use vigia_core::repository::{
    AssessmentRecord, AssessmentRepository, EntityRepository, OrderRepository,
};
use vigia_core::EngineResult;
use vigia_registry::{CommodityRuleTable, StaticRegistry};
use vigia_risk::research::{EntityResearch, EntityResearcher};
use vigia_risk::usage::{UsageStats, UsageTracker};
use vigia_risk::{OpenAiNarrativeProvider, RiskAggregator, TradingPatternAnalyzer};
use vigia_order::OrderManager;
use vigia_shared::{
    ApprovalStatus, EntityIdentity, EntityType, OrderAssessment, OrderInput, RiskAssessment,
    ShipmentRequest,
};
use vigia_store::{
    Config, InMemoryAssessmentRepository, InMemoryEntityRepository, InMemoryOrderRepository,
};

const FALLBACK_INSIGHTS: &str = "This shipment exhibits multiple risk factors that warrant \
    careful review. The combination of entity verification results, blacklist status, and \
    pattern analysis suggests elevated risk.";

pub struct Engine {
    narrative: Arc<dyn NarrativeProvider>,
    assessments: Arc<dyn AssessmentRepository>,
    researcher: Arc<EntityResearcher>,
    aggregator: RiskAggregator,
    orders: OrderManager,
    tracker: Option<Arc<UsageTracker>>,
}

impl Engine {
    pub fn new(
        registry: Arc<dyn BlacklistRegistry>,
        narrative: Arc<dyn NarrativeProvider>,
        entities: Arc<dyn EntityRepository>,
        assessments: Arc<dyn AssessmentRepository>,
        orders: Arc<dyn OrderRepository>,
    ) -> Self {
        let researcher = Arc::new(EntityResearcher::new(
            registry,
            narrative.clone(),
            entities,
        ));
        let manager = OrderManager::new(
            researcher.clone(),
            Arc::new(CommodityRuleTable::seeded()),
            narrative.clone(),
            orders,
        );
        Self {
            narrative,
            assessments,
            researcher,
            aggregator: RiskAggregator::seeded(),
            orders: manager,
            tracker: None,
        }
    }

    /// Engine assembled from the layered application config: the seeded
    /// registry, in-memory stores, an OpenAI-compatible narrative
    /// provider with usage tracking at the configured rates, and the
    /// configured pattern minority threshold.
    pub fn from_config(cfg: &Config) -> Self {
        let tracker = Arc::new(UsageTracker::new(
            cfg.narrative.input_cost_per_mtok,
            cfg.narrative.output_cost_per_mtok,
        ));
        let narrative: Arc<dyn NarrativeProvider> = Arc::new(OpenAiNarrativeProvider::new(
            cfg.narrative.base_url.clone(),
            cfg.narrative.api_key.clone(),
            cfg.narrative.model.clone(),
            Some(tracker.clone()),
        ));
        let mut engine = Self::new(
            Arc::new(StaticRegistry::seeded()),
            narrative,
            Arc::new(InMemoryEntityRepository::new()),
            Arc::new(InMemoryAssessmentRepository::new()),
            Arc::new(InMemoryOrderRepository::new()),
        )
        .with_pattern_threshold(cfg.risk.pattern_minority_threshold_pct);
        engine.tracker = Some(tracker);
        engine
    }

    /// Engine over the seeded registry and in-memory stores, for local
    /// runs and tests
    pub fn in_memory(narrative: Arc<dyn NarrativeProvider>) -> Self {
        Self::new(
            Arc::new(StaticRegistry::seeded()),
            narrative,
            Arc::new(InMemoryEntityRepository::new()),
            Arc::new(InMemoryAssessmentRepository::new()),
            Arc::new(InMemoryOrderRepository::new()),
        )
    }

    /// Override the pattern minority threshold, in percent of total
    /// recorded shipments
    pub fn with_pattern_threshold(mut self, pct: u32) -> Self {
        self.aggregator = RiskAggregator::new(
            CommodityRuleTable::seeded(),
            TradingPatternAnalyzer::new(pct),
        );
        self
    }

    /// Cumulative narrative-provider usage, when tracking is configured
    pub fn usage_stats(&self) -> Option<UsageStats> {
        self.tracker.as_ref().map(|t| t.cumulative_stats())
    }

    /// Full risk assessment for a shipment: research each party, run
    /// the anomaly and pattern checks, aggregate, persist the record.
    pub async fn assess_shipment(
        &self,
        request: ShipmentRequest,
    ) -> EngineResult<RiskAssessment> {
        // Nothing is computed for an invalid request
        RiskAggregator::validate(&request)?;
        info!(
            shipper = %request.shipper,
            importer = %request.importer,
            commodity = %request.commodity,
            origin = %request.origin,
            "assessing shipment"
        );

        let shipper = self
            .researcher
            .research(&EntityIdentity::new(request.shipper.clone(), EntityType::Shipper))
            .await?;
        let importer = self
            .researcher
            .research(&EntityIdentity::new(request.importer.clone(), EntityType::Importer))
            .await?;

        let manufacturer = match request.manufacturer.as_deref() {
            None => None,
            Some(name) => {
                let research = self
                    .researcher
                    .research_scoped(
                        &EntityIdentity::new(name, EntityType::Manufacturer),
                        Some(&request.commodity),
                    )
                    .await?;
                Some(research.party_inputs())
            }
        };

        let mut assessment = self.aggregator.assess(
            &request,
            &shipper.party_inputs(),
            &importer.party_inputs(),
            manufacturer.as_ref(),
        )?;

        assessment.ai_insights = self
            .narrative_insights(&assessment, &shipper, &importer)
            .await;

        self.assessments
            .save_assessment(&AssessmentRecord::new(request, assessment.clone()))
            .await?;
        info!(
            risk_level = %assessment.risk_level,
            risk_score = assessment.risk_score,
            flags = assessment.flags.len(),
            "shipment assessed"
        );
        Ok(assessment)
    }

    /// Research one entity and resolve its risk profile
    pub async fn research_entity(
        &self,
        identity: &EntityIdentity,
    ) -> EngineResult<EntityResearch> {
        self.researcher.research(identity).await
    }

    /// Create an order with a two-party pre-check
    pub async fn create_order(&self, input: OrderInput) -> EngineResult<OrderAssessment> {
        self.orders.create_order(input).await
    }

    /// Apply a human adjudication to a pending order
    pub async fn transition_order(
        &self,
        order_id: &str,
        expected: ApprovalStatus,
        target: ApprovalStatus,
    ) -> EngineResult<OrderAssessment> {
        self.orders.transition_order(order_id, expected, target).await
    }

    pub async fn get_order(&self, order_id: &str) -> EngineResult<OrderAssessment> {
        self.orders.get_order(order_id).await
    }

    async fn narrative_insights(
        &self,
        assessment: &RiskAssessment,
        shipper: &EntityResearch,
        importer: &EntityResearch,
    ) -> String {
        let facts = AssessmentFacts {
            entity_checks: assessment.entity_checks.clone(),
            pattern_analysis: assessment.pattern_analysis.clone(),
            on_tax_list: shipper.blacklist.on_tax_list || importer.blacklist.on_tax_list,
            approved_manufacturer: shipper.blacklist.approved_manufacturer
                || importer.blacklist.approved_manufacturer,
            flags: assessment.flags.clone(),
        };
        match self.narrative.summarize_assessment(&facts).await {
            Ok(text) if !text.is_empty() => text,
            _ => FALLBACK_INSIGHTS.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use vigia_core::narrative::ResearchFindings;
    use vigia_core::EngineError;
    use vigia_shared::{Entity, NewsItem, RiskLevel, Sentiment, TradingPattern};
    use vigia_store::app_config::{NarrativeConfig, RiskConfig};

    /// Deterministic collaborator: scripted news per entity name,
    /// canned summaries
    struct ScriptedNarrative {
        negative_news_for: Vec<String>,
    }

    impl ScriptedNarrative {
        fn quiet() -> Self {
            Self {
                negative_news_for: vec![],
            }
        }
    }

    #[async_trait]
    impl NarrativeProvider for ScriptedNarrative {
        async fn research_news(
            &self,
            name: &str,
            _entity_type: EntityType,
            _country: Option<&str>,
        ) -> EngineResult<ResearchFindings> {
            if self.negative_news_for.iter().any(|n| n == name) {
                Ok(ResearchFindings {
                    news_items: vec![NewsItem {
                        date: "2024-11-15".to_string(),
                        source: "Reuters".to_string(),
                        headline: format!("{name} under customs investigation"),
                        sentiment: Sentiment::Negative,
                        excerpt: String::new(),
                    }],
                    trading_patterns: vec![],
                    risk_flags: vec![],
                    summary: String::new(),
                })
            } else {
                Ok(ResearchFindings::default())
            }
        }

        async fn summarize_assessment(&self, _facts: &AssessmentFacts) -> EngineResult<String> {
            Ok("Synthesized assessment summary.".to_string())
        }
    }

    fn request(shipper: &str, importer: &str, commodity: &str, origin: &str) -> ShipmentRequest {
        ShipmentRequest {
            shipper: shipper.to_string(),
            importer: importer.to_string(),
            commodity: commodity.to_string(),
            origin: origin.to_string(),
            ..Default::default()
        }
    }

    fn entity_with_history(name: &str, history: &[(&str, u32)]) -> Entity {
        let mut entity =
            Entity::new(EntityIdentity::new(name, EntityType::Shipper).with_country("Mexico"));
        entity.trading_patterns = history
            .iter()
            .map(|(commodity, frequency)| TradingPattern {
                commodity: commodity.to_string(),
                frequency: *frequency,
                last_shipment: None,
                normal_origins: vec!["China".to_string()],
            })
            .collect();
        entity
    }

    fn engine_with_entities(entities: Vec<Entity>) -> Engine {
        Engine::new(
            Arc::new(StaticRegistry::seeded()),
            Arc::new(ScriptedNarrative::quiet()),
            Arc::new(InMemoryEntityRepository::with_entities(entities)),
            Arc::new(InMemoryAssessmentRepository::new()),
            Arc::new(InMemoryOrderRepository::new()),
        )
    }

    #[tokio::test]
    async fn soccer_balls_from_china_assess_high_with_pakistan_flag() {
        let engine = Engine::in_memory(Arc::new(ScriptedNarrative::quiet()));
        let assessment = engine
            .assess_shipment(request(
                "Global Trade Corp",
                "Mexico Imports SA",
                "Soccer Balls",
                "China",
            ))
            .await
            .unwrap();

        assert_eq!(assessment.risk_level, RiskLevel::High);
        assert!(assessment.flags.iter().any(|f| f.contains("Pakistan")));
        assert_eq!(assessment.ai_insights, "Synthesized assessment summary.");
    }

    #[tokio::test]
    async fn blacklisted_shipper_is_flagged_and_held_for_approval() {
        let engine = Engine::in_memory(Arc::new(ScriptedNarrative::quiet()));

        let assessment = engine
            .assess_shipment(request(
                "Rapid Shift Logistics",
                "Juguetes Mexico",
                "Toys",
                "Vietnam",
            ))
            .await
            .unwrap();
        assert!(matches!(
            assessment.risk_level,
            RiskLevel::Medium | RiskLevel::High
        ));
        assert!(assessment.flags.iter().any(|f| f.contains("60B")));

        let order = engine
            .create_order(OrderInput {
                shipper_name: "Rapid Shift Logistics".to_string(),
                shipper_country: "Mexico".to_string(),
                buyer_name: "Juguetes Mexico".to_string(),
                buyer_country: "Mexico".to_string(),
                commodity: "Toys".to_string(),
                origin: "Vietnam".to_string(),
                value: None,
                order_reference: None,
            })
            .await
            .unwrap();
        assert!(order.requires_approval);
        assert_eq!(order.approval_status, ApprovalStatus::PendingApproval);
    }

    #[tokio::test]
    async fn auto_approved_order_rejects_further_transitions() {
        let engine = Engine::in_memory(Arc::new(ScriptedNarrative::quiet()));
        let order = engine
            .create_order(OrderInput {
                shipper_name: "Global Trade Corp".to_string(),
                shipper_country: "Mexico".to_string(),
                buyer_name: "Juguetes Mexico".to_string(),
                buyer_country: "Mexico".to_string(),
                commodity: "Toys".to_string(),
                origin: "China".to_string(),
                value: None,
                order_reference: None,
            })
            .await
            .unwrap();
        assert_eq!(order.approval_status, ApprovalStatus::AutoApproved);

        let err = engine
            .transition_order(
                &order.order_id,
                ApprovalStatus::AutoApproved,
                ApprovalStatus::Approved,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn negative_news_raises_the_importer_profile() {
        let engine = Engine::in_memory(Arc::new(ScriptedNarrative {
            negative_news_for: vec!["Mexico Imports SA".to_string()],
        }));
        let assessment = engine
            .assess_shipment(request(
                "Global Trade Corp",
                "Mexico Imports SA",
                "Unknown Widget",
                "France",
            ))
            .await
            .unwrap();
        assert_eq!(assessment.risk_score, 8);
        assert!(assessment
            .flags
            .iter()
            .any(|f| f.starts_with("Negative news:")));
        assert!(assessment
            .recommendations
            .contains(&"Review recent press coverage before clearance".to_string()));
    }

    #[tokio::test]
    async fn invalid_request_is_rejected_without_persisting_anything() {
        let assessments = Arc::new(InMemoryAssessmentRepository::new());
        let engine = Engine::new(
            Arc::new(StaticRegistry::seeded()),
            Arc::new(ScriptedNarrative::quiet()),
            Arc::new(InMemoryEntityRepository::new()),
            assessments.clone(),
            Arc::new(InMemoryOrderRepository::new()),
        );

        let err = engine
            .assess_shipment(request("", "Mexico Imports SA", "Toys", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(assessments.list_assessments().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn identical_inputs_yield_identical_assessments() {
        let engine = Engine::in_memory(Arc::new(ScriptedNarrative::quiet()));
        let req = request("Global Trade Corp", "Mexico Imports SA", "Soccer Balls", "China");
        let first = engine.assess_shipment(req.clone()).await.unwrap();
        let second = engine.assess_shipment(req).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn research_entity_exposes_the_resolved_profile() {
        let engine = Engine::in_memory(Arc::new(ScriptedNarrative::quiet()));
        let research = engine
            .research_entity(
                &EntityIdentity::new("Rapid Shift Logistics", EntityType::Shipper)
                    .with_country("Mexico"),
            )
            .await
            .unwrap();
        assert!(research.profile.is_blacklisted);
        assert!(research.profile.risk_score >= 50);
    }

    #[tokio::test]
    async fn manufacturer_scoping_flags_uncertified_commodities() {
        let engine = Engine::in_memory(Arc::new(ScriptedNarrative::quiet()));
        let mut req = request("Global Trade Corp", "Mexico Imports SA", "Toys", "China");
        req.manufacturer = Some("Sialkot Sporting Goods".to_string());

        let assessment = engine.assess_shipment(req).await.unwrap();
        assert!(assessment
            .flags
            .iter()
            .any(|f| f.contains("Not on approved manufacturer list for Toys")));
        assert_eq!(assessment.entity_checks["manufacturer"], "Verified");
    }

    #[tokio::test]
    async fn seeded_history_drives_pattern_deviation() {
        let engine = engine_with_entities(vec![entity_with_history(
            "Patterned Exports",
            &[("Electronics", 45), ("Textiles", 5)],
        )]);

        let assessment = engine
            .assess_shipment(request(
                "Patterned Exports",
                "Mexico Imports SA",
                "Surgical Instruments",
                "Pakistan",
            ))
            .await
            .unwrap();
        assert!(assessment
            .flags
            .iter()
            .any(|f| f.starts_with("Trading Pattern Deviation:")));
        assert!(assessment.pattern_analysis.contains("Electronics"));
    }

    #[tokio::test]
    async fn pattern_threshold_is_tunable() {
        // Toys at 40% of recorded shipments: fine at the default 10%
        // threshold, a minority line at 60%
        let history = [("Electronics", 30u32), ("Toys", 20u32)];

        let strict = engine_with_entities(vec![entity_with_history(
            "Patterned Exports",
            &history,
        )])
        .with_pattern_threshold(60);
        let flagged = strict
            .assess_shipment(request("Patterned Exports", "Mexico Imports SA", "Toys", "China"))
            .await
            .unwrap();
        assert!(flagged
            .flags
            .iter()
            .any(|f| f.starts_with("Trading Pattern Deviation:")));

        let lenient = engine_with_entities(vec![entity_with_history(
            "Patterned Exports",
            &history,
        )]);
        let clean = lenient
            .assess_shipment(request("Patterned Exports", "Mexico Imports SA", "Toys", "China"))
            .await
            .unwrap();
        assert!(clean
            .flags
            .iter()
            .all(|f| !f.starts_with("Trading Pattern Deviation:")));
    }

    #[tokio::test]
    async fn from_config_wires_usage_tracking() {
        let cfg = Config {
            narrative: NarrativeConfig {
                base_url: "http://localhost:1".to_string(),
                api_key: "test-key".to_string(),
                model: "gpt-4o-mini".to_string(),
                input_cost_per_mtok: 0.15,
                output_cost_per_mtok: 0.6,
            },
            risk: RiskConfig {
                pattern_minority_threshold_pct: 25,
            },
        };

        let engine = Engine::from_config(&cfg);
        let stats = engine.usage_stats().unwrap();
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.total_cost, 0.0);

        // Untracked engines report no usage
        let untracked = Engine::in_memory(Arc::new(ScriptedNarrative::quiet()));
        assert!(untracked.usage_stats().is_none());
    }
}
