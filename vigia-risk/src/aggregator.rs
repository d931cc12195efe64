use crate::patterns::TradingPatternAnalyzer;
use crate::resolver::EntityRiskResolver;
use std::collections::BTreeMap;
use vigia_core::{EngineError, EngineResult};
use vigia_registry::CommodityRuleTable;
use vigia_shared::{
    BlacklistStatus, EntityRiskProfile, EntityType, NewsItem, RiskAssessment, RiskLevel,
    ShipmentRequest, TradingPattern,
};

/// Everything known about one party when an assessment runs: registry
/// flags plus whatever research signals were obtainable
#[derive(Debug, Clone, Default)]
pub struct PartyInputs {
    pub name: String,
    pub blacklist: BlacklistStatus,
    pub news: Vec<NewsItem>,
    pub patterns: Vec<TradingPattern>,
    /// Informational flags carried into the output without scoring,
    /// e.g. research risk indicators or unavailable-section notes
    pub extra_flags: Vec<String>,
}

impl PartyInputs {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Combines the commodity-origin check, per-entity risk profiles, and
/// pattern analysis into one assessment. Deterministic: identical inputs
/// produce an identical record, flags in a fixed order.
pub struct RiskAggregator {
    rules: CommodityRuleTable,
    analyzer: TradingPatternAnalyzer,
}

impl RiskAggregator {
    pub fn new(rules: CommodityRuleTable, analyzer: TradingPatternAnalyzer) -> Self {
        Self { rules, analyzer }
    }

    pub fn seeded() -> Self {
        Self::new(CommodityRuleTable::seeded(), TradingPatternAnalyzer::default())
    }

    /// Reject missing required fields before any scoring runs
    pub fn validate(request: &ShipmentRequest) -> EngineResult<()> {
        let mut missing = Vec::new();
        if request.shipper.trim().is_empty() {
            missing.push("shipper");
        }
        if request.importer.trim().is_empty() {
            missing.push("importer");
        }
        if request.commodity.trim().is_empty() {
            missing.push("commodity");
        }
        if request.origin.trim().is_empty() {
            missing.push("origin");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }

    /// Assess a shipment from gathered party inputs. `manufacturer` is
    /// the optional third party named on the request.
    pub fn assess(
        &self,
        request: &ShipmentRequest,
        shipper: &PartyInputs,
        importer: &PartyInputs,
        manufacturer: Option<&PartyInputs>,
    ) -> EngineResult<RiskAssessment> {
        Self::validate(request)?;

        let mut flags: Vec<String> = Vec::new();

        // 1. Commodity-origin check comes first so its flag leads
        let mismatch = self.rules.evaluate(&request.commodity, &request.origin);
        if let Some(ref mismatch) = mismatch {
            flags.push(mismatch.flag.clone());
        }

        // 2. Per-entity profiles; the worse-behaved party drives the score
        let shipper_profile =
            EntityRiskResolver::resolve(EntityType::Shipper, &shipper.blacklist, &shipper.news);
        flags.extend(shipper_profile.flags.iter().cloned());
        flags.extend(shipper.extra_flags.iter().cloned());

        let importer_profile =
            EntityRiskResolver::resolve(EntityType::Importer, &importer.blacklist, &importer.news);
        flags.extend(importer_profile.flags.iter().cloned());
        flags.extend(importer.extra_flags.iter().cloned());

        let manufacturer_pair = manufacturer.map(|m| {
            let profile =
                EntityRiskResolver::resolve(EntityType::Manufacturer, &m.blacklist, &m.news);
            flags.extend(profile.flags.iter().cloned());
            flags.extend(m.extra_flags.iter().cloned());
            (m, profile)
        });
        let manufacturer_profile = manufacturer_pair.as_ref().map(|(_, profile)| profile);

        // 3. Trading pattern analysis against the named shipper
        let finding = self.analyzer.evaluate(&shipper.patterns, &request.commodity);
        if finding.is_deviation {
            flags.push(format!("Trading Pattern Deviation: {}", finding.narrative));
        }

        // 4. Mismatch weight plus the worst entity score, clamped
        let entity_score = [
            Some(&shipper_profile),
            Some(&importer_profile),
            manufacturer_profile,
        ]
        .into_iter()
        .flatten()
        .map(|p| p.risk_score as u32)
        .max()
        .unwrap_or(0);
        let mismatch_weight = mismatch.as_ref().map(|m| m.weight as u32).unwrap_or(0);
        let score = (mismatch_weight + entity_score).min(100) as u8;

        // 5. Shared thresholds
        let level = RiskLevel::from_score(score);

        // Origin analysis text covers the expected and no-rule cases too
        let pattern_analysis = format!(
            "{} {}",
            self.rules.describe(&request.commodity, &request.origin),
            finding.narrative
        );

        let entity_checks = Self::entity_checks(
            request,
            &shipper_profile,
            &importer_profile,
            manufacturer_pair
                .as_ref()
                .map(|(inputs, profile)| (&inputs.blacklist, profile)),
        );

        // 6. Fixed flag-category → action mapping, de-duplicated
        let recommendations = Self::recommendations(
            level,
            mismatch.is_some(),
            finding.is_deviation,
            &shipper_profile,
            &importer_profile,
            manufacturer_profile,
        );

        Ok(RiskAssessment {
            risk_level: level,
            risk_score: score,
            flags,
            entity_checks,
            recommendations,
            pattern_analysis,
            // Filled by the caller from the narrative collaborator
            ai_insights: String::new(),
        })
    }

    fn entity_checks(
        request: &ShipmentRequest,
        shipper: &EntityRiskProfile,
        importer: &EntityRiskProfile,
        manufacturer: Option<(&BlacklistStatus, &EntityRiskProfile)>,
    ) -> BTreeMap<String, String> {
        let mut checks = BTreeMap::new();

        checks.insert(
            "shipper".to_string(),
            if !shipper.is_blacklisted && shipper.risk_level == RiskLevel::Low {
                "Clean - no blacklist entries".to_string()
            } else {
                format!("Warning - {} risk entity", shipper.risk_level)
            },
        );

        checks.insert(
            "importer".to_string(),
            if !importer.is_blacklisted && importer.risk_level == RiskLevel::Low {
                "Clean - no issues found".to_string()
            } else {
                format!("Warning - {} risk entity", importer.risk_level)
            },
        );

        checks.insert(
            "manufacturer".to_string(),
            match manufacturer {
                None => "Not provided".to_string(),
                Some((blacklist, _)) if blacklist.approved_manufacturer => "Verified".to_string(),
                Some(_) => format!(
                    "Not on approved manufacturer list for {}",
                    request.commodity
                ),
            },
        );

        checks
    }

    fn recommendations(
        level: RiskLevel,
        origin_mismatch: bool,
        pattern_deviation: bool,
        shipper: &EntityRiskProfile,
        importer: &EntityRiskProfile,
        manufacturer: Option<&EntityRiskProfile>,
    ) -> Vec<String> {
        fn push(out: &mut Vec<String>, rec: &str) {
            if !out.iter().any(|r| r == rec) {
                out.push(rec.to_string());
            }
        }

        let mut out: Vec<String> = Vec::new();

        if shipper.is_blacklisted || importer.is_blacklisted {
            push(&mut out, "Escalate to compliance and legal review");
        }
        if origin_mismatch {
            push(&mut out, "Request additional documentation on manufacturing origin");
        }
        if manufacturer.is_some_and(|m| m.flags.iter().any(|f| f.contains("manufacturer"))) {
            push(&mut out, "Request manufacturer certification");
        }
        let has_negative_news = shipper
            .flags
            .iter()
            .chain(importer.flags.iter())
            .any(|f| f.starts_with("Negative news:"));
        if has_negative_news {
            push(&mut out, "Review recent press coverage before clearance");
        }
        if pattern_deviation {
            push(&mut out, "Verify shipment against the shipper's trading history");
        }

        if out.is_empty() {
            match level {
                RiskLevel::High => {
                    push(&mut out, "Require additional documentation and verification");
                    push(&mut out, "Consider physical inspection of cargo");
                }
                RiskLevel::Medium => {
                    push(&mut out, "Proceed with standard documentation review");
                    push(&mut out, "Monitor for additional red flags");
                }
                RiskLevel::Low => {
                    push(&mut out, "Proceed with standard documentation review");
                    push(&mut out, "No additional inspection required");
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigia_shared::Sentiment;

    fn request(shipper: &str, importer: &str, commodity: &str, origin: &str) -> ShipmentRequest {
        ShipmentRequest {
            shipper: shipper.to_string(),
            importer: importer.to_string(),
            commodity: commodity.to_string(),
            origin: origin.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn missing_required_fields_fail_before_scoring() {
        let aggregator = RiskAggregator::seeded();
        let bad = request("", "Mexico Imports SA", "Soccer Balls", "");
        let err = aggregator
            .assess(&bad, &PartyInputs::default(), &PartyInputs::default(), None)
            .unwrap_err();
        match err {
            EngineError::Validation(msg) => {
                assert!(msg.contains("shipper"));
                assert!(msg.contains("origin"));
                assert!(!msg.contains("importer"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn origin_mismatch_flag_leads_and_drives_high_risk() {
        let aggregator = RiskAggregator::seeded();
        let req = request("Global Trade Corp", "Mexico Imports SA", "Soccer Balls", "China");
        let shipper = PartyInputs::named("Global Trade Corp");
        let importer = PartyInputs::named("Mexico Imports SA");

        let assessment = aggregator.assess(&req, &shipper, &importer, None).unwrap();
        assert_eq!(assessment.risk_level, RiskLevel::High);
        assert!(assessment.flags[0].contains("Expected Pakistan"));
        assert_eq!(assessment.risk_score, 75);
    }

    #[test]
    fn expected_origin_produces_no_mismatch() {
        let aggregator = RiskAggregator::seeded();
        let req = request("Global Trade Corp", "Mexico Imports SA", "Soccer Balls", "Pakistan");
        let assessment = aggregator
            .assess(&req, &PartyInputs::default(), &PartyInputs::default(), None)
            .unwrap();
        assert!(assessment
            .flags
            .iter()
            .all(|f| !f.contains("Commodity Origin Mismatch")));
        assert_eq!(assessment.risk_level, RiskLevel::Low);
        assert!(assessment
            .pattern_analysis
            .contains("matches the expected pattern"));
    }

    #[test]
    fn worst_party_drives_the_score_not_the_average() {
        let aggregator = RiskAggregator::seeded();
        let req = request("Clean Shipper", "Dirty Importer", "Unknown Widget", "France");

        let shipper = PartyInputs::named("Clean Shipper");
        let mut importer = PartyInputs::named("Dirty Importer");
        importer.blacklist = BlacklistStatus {
            on_tax_list: true,
            approved_manufacturer: false,
            other_flags: vec!["60B List: Tax fraud".to_string()],
        };

        let assessment = aggregator.assess(&req, &shipper, &importer, None).unwrap();
        // 50 (tax) + 10 (other flag) from the importer alone
        assert_eq!(assessment.risk_score, 60);
        assert_eq!(assessment.risk_level, RiskLevel::Medium);
        assert!(assessment
            .recommendations
            .contains(&"Escalate to compliance and legal review".to_string()));
    }

    #[test]
    fn pattern_deviation_appends_narrative_flag_last() {
        let aggregator = RiskAggregator::seeded();
        let req = request("Global Trade Corp", "Mexico Imports SA", "Soccer Balls", "Pakistan");
        let mut shipper = PartyInputs::named("Global Trade Corp");
        shipper.patterns = vec![TradingPattern {
            commodity: "Electronics".to_string(),
            frequency: 40,
            last_shipment: None,
            normal_origins: vec!["China".to_string()],
        }];

        let assessment = aggregator
            .assess(&req, &shipper, &PartyInputs::default(), None)
            .unwrap();
        let last = assessment.flags.last().unwrap();
        assert!(last.starts_with("Trading Pattern Deviation:"));
        assert!(assessment.pattern_analysis.contains("Electronics"));
    }

    #[test]
    fn assessment_is_idempotent_for_identical_inputs() {
        let aggregator = RiskAggregator::seeded();
        let req = request("Global Trade Corp", "Mexico Imports SA", "Soccer Balls", "China");
        let mut shipper = PartyInputs::named("Global Trade Corp");
        shipper.news = vec![NewsItem {
            date: "2024-11-15".to_string(),
            source: "Reuters".to_string(),
            headline: "Customs probe".to_string(),
            sentiment: Sentiment::Negative,
            excerpt: String::new(),
        }];
        let importer = PartyInputs::named("Mexico Imports SA");

        let first = aggregator.assess(&req, &shipper, &importer, None).unwrap();
        let second = aggregator.assess(&req, &shipper, &importer, None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn score_is_clamped_to_one_hundred() {
        let aggregator = RiskAggregator::seeded();
        let req = request("Bad Shipper", "Mexico Imports SA", "Soccer Balls", "China");
        let mut shipper = PartyInputs::named("Bad Shipper");
        shipper.blacklist = BlacklistStatus {
            on_tax_list: true,
            approved_manufacturer: false,
            other_flags: vec!["A".to_string(), "B".to_string(), "C".to_string()],
        };

        // 75 mismatch + 80 entity would exceed the cap
        let assessment = aggregator
            .assess(&req, &shipper, &PartyInputs::default(), None)
            .unwrap();
        assert_eq!(assessment.risk_score, 100);
        assert_eq!(assessment.risk_level, RiskLevel::High);
    }

    #[test]
    fn manufacturer_checks_are_reported() {
        let aggregator = RiskAggregator::seeded();
        let req = request("S", "I", "Toys", "China");

        let without = aggregator
            .assess(&req, &PartyInputs::default(), &PartyInputs::default(), None)
            .unwrap();
        assert_eq!(without.entity_checks["manufacturer"], "Not provided");

        let mut manufacturer = PartyInputs::named("Shenzhen Play Manufacturing");
        manufacturer.blacklist.approved_manufacturer = true;
        let with = aggregator
            .assess(
                &req,
                &PartyInputs::default(),
                &PartyInputs::default(),
                Some(&manufacturer),
            )
            .unwrap();
        assert_eq!(with.entity_checks["manufacturer"], "Verified");
    }

    #[test]
    fn low_risk_defaults_when_no_category_matches() {
        let aggregator = RiskAggregator::seeded();
        let req = request("S", "I", "Unknown Widget", "France");
        let assessment = aggregator
            .assess(&req, &PartyInputs::default(), &PartyInputs::default(), None)
            .unwrap();
        assert_eq!(
            assessment.recommendations,
            vec![
                "Proceed with standard documentation review".to_string(),
                "No additional inspection required".to_string(),
            ]
        );
        assert!(assessment
            .pattern_analysis
            .contains("No established pattern"));
    }
}
