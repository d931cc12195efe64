use serde::{Deserialize, Serialize};

/// Expected-origin rule for one commodity. `weight` is the score
/// contribution of a mismatch; `primary_origin_share` is the primary
/// origin's share of world production, in percent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommodityRule {
    pub commodity: String,
    pub expected_origins: Vec<String>,
    pub primary_origin: String,
    pub primary_origin_share: u8,
    pub weight: u8,
}

/// A detected commodity-origin mismatch
#[derive(Debug, Clone, PartialEq)]
pub struct OriginMismatch {
    pub flag: String,
    pub weight: u8,
    pub analysis: String,
    pub expected_origins: Vec<String>,
}

/// Two-level rule table: commodity → expected origin set. A closed rule
/// set: commodities without a rule never produce a mismatch.
pub struct CommodityRuleTable {
    rules: Vec<CommodityRule>,
}

impl CommodityRuleTable {
    pub fn new(rules: Vec<CommodityRule>) -> Self {
        Self { rules }
    }

    pub fn seeded() -> Self {
        Self::new(get_default_rules())
    }

    fn rule_for(&self, commodity: &str) -> Option<&CommodityRule> {
        self.rules
            .iter()
            .find(|r| r.commodity.eq_ignore_ascii_case(commodity))
    }

    /// Evaluate a commodity-origin pair against the rule table. Origin
    /// matching is an exact, case-insensitive token match; alias
    /// resolution ("USA" vs "United States") is not attempted here.
    pub fn evaluate(&self, commodity: &str, origin: &str) -> Option<OriginMismatch> {
        let rule = self.rule_for(commodity)?;

        let matches = rule
            .expected_origins
            .iter()
            .any(|o| o.eq_ignore_ascii_case(origin));
        if matches {
            return None;
        }

        Some(OriginMismatch {
            flag: format!(
                "Commodity Origin Mismatch - Expected {}, got {}",
                rule.primary_origin, origin
            ),
            weight: rule.weight,
            analysis: format!(
                "{} typically comes from {} ({}% of production), but this shipment is from {}. \
                 This represents an anomaly that requires investigation.",
                rule.commodity, rule.primary_origin, rule.primary_origin_share, origin
            ),
            expected_origins: rule.expected_origins.clone(),
        })
    }

    /// Human-readable description of how a commodity-origin pair relates
    /// to the rule table, for the expected and no-rule cases as well
    pub fn describe(&self, commodity: &str, origin: &str) -> String {
        match self.rule_for(commodity) {
            None => format!(
                "No established pattern for {commodity}. Cannot determine if origin is anomalous."
            ),
            Some(rule) => {
                if let Some(mismatch) = self.evaluate(commodity, origin) {
                    mismatch.analysis
                } else if rule.primary_origin.eq_ignore_ascii_case(origin) {
                    format!(
                        "{} from {} matches the expected pattern; {} is the primary origin ({}% of production).",
                        rule.commodity, origin, rule.primary_origin, rule.primary_origin_share
                    )
                } else {
                    format!(
                        "{} from {} is within expected origins, though {} is more common.",
                        rule.commodity, origin, rule.primary_origin
                    )
                }
            }
        }
    }
}

pub fn get_default_rules() -> Vec<CommodityRule> {
    vec![
        CommodityRule {
            commodity: "Soccer Balls".to_string(),
            expected_origins: vec!["Pakistan".to_string()],
            primary_origin: "Pakistan".to_string(),
            primary_origin_share: 70,
            weight: 75,
        },
        CommodityRule {
            commodity: "Hibiscus Flowers".to_string(),
            expected_origins: vec!["Nigeria".to_string()],
            primary_origin: "Nigeria".to_string(),
            primary_origin_share: 80,
            weight: 75,
        },
        CommodityRule {
            commodity: "Toys".to_string(),
            expected_origins: vec!["China".to_string(), "Vietnam".to_string()],
            primary_origin: "China".to_string(),
            primary_origin_share: 65,
            weight: 40,
        },
        CommodityRule {
            commodity: "Surgical Instruments".to_string(),
            expected_origins: vec!["Pakistan".to_string(), "Germany".to_string()],
            primary_origin: "Pakistan".to_string(),
            primary_origin_share: 60,
            weight: 40,
        },
        CommodityRule {
            commodity: "Avocados".to_string(),
            expected_origins: vec!["Mexico".to_string(), "Peru".to_string()],
            primary_origin: "Mexico".to_string(),
            primary_origin_share: 80,
            weight: 75,
        },
    ]
}
