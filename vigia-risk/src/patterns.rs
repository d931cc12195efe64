use vigia_shared::TradingPattern;

/// Outcome of comparing a requested commodity against an entity's
/// recorded shipping history
#[derive(Debug, Clone, PartialEq)]
pub struct PatternFinding {
    pub is_deviation: bool,
    pub narrative: String,
}

/// Flags behavioral deviation from an entity's historical
/// shipment-frequency distribution
pub struct TradingPatternAnalyzer {
    /// A commodity below this share of total recorded shipments, in
    /// percent, counts as a minority line and flags a deviation
    minority_threshold_pct: u32,
}

impl TradingPatternAnalyzer {
    pub fn new(minority_threshold_pct: u32) -> Self {
        Self {
            minority_threshold_pct,
        }
    }

    pub fn evaluate(&self, patterns: &[TradingPattern], commodity: &str) -> PatternFinding {
        let total: u32 = patterns.iter().map(|p| p.frequency).sum();

        // Insufficient data is not an anomaly
        let dominant = match patterns.iter().max_by_key(|p| p.frequency) {
            Some(dominant) if total > 0 => dominant,
            _ => {
                return PatternFinding {
                    is_deviation: false,
                    narrative: "No recorded trading history for this entity; insufficient data to flag a deviation.".to_string(),
                };
            }
        };
        let dominant_share = dominant.frequency * 100 / total;

        let requested = patterns
            .iter()
            .find(|p| p.commodity.eq_ignore_ascii_case(commodity));

        match requested {
            None => {
                let known: Vec<&str> = patterns.iter().map(|p| p.commodity.as_str()).collect();
                PatternFinding {
                    is_deviation: true,
                    narrative: format!(
                        "Entity typically handles {}. This commodity ({}) has no recorded history and deviates from the normal trading pattern; dominant commodity is {} ({}% of recorded shipments).",
                        known.join(", "),
                        commodity,
                        dominant.commodity,
                        dominant_share
                    ),
                }
            }
            Some(pattern) => {
                let share = pattern.frequency * 100 / total;
                if share < self.minority_threshold_pct {
                    PatternFinding {
                        is_deviation: true,
                        narrative: format!(
                            "{} accounts for only {}% of this entity's recorded shipments; dominant commodity is {} ({}%). This shipment deviates from the normal trading pattern.",
                            pattern.commodity, share, dominant.commodity, dominant_share
                        ),
                    }
                } else {
                    PatternFinding {
                        is_deviation: false,
                        narrative: format!(
                            "Shipment is consistent with historical trading patterns; {} accounts for {}% of recorded shipments (dominant commodity: {}, {}%).",
                            pattern.commodity, share, dominant.commodity, dominant_share
                        ),
                    }
                }
            }
        }
    }
}

impl Default for TradingPatternAnalyzer {
    fn default() -> Self {
        Self::new(10)
    }
}
