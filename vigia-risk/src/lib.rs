pub mod aggregator;
pub mod narrative;
pub mod patterns;
pub mod research;
pub mod resolver;
pub mod usage;

pub use aggregator::{PartyInputs, RiskAggregator};
pub use narrative::OpenAiNarrativeProvider;
pub use patterns::{PatternFinding, TradingPatternAnalyzer};
pub use research::{EntityResearch, EntityResearcher};
pub use resolver::EntityRiskResolver;
pub use usage::UsageTracker;
