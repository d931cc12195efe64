use crate::EngineResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vigia_shared::{EntityType, NewsItem, TradingPattern};

/// Web-derived signals returned by the narrative collaborator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchFindings {
    #[serde(rename = "newsItems", default)]
    pub news_items: Vec<NewsItem>,
    #[serde(rename = "tradingPatterns", default)]
    pub trading_patterns: Vec<TradingPattern>,
    #[serde(rename = "riskFlags", default)]
    pub risk_flags: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

/// Outcome of a research call. The unavailable arm carries the reason so
/// assessments can note the missing section instead of dropping it silently.
#[derive(Debug, Clone)]
pub enum ResearchSignal {
    Available(ResearchFindings),
    Unavailable { reason: String },
}

impl ResearchSignal {
    pub fn findings(&self) -> Option<&ResearchFindings> {
        match self {
            ResearchSignal::Available(findings) => Some(findings),
            ResearchSignal::Unavailable { .. } => None,
        }
    }
}

/// Structured facts handed to the narrative collaborator for summarization
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssessmentFacts {
    pub entity_checks: BTreeMap<String, String>,
    pub pattern_analysis: String,
    pub on_tax_list: bool,
    pub approved_manufacturer: bool,
    pub flags: Vec<String>,
}

/// LLM-backed narrative collaborator: free-text insight and web-derived
/// news research. Treated as a black box that returns a bounded, typed
/// result or fails; callers recover from failure locally.
#[async_trait]
pub trait NarrativeProvider: Send + Sync {
    /// Research an entity for news items and risk indicators
    async fn research_news(
        &self,
        name: &str,
        entity_type: EntityType,
        country: Option<&str>,
    ) -> EngineResult<ResearchFindings>;

    /// Produce a short free-text synthesis of an assessment
    async fn summarize_assessment(&self, facts: &AssessmentFacts) -> EngineResult<String>;
}
