use crate::aggregator::PartyInputs;
use crate::resolver::EntityRiskResolver;
use std::sync::Arc;
use tracing::{info, warn};
use vigia_core::narrative::{NarrativeProvider, ResearchSignal};
use vigia_core::registry::BlacklistRegistry;
use vigia_core::repository::EntityRepository;
use vigia_core::{EngineError, EngineResult};
use vigia_shared::{
    BlacklistStatus, Entity, EntityIdentity, EntityRiskProfile, NewsItem, TradingPattern,
};

/// Research-derived view of an entity: the resolved profile plus the
/// evidence behind it
#[derive(Debug, Clone)]
pub struct EntityResearch {
    pub identity: EntityIdentity,
    pub profile: EntityRiskProfile,
    pub blacklist: BlacklistStatus,
    pub news_items: Vec<NewsItem>,
    pub trading_patterns: Vec<TradingPattern>,
    /// Unscored indicators: provider risk flags plus unavailable-section
    /// notes; never silently dropped
    pub research_flags: Vec<String>,
    pub summary: Option<String>,
}

impl EntityResearch {
    /// First few news items as a compact "headline (sentiment)" digest
    pub fn news_summary(&self) -> Option<String> {
        if self.news_items.is_empty() {
            return None;
        }
        Some(
            self.news_items
                .iter()
                .take(3)
                .map(|n| format!("{} ({})", n.headline, n.sentiment.as_str()))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// View of this research as aggregator party inputs
    pub fn party_inputs(&self) -> PartyInputs {
        PartyInputs {
            name: self.identity.name.clone(),
            blacklist: self.blacklist.clone(),
            news: self.news_items.clone(),
            patterns: self.trading_patterns.clone(),
            extra_flags: self.research_flags.clone(),
        }
    }
}

/// Orchestrates registry lookup, narrative research, and the repository
/// merge for one entity. Collaborator failures degrade to locally-known
/// signals; they never fail the research as a whole.
pub struct EntityResearcher {
    registry: Arc<dyn BlacklistRegistry>,
    narrative: Arc<dyn NarrativeProvider>,
    entities: Arc<dyn EntityRepository>,
}

impl EntityResearcher {
    pub fn new(
        registry: Arc<dyn BlacklistRegistry>,
        narrative: Arc<dyn NarrativeProvider>,
        entities: Arc<dyn EntityRepository>,
    ) -> Self {
        Self {
            registry,
            narrative,
            entities,
        }
    }

    pub async fn research(&self, identity: &EntityIdentity) -> EngineResult<EntityResearch> {
        self.research_scoped(identity, None).await
    }

    /// Research an entity, optionally scoping manufacturer approval to a
    /// commodity.
    pub async fn research_scoped(
        &self,
        identity: &EntityIdentity,
        commodity: Option<&str>,
    ) -> EngineResult<EntityResearch> {
        info!(
            name = %identity.name,
            entity_type = %identity.entity_type,
            country = identity.country.as_deref().unwrap_or("unknown"),
            "starting entity research"
        );

        let mut research_flags: Vec<String> = Vec::new();

        // Registry lookup; an unreachable registry degrades to defaults
        let blacklist = match self
            .registry
            .lookup(&identity.name, identity.country.as_deref(), commodity)
            .await
        {
            Ok(status) => status,
            Err(EngineError::CollaboratorUnavailable(reason)) => {
                warn!(%reason, "compliance registry unavailable");
                research_flags.push(format!("Registry check unavailable: {reason}"));
                BlacklistStatus::default()
            }
            Err(other) => return Err(other),
        };
        info!(
            on_tax_list = blacklist.on_tax_list,
            approved_manufacturer = blacklist.approved_manufacturer,
            other_flags = blacklist.other_flags.len(),
            "blacklist check complete"
        );

        // Narrative research; any failure means "no additional signal"
        let signal = match self
            .narrative
            .research_news(
                &identity.name,
                identity.entity_type,
                identity.country.as_deref(),
            )
            .await
        {
            Ok(findings) => ResearchSignal::Available(findings),
            Err(err) => ResearchSignal::Unavailable {
                reason: err.to_string(),
            },
        };

        let (news_items, trading_patterns, summary) = match &signal {
            ResearchSignal::Available(findings) => {
                info!(
                    news_items = findings.news_items.len(),
                    risk_flags = findings.risk_flags.len(),
                    "narrative research complete"
                );
                research_flags.extend(findings.risk_flags.iter().cloned());
                (
                    findings.news_items.clone(),
                    findings.trading_patterns.clone(),
                    Some(findings.summary.clone()).filter(|s| !s.is_empty()),
                )
            }
            ResearchSignal::Unavailable { reason } => {
                warn!(%reason, "narrative research unavailable");
                research_flags.push(format!("News research unavailable: {reason}"));
                (Vec::new(), Vec::new(), None)
            }
        };

        // Merge into the stored record; fresher research supersedes
        let mut entity = self
            .entities
            .load_entity(&identity.name, identity.country.as_deref())
            .await?
            .unwrap_or_else(|| Entity::new(identity.clone()));
        entity.blacklist_status = blacklist.clone();
        entity.record_research(news_items, trading_patterns);
        self.entities.save_entity(&entity).await?;

        let profile = EntityRiskResolver::resolve(
            identity.entity_type,
            &blacklist,
            &entity.news_items,
        );
        info!(
            risk_level = %profile.risk_level,
            risk_score = profile.risk_score,
            flags = profile.flags.len(),
            "entity research complete"
        );

        Ok(EntityResearch {
            identity: identity.clone(),
            profile,
            blacklist,
            news_items: entity.news_items,
            trading_patterns: entity.trading_patterns,
            research_flags,
            summary,
        })
    }
}
