use vigia_shared::{
    BlacklistStatus, Entity, EntityRiskProfile, EntityType, NewsItem, RiskLevel, Sentiment,
};

/// Points added when an entity sits on the 60B tax list
pub const TAX_LIST_POINTS: u32 = 50;
/// Points added for a manufacturer-type entity missing registry approval
pub const UNAPPROVED_MANUFACTURER_POINTS: u32 = 15;
/// Points per additional registry flag
pub const OTHER_FLAG_POINTS: u32 = 10;
/// Points per negative news item
pub const NEGATIVE_NEWS_POINTS: u32 = 8;
/// Cap on the total negative-news contribution
pub const NEGATIVE_NEWS_CAP: u32 = 24;

const MAX_SCORE: u32 = 100;
const HEADLINE_FLAG_LEN: usize = 50;

/// Composes blacklist and news signals into a single risk profile.
/// Additive scoring, capped at 100; level derived from the shared
/// thresholds.
pub struct EntityRiskResolver;

impl EntityRiskResolver {
    pub fn resolve(
        entity_type: EntityType,
        blacklist: &BlacklistStatus,
        news: &[NewsItem],
    ) -> EntityRiskProfile {
        let mut score: u32 = 0;
        let mut flags: Vec<String> = Vec::new();
        let mut is_blacklisted = false;

        if blacklist.on_tax_list {
            score += TAX_LIST_POINTS;
            is_blacklisted = true;
            flags.push("On 60B tax blacklist".to_string());
        }

        if entity_type == EntityType::Manufacturer && !blacklist.approved_manufacturer {
            score += UNAPPROVED_MANUFACTURER_POINTS;
            flags.push("Not on approved manufacturer registry".to_string());
        }

        for flag in &blacklist.other_flags {
            score += OTHER_FLAG_POINTS;
            flags.push(flag.clone());
        }

        let mut news_points: u32 = 0;
        for item in news {
            if item.sentiment == Sentiment::Negative {
                news_points = (news_points + NEGATIVE_NEWS_POINTS).min(NEGATIVE_NEWS_CAP);
                let headline: String = item.headline.chars().take(HEADLINE_FLAG_LEN).collect();
                flags.push(format!("Negative news: {headline}"));
            }
        }
        score += news_points;

        let score = score.min(MAX_SCORE) as u8;
        EntityRiskProfile {
            risk_level: RiskLevel::from_score(score),
            risk_score: score,
            flags,
            is_blacklisted,
        }
    }

    /// Resolve from a stored entity record
    pub fn resolve_entity(entity: &Entity) -> EntityRiskProfile {
        Self::resolve(entity.entity_type, &entity.blacklist_status, &entity.news_items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn negative_news(headline: &str) -> NewsItem {
        NewsItem {
            date: "2024-11-15".to_string(),
            source: "Reuters".to_string(),
            headline: headline.to_string(),
            sentiment: Sentiment::Negative,
            excerpt: String::new(),
        }
    }

    #[test]
    fn tax_listed_entity_is_blacklisted_with_at_least_fifty_points() {
        let blacklist = BlacklistStatus {
            on_tax_list: true,
            approved_manufacturer: false,
            other_flags: vec![],
        };
        let profile = EntityRiskResolver::resolve(EntityType::Shipper, &blacklist, &[]);
        assert!(profile.is_blacklisted);
        assert!(profile.risk_score >= 50);
        assert_eq!(profile.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn unapproved_manufacturer_only_penalizes_manufacturer_type() {
        let blacklist = BlacklistStatus::default();
        let as_manufacturer =
            EntityRiskResolver::resolve(EntityType::Manufacturer, &blacklist, &[]);
        assert_eq!(as_manufacturer.risk_score, 15);

        let as_shipper = EntityRiskResolver::resolve(EntityType::Shipper, &blacklist, &[]);
        assert_eq!(as_shipper.risk_score, 0);
    }

    #[test]
    fn negative_news_contribution_is_capped() {
        let blacklist = BlacklistStatus::default();
        let news: Vec<NewsItem> = (0..6)
            .map(|i| negative_news(&format!("Investigation {i}")))
            .collect();
        let profile = EntityRiskResolver::resolve(EntityType::Importer, &blacklist, &news);
        // 6 negative items would be 48 points uncapped
        assert_eq!(profile.risk_score, 24);
        assert_eq!(profile.flags.len(), 6);
    }

    #[test]
    fn other_flags_add_ten_points_each() {
        let blacklist = BlacklistStatus {
            on_tax_list: false,
            approved_manufacturer: false,
            other_flags: vec!["Flag A".to_string(), "Flag B".to_string()],
        };
        let profile = EntityRiskResolver::resolve(EntityType::Importer, &blacklist, &[]);
        assert_eq!(profile.risk_score, 20);
        assert_eq!(profile.flags, vec!["Flag A", "Flag B"]);
    }

    #[test]
    fn score_is_capped_at_one_hundred() {
        let blacklist = BlacklistStatus {
            on_tax_list: true,
            approved_manufacturer: false,
            other_flags: (0..8).map(|i| format!("Flag {i}")).collect(),
        };
        let news = vec![negative_news("Fraud probe")];
        let profile = EntityRiskResolver::resolve(EntityType::Manufacturer, &blacklist, &news);
        assert_eq!(profile.risk_score, 100);
        assert_eq!(profile.risk_level, RiskLevel::High);
    }

    #[test]
    fn clean_entity_resolves_low() {
        let profile =
            EntityRiskResolver::resolve(EntityType::Shipper, &BlacklistStatus::default(), &[]);
        assert_eq!(profile, EntityRiskProfile::clean());
    }
}
