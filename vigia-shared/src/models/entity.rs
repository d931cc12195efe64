use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Role an entity plays in a shipment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Shipper,
    Importer,
    Manufacturer,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Shipper => "shipper",
            EntityType::Importer => "importer",
            EntityType::Manufacturer => "manufacturer",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// News sentiment classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
            Sentiment::Positive => "positive",
        }
    }
}

/// A single news item discovered during entity research
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsItem {
    pub date: String,
    pub source: String,
    pub headline: String,
    pub sentiment: Sentiment,
    pub excerpt: String,
}

/// Historical shipping behavior for one commodity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradingPattern {
    pub commodity: String,
    /// Recorded shipment count, never negative
    pub frequency: u32,
    #[serde(rename = "lastShipment")]
    pub last_shipment: Option<NaiveDate>,
    #[serde(rename = "normalOrigins")]
    pub normal_origins: Vec<String>,
}

/// Static compliance flags from the registry
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BlacklistStatus {
    /// Presence on the 60B tax/fiscal-delinquency list
    #[serde(rename = "onTaxList")]
    pub on_tax_list: bool,
    #[serde(rename = "approvedManufacturer")]
    pub approved_manufacturer: bool,
    #[serde(rename = "otherFlags")]
    pub other_flags: Vec<String>,
}

impl BlacklistStatus {
    pub fn is_clean(&self) -> bool {
        !self.on_tax_list && self.other_flags.is_empty()
    }
}

/// Identity key for an entity: name is matched case-insensitively
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityIdentity {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub country: Option<String>,
}

impl EntityIdentity {
    pub fn new(name: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            name: name.into(),
            entity_type,
            country: None,
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }
}

/// A trading company under risk evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub country: Option<String>,
    #[serde(rename = "registrationDate")]
    pub registration_date: Option<NaiveDate>,
    #[serde(rename = "lastActivity")]
    pub last_activity: Option<DateTime<Utc>>,
    #[serde(rename = "blacklistStatus")]
    pub blacklist_status: BlacklistStatus,
    #[serde(rename = "tradingPatterns")]
    pub trading_patterns: Vec<TradingPattern>,
    #[serde(rename = "newsItems")]
    pub news_items: Vec<NewsItem>,
}

impl Entity {
    pub fn new(identity: EntityIdentity) -> Self {
        Self {
            name: identity.name,
            entity_type: identity.entity_type,
            country: identity.country,
            registration_date: None,
            last_activity: None,
            blacklist_status: BlacklistStatus::default(),
            trading_patterns: Vec::new(),
            news_items: Vec::new(),
        }
    }

    pub fn identity(&self) -> EntityIdentity {
        EntityIdentity {
            name: self.name.clone(),
            entity_type: self.entity_type,
            country: self.country.clone(),
        }
    }

    /// Total recorded shipments across all commodities
    pub fn total_shipments(&self) -> u32 {
        self.trading_patterns.iter().map(|p| p.frequency).sum()
    }

    /// Merge fresh research results; existing signals are superseded,
    /// never mutated in place piecemeal.
    pub fn record_research(&mut self, news: Vec<NewsItem>, patterns: Vec<TradingPattern>) {
        if !news.is_empty() {
            self.news_items = news;
        }
        if !patterns.is_empty() {
            self.trading_patterns = patterns;
        }
        self.last_activity = Some(Utc::now());
    }
}
