pub mod models;

pub use models::entity::{
    BlacklistStatus, Entity, EntityIdentity, EntityType, NewsItem, Sentiment, TradingPattern,
};
pub use models::order::{ApprovalStatus, EntityRiskSummary, OrderAssessment, OrderInput};
pub use models::risk::{EntityRiskProfile, RiskAssessment, RiskLevel, ShipmentRequest};
