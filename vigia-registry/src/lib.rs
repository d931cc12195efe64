pub mod blacklist;
pub mod commodity;

pub use blacklist::{ManufacturerEntry, StaticRegistry, TaxListEntry};
pub use commodity::{get_default_rules, CommodityRule, CommodityRuleTable, OriginMismatch};
