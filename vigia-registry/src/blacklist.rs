use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use vigia_core::registry::BlacklistRegistry;
use vigia_core::EngineResult;
use vigia_shared::BlacklistStatus;

/// An entity on the 60B tax/fiscal-delinquency list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxListEntry {
    pub name: String,
    pub reason: String,
    pub listed_date: Option<NaiveDate>,
}

/// An entry in the approved-manufacturer registry, scoped to the
/// commodities the manufacturer is certified for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManufacturerEntry {
    pub name: String,
    pub country: String,
    pub commodities: Vec<String>,
    pub approved_date: Option<NaiveDate>,
}

/// In-memory compliance registry. Name matching is case-insensitive and
/// exact; alias resolution is an upstream concern.
pub struct StaticRegistry {
    tax_list: Vec<TaxListEntry>,
    manufacturers: Vec<ManufacturerEntry>,
}

impl StaticRegistry {
    pub fn new(tax_list: Vec<TaxListEntry>, manufacturers: Vec<ManufacturerEntry>) -> Self {
        Self {
            tax_list,
            manufacturers,
        }
    }

    /// Registry seeded with the bundled compliance data
    pub fn seeded() -> Self {
        Self::new(default_tax_list(), default_manufacturers())
    }

    fn find_tax_entry(&self, name: &str) -> Option<&TaxListEntry> {
        self.tax_list
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
    }

    fn find_manufacturer(&self, name: &str) -> Option<&ManufacturerEntry> {
        self.manufacturers
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
    }

    /// Pure lookup behind the collaborator trait. Unknown entities yield
    /// all-false defaults, never an error.
    pub fn status_for(&self, name: &str, commodity: Option<&str>) -> BlacklistStatus {
        let mut status = BlacklistStatus::default();

        if let Some(entry) = self.find_tax_entry(name) {
            status.on_tax_list = true;
            status.other_flags.push(format!("60B List: {}", entry.reason));
        }

        if let Some(entry) = self.find_manufacturer(name) {
            status.approved_manufacturer = true;
            if let Some(commodity) = commodity {
                let approved_for_commodity = entry
                    .commodities
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(commodity));
                if !approved_for_commodity {
                    status
                        .other_flags
                        .push(format!("Not on approved manufacturer list for {commodity}"));
                }
            }
        }

        status
    }
}

#[async_trait]
impl BlacklistRegistry for StaticRegistry {
    async fn lookup(
        &self,
        name: &str,
        _country: Option<&str>,
        commodity: Option<&str>,
    ) -> EngineResult<BlacklistStatus> {
        Ok(self.status_for(name, commodity))
    }
}

fn default_tax_list() -> Vec<TaxListEntry> {
    vec![
        TaxListEntry {
            name: "Rapid Shift Logistics".to_string(),
            reason: "Fiscal delinquency - unpaid import duties".to_string(),
            listed_date: NaiveDate::from_ymd_opt(2023, 6, 12),
        },
        TaxListEntry {
            name: "Comercial Fantasma SA".to_string(),
            reason: "Shell company - fabricated invoices".to_string(),
            listed_date: NaiveDate::from_ymd_opt(2022, 11, 3),
        },
        TaxListEntry {
            name: "Frontera Freight Partners".to_string(),
            reason: "Tax fraud investigation".to_string(),
            listed_date: NaiveDate::from_ymd_opt(2024, 2, 27),
        },
    ]
}

fn default_manufacturers() -> Vec<ManufacturerEntry> {
    vec![
        ManufacturerEntry {
            name: "Sialkot Sporting Goods".to_string(),
            country: "Pakistan".to_string(),
            commodities: vec!["Soccer Balls".to_string(), "Sporting Equipment".to_string()],
            approved_date: NaiveDate::from_ymd_opt(2021, 4, 8),
        },
        ManufacturerEntry {
            name: "Kano Agro Exports".to_string(),
            country: "Nigeria".to_string(),
            commodities: vec!["Hibiscus Flowers".to_string(), "Sesame Seeds".to_string()],
            approved_date: NaiveDate::from_ymd_opt(2022, 1, 19),
        },
        ManufacturerEntry {
            name: "Shenzhen Play Manufacturing".to_string(),
            country: "China".to_string(),
            commodities: vec!["Toys".to_string(), "Electronics".to_string()],
            approved_date: NaiveDate::from_ymd_opt(2020, 9, 30),
        },
    ]
}
