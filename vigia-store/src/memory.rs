use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use vigia_core::repository::{
    AssessmentRecord, AssessmentRepository, EntityRepository, OrderRepository,
};
use vigia_core::{EngineError, EngineResult};
use vigia_shared::{ApprovalStatus, Entity, OrderAssessment};

fn entity_key(name: &str, country: Option<&str>) -> String {
    format!(
        "{}|{}",
        name.to_lowercase(),
        country.unwrap_or("").to_lowercase()
    )
}

/// Entity store keyed on (name, country), case-insensitive
pub struct InMemoryEntityRepository {
    entities: RwLock<HashMap<String, Entity>>,
}

impl InMemoryEntityRepository {
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_entities(entities: Vec<Entity>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.entities.write().expect("entity store poisoned");
            for entity in entities {
                map.insert(
                    entity_key(&entity.name, entity.country.as_deref()),
                    entity,
                );
            }
        }
        repo
    }
}

impl Default for InMemoryEntityRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityRepository for InMemoryEntityRepository {
    async fn load_entity(
        &self,
        name: &str,
        country: Option<&str>,
    ) -> EngineResult<Option<Entity>> {
        let map = self.entities.read().expect("entity store poisoned");
        // Fall back to a name-only match when the caller has no country
        if let Some(entity) = map.get(&entity_key(name, country)) {
            return Ok(Some(entity.clone()));
        }
        Ok(map
            .values()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn save_entity(&self, entity: &Entity) -> EngineResult<()> {
        let mut map = self.entities.write().expect("entity store poisoned");
        map.insert(
            entity_key(&entity.name, entity.country.as_deref()),
            entity.clone(),
        );
        Ok(())
    }
}

/// Append-only assessment record store
pub struct InMemoryAssessmentRepository {
    records: RwLock<Vec<AssessmentRecord>>,
}

impl InMemoryAssessmentRepository {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryAssessmentRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssessmentRepository for InMemoryAssessmentRepository {
    async fn save_assessment(&self, record: &AssessmentRecord) -> EngineResult<()> {
        self.records
            .write()
            .expect("assessment store poisoned")
            .push(record.clone());
        Ok(())
    }

    async fn list_assessments(&self) -> EngineResult<Vec<AssessmentRecord>> {
        Ok(self
            .records
            .read()
            .expect("assessment store poisoned")
            .clone())
    }
}

/// Order store with compare-and-set status swaps
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<String, OrderAssessment>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryOrderRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create_order(&self, order: &OrderAssessment) -> EngineResult<()> {
        let mut map = self.orders.write().expect("order store poisoned");
        if map.contains_key(&order.order_id) {
            return Err(EngineError::Internal(format!(
                "duplicate order id {}",
                order.order_id
            )));
        }
        map.insert(order.order_id.clone(), order.clone());
        Ok(())
    }

    async fn get_order(&self, order_id: &str) -> EngineResult<Option<OrderAssessment>> {
        Ok(self
            .orders
            .read()
            .expect("order store poisoned")
            .get(order_id)
            .cloned())
    }

    async fn compare_and_set_status(
        &self,
        order_id: &str,
        expected: ApprovalStatus,
        next: ApprovalStatus,
    ) -> EngineResult<OrderAssessment> {
        // Single write lock covers the read-check-write, so concurrent
        // adjudications serialize here
        let mut map = self.orders.write().expect("order store poisoned");
        let order = map
            .get_mut(order_id)
            .ok_or_else(|| EngineError::OrderNotFound(order_id.to_string()))?;
        if order.approval_status != expected {
            return Err(EngineError::ConcurrentModification {
                order_id: order_id.to_string(),
                expected: expected.to_string(),
                actual: order.approval_status.to_string(),
            });
        }
        order.approval_status = next;
        order.updated_at = chrono::Utc::now();
        Ok(order.clone())
    }
}
