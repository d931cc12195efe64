use crate::EngineResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vigia_shared::{
    ApprovalStatus, Entity, OrderAssessment, RiskAssessment, ShipmentRequest,
};

/// Persisted assessment record: the immutable assessment plus the request
/// it was derived from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: Uuid,
    pub request: ShipmentRequest,
    pub assessment: RiskAssessment,
    pub created_at: DateTime<Utc>,
}

impl AssessmentRecord {
    pub fn new(request: ShipmentRequest, assessment: RiskAssessment) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
            assessment,
            created_at: Utc::now(),
        }
    }
}

/// Repository trait for entity records
#[async_trait]
pub trait EntityRepository: Send + Sync {
    async fn load_entity(&self, name: &str, country: Option<&str>)
        -> EngineResult<Option<Entity>>;

    /// Upsert keyed on (name, country); fresher research supersedes
    async fn save_entity(&self, entity: &Entity) -> EngineResult<()>;
}

/// Repository trait for shipment assessment records
#[async_trait]
pub trait AssessmentRepository: Send + Sync {
    async fn save_assessment(&self, record: &AssessmentRecord) -> EngineResult<()>;

    async fn list_assessments(&self) -> EngineResult<Vec<AssessmentRecord>>;
}

/// Repository trait for order assessment records
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create_order(&self, order: &OrderAssessment) -> EngineResult<()>;

    async fn get_order(&self, order_id: &str) -> EngineResult<Option<OrderAssessment>>;

    /// Atomically swap the approval status. Fails with
    /// `EngineError::ConcurrentModification` if the stored status no
    /// longer matches `expected`.
    async fn compare_and_set_status(
        &self,
        order_id: &str,
        expected: ApprovalStatus,
        next: ApprovalStatus,
    ) -> EngineResult<OrderAssessment>;
}
