use crate::EngineResult;
use async_trait::async_trait;
use vigia_shared::BlacklistStatus;

/// Compliance-list lookup collaborator. Entity names are matched
/// case-insensitively and exactly; unknown entities yield all-false
/// defaults, never an error.
#[async_trait]
pub trait BlacklistRegistry: Send + Sync {
    /// Resolve static compliance flags for an entity. When `commodity` is
    /// given, manufacturer approval is scoped to that commodity.
    async fn lookup(
        &self,
        name: &str,
        country: Option<&str>,
        commodity: Option<&str>,
    ) -> EngineResult<BlacklistStatus>;
}
