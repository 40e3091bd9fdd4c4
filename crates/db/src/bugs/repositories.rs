use async_trait::async_trait;
use uuid::Uuid;

use crate::bugs::models::{Bug, BugDetail, BugPatch, BugScope, NewBug, ScopedBug};
use crate::guard::MutationGuard;
use bugline_common::error::BuglineResult;

/// Guarded methods return `None`/`false` when the guard does not hold or
/// the target row is gone; nothing is written in that case.
#[async_trait]
pub trait BugRepository: Send + Sync {
    async fn create(&self, bug: NewBug, guard: MutationGuard) -> BuglineResult<Option<Bug>>;
    async fn get_by_id(&self, id: Uuid) -> BuglineResult<Option<Bug>>;
    async fn get_scoped(&self, id: Uuid) -> BuglineResult<Option<ScopedBug>>;
    async fn get_detail(&self, id: Uuid) -> BuglineResult<Option<BugDetail>>;
    async fn list_details(&self, scope: BugScope) -> BuglineResult<Vec<BugDetail>>;
    async fn update(
        &self,
        id: Uuid,
        patch: BugPatch,
        guard: MutationGuard,
    ) -> BuglineResult<Option<Bug>>;
    async fn delete(&self, id: Uuid, guard: MutationGuard) -> BuglineResult<bool>;
}
