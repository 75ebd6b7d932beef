//! # Matching Gateway
//!
//! Assembles item data into judgment requests for the external AI boundary
//! and interprets the answers. The gateway never scores anything itself.
//!
//! Failures of the external call propagate as `Err(ExternalCallFailure)`
//! rather than a zero-probability judgment, so callers can tell "no match"
//! apart from "call failed".

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use cf_core::error::{AppError, Result};
use cf_core::models::{Candidate, Item, ItemKind, ItemStatus, MatchJudgment, PairRequest};
use cf_core::traits::{ItemRepo, MatchJudge};

/// Upper bound on candidates submitted per external call. Larger pools are
/// chunked; unbounded payloads risk request-size failures at the provider.
pub const MAX_POOL_PER_CALL: usize = 24;

#[derive(Clone)]
pub struct MatchGateway {
    items: Arc<dyn ItemRepo>,
    judge: Arc<dyn MatchJudge>,
}

impl MatchGateway {
    pub fn new(items: Arc<dyn ItemRepo>, judge: Arc<dyn MatchJudge>) -> Self {
        MatchGateway { items, judge }
    }

    /// Scores one lost/found pair. Both items are fetched and checked before
    /// the external call, so a missing id never costs a model invocation.
    pub async fn score_pair(&self, lost_id: Uuid, found_id: Uuid) -> Result<MatchJudgment> {
        let lost = self.require_kind(lost_id, ItemKind::Lost).await?;
        let found = self.require_kind(found_id, ItemKind::Found).await?;

        let request = PairRequest {
            lost_description: lost.description,
            lost_image: lost.image.as_inline(),
            found_description: found.description,
            found_image: found.image.as_inline(),
        };

        let judgment = self.judge.judge_pair(&request).await?;
        Ok(judgment.clamped())
    }

    /// Finds open items of the opposite kind the model considers similar to
    /// the source. An empty pool short-circuits without an external call.
    pub async fn find_similar(&self, source_id: Uuid) -> Result<Vec<Uuid>> {
        let source = self
            .items
            .get_item(source_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Item".into(), source_id.to_string()))?;

        let pool: Vec<Candidate> = self
            .items
            .list_items(source.kind.opposite(), Some(ItemStatus::Open))
            .await?
            .iter()
            .map(Candidate::from)
            .collect();

        if pool.is_empty() {
            return Ok(Vec::new());
        }

        let source_candidate = Candidate::from(&source);
        let known: HashSet<Uuid> = pool.iter().map(|c| c.id).collect();
        let mut seen = HashSet::new();
        let mut similar = Vec::new();

        for chunk in pool.chunks(MAX_POOL_PER_CALL) {
            let ids = self.judge.judge_similar(&source_candidate, chunk).await?;
            for id in ids {
                // Ids the model invented, or repeated across chunks, are dropped.
                if known.contains(&id) && seen.insert(id) {
                    similar.push(id);
                }
            }
        }
        Ok(similar)
    }

    async fn require_kind(&self, id: Uuid, kind: ItemKind) -> Result<Item> {
        let label = match kind {
            ItemKind::Lost => "Lost item",
            ItemKind::Found => "Found item",
        };
        match self.items.get_item(id).await? {
            Some(item) if item.kind == kind => Ok(item),
            // A found id passed in the lost slot behaves like a missing record.
            _ => Err(AppError::NotFound(label.into(), id.to_string())),
        }
    }
}
