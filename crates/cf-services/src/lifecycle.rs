//! # Item Lifecycle
//!
//! Turns a submitted form plus the current session identity into a persisted
//! open report, and owns the status transitions. Authorization for
//! transitions is enforced here, server-side, not just hidden in the UI:
//! only the owner may mark a lost item returned, and only the configured
//! administrative identity may mark a found item resolved.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use cf_core::error::{AppError, Result};
use cf_core::models::{Item, ItemDraft, ItemImage, ItemKind, ItemStatus, SessionUser};
use cf_core::traits::ItemRepo;

const MIN_NAME_CHARS: usize = 2;
const MIN_DESCRIPTION_CHARS: usize = 10;
const MIN_LOCATION_CHARS: usize = 3;

#[derive(Clone)]
pub struct ItemLifecycle {
    items: Arc<dyn ItemRepo>,
    /// Single allow-listed address permitted to resolve found items.
    /// A minimal policy, not a role system.
    admin_email: String,
}

impl ItemLifecycle {
    pub fn new(items: Arc<dyn ItemRepo>, admin_email: String) -> Self {
        ItemLifecycle { items, admin_email }
    }

    /// Persists a new report with `status = open`. Submission requires an
    /// authenticated identity for both kinds, so every record carries a
    /// meaningful owner reference.
    pub async fn submit(
        &self,
        kind: ItemKind,
        draft: ItemDraft,
        user: &SessionUser,
    ) -> Result<Item> {
        let category = validate(&draft)?;

        let image = if draft.image.is_none() {
            ItemImage::placeholder()
        } else {
            draft.image
        };

        let reporter_name = if user.full_name.trim().is_empty() {
            user.email.clone()
        } else {
            user.full_name.clone()
        };

        let item = Item {
            id: Uuid::now_v7(),
            kind,
            status: ItemStatus::Open,
            name: draft.name.trim().to_string(),
            description: draft.description.trim().to_string(),
            category,
            location: draft.location.trim().to_string(),
            image,
            reporter_name,
            reporter_email: Some(user.email.clone()),
            reporter_phone: draft.phone.filter(|p| !p.trim().is_empty()),
            owner_id: Some(user.id),
            submitted_to_office: draft.submitted_to_office,
            created_at: Utc::now(),
        };

        self.items.create_item(&item).await?;
        log::info!("new {} report {} ({})", item.kind, item.id, item.category);
        Ok(item)
    }

    /// Owner-only transition for lost items: open -> returned.
    pub async fn mark_returned(&self, id: Uuid, user: &SessionUser) -> Result<Item> {
        let item = self.require_item(id).await?;
        if item.kind != ItemKind::Lost {
            return Err(AppError::Validation(
                "only lost items can be marked returned".into(),
            ));
        }
        if item.owner_id != Some(user.id) {
            return Err(AppError::Forbidden(
                "only the reporting owner can mark this item returned".into(),
            ));
        }
        self.transition(item, ItemStatus::Returned).await
    }

    /// Admin-only transition for found items: open -> resolved.
    pub async fn mark_resolved(&self, id: Uuid, user: &SessionUser) -> Result<Item> {
        let item = self.require_item(id).await?;
        if item.kind != ItemKind::Found {
            return Err(AppError::Validation(
                "only found items can be marked resolved".into(),
            ));
        }
        if !user.email.eq_ignore_ascii_case(&self.admin_email) {
            return Err(AppError::Forbidden(
                "only the lost-and-found office can resolve found items".into(),
            ));
        }
        self.transition(item, ItemStatus::Resolved).await
    }

    async fn require_item(&self, id: Uuid) -> Result<Item> {
        self.items
            .get_item(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Item".into(), id.to_string()))
    }

    async fn transition(&self, mut item: Item, next: ItemStatus) -> Result<Item> {
        if !item.status.can_transition_to(next) {
            return Err(AppError::Validation(format!(
                "cannot move item {} from {} to {}",
                item.id, item.status, next
            )));
        }
        self.items.update_status(item.id, next).await?;
        item.status = next;
        Ok(item)
    }
}

fn validate(draft: &ItemDraft) -> Result<cf_core::models::Category> {
    if draft.name.trim().chars().count() < MIN_NAME_CHARS {
        return Err(AppError::Validation(
            "item name must be at least 2 characters".into(),
        ));
    }
    if draft.description.trim().chars().count() < MIN_DESCRIPTION_CHARS {
        return Err(AppError::Validation(
            "description must be at least 10 characters".into(),
        ));
    }
    if draft.location.trim().chars().count() < MIN_LOCATION_CHARS {
        return Err(AppError::Validation(
            "please specify where the item was lost or found".into(),
        ));
    }
    draft.category.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{session_user, wallet_draft, MemoryStore};
    use cf_core::models::Category;

    fn service(store: Arc<MemoryStore>) -> ItemLifecycle {
        ItemLifecycle::new(store, "office@campus.edu".to_string())
    }

    #[tokio::test]
    async fn submit_assigns_open_status_and_placeholder_image() {
        let store = Arc::new(MemoryStore::default());
        let svc = service(store.clone());
        let user = session_user();

        let item = svc
            .submit(ItemKind::Found, wallet_draft(), &user)
            .await
            .unwrap();

        assert_eq!(item.status, ItemStatus::Open);
        assert_eq!(item.kind, ItemKind::Found);
        assert_eq!(item.category, Category::Wallets);
        assert_eq!(item.owner_id, Some(user.id));
        assert!(item.image.display_url().unwrap().contains("picsum.photos"));
        assert_eq!(store.items.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn submit_keeps_inline_image() {
        let svc = service(Arc::new(MemoryStore::default()));
        let mut draft = wallet_draft();
        draft.image = ItemImage::Inline {
            data: "aGVsbG8=".into(),
            mime_type: "image/jpeg".into(),
        };

        let item = svc
            .submit(ItemKind::Lost, draft, &session_user())
            .await
            .unwrap();
        assert!(item.image.as_inline().is_some());
    }

    #[tokio::test]
    async fn submit_rejects_short_description() {
        let svc = service(Arc::new(MemoryStore::default()));
        let mut draft = wallet_draft();
        draft.description = "too short".into();

        let err = svc
            .submit(ItemKind::Lost, draft, &session_user())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn submit_rejects_unknown_category() {
        let svc = service(Arc::new(MemoryStore::default()));
        let mut draft = wallet_draft();
        draft.category = "jewelry".into();

        let err = svc
            .submit(ItemKind::Found, draft, &session_user())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn mark_returned_enforces_ownership() {
        let store = Arc::new(MemoryStore::default());
        let svc = service(store.clone());
        let owner = session_user();
        let stranger = session_user();

        let item = svc
            .submit(ItemKind::Lost, wallet_draft(), &owner)
            .await
            .unwrap();

        let err = svc.mark_returned(item.id, &stranger).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let returned = svc.mark_returned(item.id, &owner).await.unwrap();
        assert_eq!(returned.status, ItemStatus::Returned);
        assert_eq!(
            store.items.lock().unwrap()[0].status,
            ItemStatus::Returned
        );
    }

    #[tokio::test]
    async fn mark_returned_rejects_found_items() {
        let svc = service(Arc::new(MemoryStore::default()));
        let owner = session_user();
        let item = svc
            .submit(ItemKind::Found, wallet_draft(), &owner)
            .await
            .unwrap();

        let err = svc.mark_returned(item.id, &owner).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn mark_resolved_requires_the_office_identity() {
        let svc = service(Arc::new(MemoryStore::default()));
        let reporter = session_user();
        let item = svc
            .submit(ItemKind::Found, wallet_draft(), &reporter)
            .await
            .unwrap();

        let err = svc.mark_resolved(item.id, &reporter).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let office = SessionUser {
            id: Uuid::now_v7(),
            email: "Office@Campus.edu".to_string(),
            full_name: "Lost & Found Office".to_string(),
        };
        let resolved = svc.mark_resolved(item.id, &office).await.unwrap();
        assert_eq!(resolved.status, ItemStatus::Resolved);
    }

    #[tokio::test]
    async fn closed_items_never_reopen() {
        let svc = service(Arc::new(MemoryStore::default()));
        let owner = session_user();
        let item = svc
            .submit(ItemKind::Lost, wallet_draft(), &owner)
            .await
            .unwrap();
        svc.mark_returned(item.id, &owner).await.unwrap();

        let err = svc.mark_returned(item.id, &owner).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn transition_on_missing_item_is_not_found() {
        let svc = service(Arc::new(MemoryStore::default()));
        let err = svc
            .mark_returned(Uuid::now_v7(), &session_user())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_, _)));
    }
}
