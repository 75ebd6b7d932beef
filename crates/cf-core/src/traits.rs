//! # Core Traits (Ports)
//!
//! Any adapter must implement these traits to be wired into the binary.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Candidate, Credential, Item, ItemKind, ItemStatus, MatchJudgment, PairRequest, UserProfile,
};

/// Data persistence contract for item reports.
#[async_trait]
pub trait ItemRepo: Send + Sync {
    /// Lists reports of one kind, newest first, optionally narrowed to a
    /// single status. A rejected read surfaces as `StoreUnavailable`; an
    /// empty Ok result really means no data.
    async fn list_items(&self, kind: ItemKind, status: Option<ItemStatus>) -> Result<Vec<Item>>;

    async fn get_item(&self, id: Uuid) -> Result<Option<Item>>;

    async fn create_item(&self, item: &Item) -> Result<()>;

    /// Writes a new status. Fails with `NotFound` when the id does not
    /// exist. Authorization is the lifecycle service's concern, not the
    /// store's.
    async fn update_status(&self, id: Uuid, status: ItemStatus) -> Result<()>;
}

/// Profile records linked 1:1 to credentials.
#[async_trait]
pub trait ProfileRepo: Send + Sync {
    async fn create_profile(&self, profile: &UserProfile) -> Result<()>;
    async fn get_profile(&self, id: Uuid) -> Result<Option<UserProfile>>;
}

/// Credential persistence for the email+password flow.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn create_credential(&self, credential: &Credential) -> Result<()>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>>;
    /// Removes a credential again; used to roll back a half-finished sign-up.
    async fn delete_credential(&self, user_id: Uuid) -> Result<()>;
}

/// Password hashing and session-token contract.
pub trait SessionAuth: Send + Sync {
    fn hash_password(&self, password: &str) -> Result<String>;
    fn verify_password(&self, password: &str, hash: &str) -> bool;
    fn issue_token(&self, user_id: Uuid) -> String;
    /// Returns the user id for a valid, unexpired token. Tampered or expired
    /// tokens yield `None`, never an error.
    fn verify_token(&self, token: &str) -> Option<Uuid>;
}

/// The external AI judgment boundary. Potentially slow, potentially failing,
/// stateless across calls.
#[async_trait]
pub trait MatchJudge: Send + Sync {
    /// Scores one lost/found pair from descriptions and optional images.
    async fn judge_pair(&self, request: &PairRequest) -> Result<MatchJudgment>;

    /// Picks the ids from `pool` the model considers plausible matches for
    /// `source`. Callers bound the pool size per call.
    async fn judge_similar(&self, source: &Candidate, pool: &[Candidate]) -> Result<Vec<Uuid>>;
}
