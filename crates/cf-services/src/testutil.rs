//! In-memory fakes for the cf-core ports, shared by the service tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use cf_core::error::{AppError, Result};
use cf_core::models::*;
use cf_core::traits::*;

/// Mutex-backed item/profile/credential store.
#[derive(Default)]
pub struct MemoryStore {
    pub items: Mutex<Vec<Item>>,
    pub profiles: Mutex<Vec<UserProfile>>,
    pub credentials: Mutex<Vec<Credential>>,
    /// When set, profile writes fail; exercises the sign-up rollback path.
    pub fail_profile_writes: bool,
}

#[async_trait]
impl ItemRepo for MemoryStore {
    async fn list_items(&self, kind: ItemKind, status: Option<ItemStatus>) -> Result<Vec<Item>> {
        let mut out: Vec<Item> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.kind == kind && status.map_or(true, |s| i.status == s))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn get_item(&self, id: Uuid) -> Result<Option<Item>> {
        Ok(self.items.lock().unwrap().iter().find(|i| i.id == id).cloned())
    }

    async fn create_item(&self, item: &Item) -> Result<()> {
        self.items.lock().unwrap().push(item.clone());
        Ok(())
    }

    async fn update_status(&self, id: Uuid, status: ItemStatus) -> Result<()> {
        let mut items = self.items.lock().unwrap();
        match items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.status = status;
                Ok(())
            }
            None => Err(AppError::NotFound("Item".into(), id.to_string())),
        }
    }
}

#[async_trait]
impl ProfileRepo for MemoryStore {
    async fn create_profile(&self, profile: &UserProfile) -> Result<()> {
        if self.fail_profile_writes {
            return Err(AppError::StoreUnavailable("profile write refused".into()));
        }
        self.profiles.lock().unwrap().push(profile.clone());
        Ok(())
    }

    async fn get_profile(&self, id: Uuid) -> Result<Option<UserProfile>> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create_credential(&self, credential: &Credential) -> Result<()> {
        let mut creds = self.credentials.lock().unwrap();
        if creds.iter().any(|c| c.email == credential.email) {
            return Err(AppError::Conflict(format!(
                "email already registered: {}",
                credential.email
            )));
        }
        creds.push(credential.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>> {
        Ok(self
            .credentials
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.email == email)
            .cloned())
    }

    async fn delete_credential(&self, user_id: Uuid) -> Result<()> {
        self.credentials.lock().unwrap().retain(|c| c.user_id != user_id);
        Ok(())
    }
}

/// Judge fake that counts calls and replays canned verdicts.
pub struct CountingJudge {
    pub pair_calls: AtomicUsize,
    pub similar_calls: AtomicUsize,
    pub judgment: MatchJudgment,
    /// Ids returned per judge_similar call; empty means echo the whole chunk.
    pub similar_ids: Vec<Uuid>,
}

impl Default for CountingJudge {
    fn default() -> Self {
        CountingJudge {
            pair_calls: AtomicUsize::new(0),
            similar_calls: AtomicUsize::new(0),
            judgment: MatchJudgment {
                probability: 0.75,
                reasoning: "same brand and color".to_string(),
            },
            similar_ids: Vec::new(),
        }
    }
}

#[async_trait]
impl MatchJudge for CountingJudge {
    async fn judge_pair(&self, _request: &PairRequest) -> Result<MatchJudgment> {
        self.pair_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.judgment.clone())
    }

    async fn judge_similar(&self, _source: &Candidate, pool: &[Candidate]) -> Result<Vec<Uuid>> {
        self.similar_calls.fetch_add(1, Ordering::SeqCst);
        if self.similar_ids.is_empty() {
            Ok(pool.iter().map(|c| c.id).collect())
        } else {
            Ok(self.similar_ids.clone())
        }
    }
}

/// Plaintext "hasher" and transparent tokens; crypto is the adapter's job.
pub struct PlainAuth;

impl SessionAuth for PlainAuth {
    fn hash_password(&self, password: &str) -> Result<String> {
        Ok(format!("plain:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> bool {
        hash == format!("plain:{password}")
    }

    fn issue_token(&self, user_id: Uuid) -> String {
        format!("token:{user_id}")
    }

    fn verify_token(&self, token: &str) -> Option<Uuid> {
        token.strip_prefix("token:")?.parse().ok()
    }
}

pub fn session_user() -> SessionUser {
    SessionUser {
        id: Uuid::now_v7(),
        email: "sam@campus.edu".to_string(),
        full_name: "Sam Reyes".to_string(),
    }
}

pub fn wallet_draft() -> ItemDraft {
    ItemDraft {
        name: "Black Wallet".to_string(),
        category: "wallets".to_string(),
        description: "leather bifold, ten+ chars".to_string(),
        location: "Library".to_string(),
        image: ItemImage::None,
        phone: None,
        submitted_to_office: false,
    }
}
