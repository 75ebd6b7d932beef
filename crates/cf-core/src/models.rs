//! # Domain Models
//!
//! Core entities of CampusFind. We use UUID v7 for time-ordered, globally
//! unique identification; the creation timestamp drives the default
//! newest-first listing sort.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;

/// Lost vs. found classification of a report. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Lost,
    Found,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Lost => "lost",
            ItemKind::Found => "found",
        }
    }

    /// The kind a matching candidate must have (lost pairs with found).
    pub fn opposite(&self) -> ItemKind {
        match self {
            ItemKind::Lost => ItemKind::Found,
            ItemKind::Found => ItemKind::Lost,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lost" => Ok(ItemKind::Lost),
            "found" => Ok(ItemKind::Found),
            other => Err(AppError::Validation(format!("unknown item kind: {other}"))),
        }
    }
}

/// Lifecycle state of a report. Transitions are one-directional:
/// `open -> returned` (lost items) or `open -> resolved` (found items).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Open,
    Returned,
    Resolved,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Open => "open",
            ItemStatus::Returned => "returned",
            ItemStatus::Resolved => "resolved",
        }
    }

    /// Encodes the forward-only rule: an open report may close one way,
    /// a closed report never reopens.
    pub fn can_transition_to(&self, next: ItemStatus) -> bool {
        matches!(
            (self, next),
            (ItemStatus::Open, ItemStatus::Returned) | (ItemStatus::Open, ItemStatus::Resolved)
        )
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ItemStatus::Open)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(ItemStatus::Open),
            "returned" => Ok(ItemStatus::Returned),
            "resolved" => Ok(ItemStatus::Resolved),
            other => Err(AppError::Validation(format!("unknown item status: {other}"))),
        }
    }
}

/// The fixed category vocabulary offered by the report forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Electronics,
    Keys,
    Wallets,
    Books,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electronics => "electronics",
            Category::Keys => "keys",
            Category::Wallets => "wallets",
            Category::Books => "books",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "electronics" => Ok(Category::Electronics),
            "keys" => Ok(Category::Keys),
            "wallets" => Ok(Category::Wallets),
            "books" => Ok(Category::Books),
            "other" => Ok(Category::Other),
            other => Err(AppError::Validation(format!("unknown category: {other}"))),
        }
    }
}

/// Image reference attached to a report. Exactly one representation is
/// authoritative per record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemImage {
    /// Hosted image addressed by URL.
    Remote { url: String },
    /// Inline payload submitted with the form; `data` is base64-encoded.
    Inline { data: String, mime_type: String },
    #[default]
    None,
}

impl ItemImage {
    /// Cosmetic stand-in assigned when a report carries no image. The random
    /// identifier only varies the stock photo; it is not a content hash.
    pub fn placeholder() -> Self {
        ItemImage::Remote {
            url: format!("https://picsum.photos/400/300?random={}", Uuid::new_v4()),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ItemImage::None)
    }

    /// Inline payload for the AI judgment call, if this record carries one.
    pub fn as_inline(&self) -> Option<InlineImage> {
        match self {
            ItemImage::Inline { data, mime_type } => Some(InlineImage {
                data: data.clone(),
                mime_type: mime_type.clone(),
            }),
            _ => None,
        }
    }

    /// URL suitable for an `<img src>` attribute: remote URLs pass through,
    /// inline payloads render as data URIs.
    pub fn display_url(&self) -> Option<String> {
        match self {
            ItemImage::Remote { url } => Some(url.clone()),
            ItemImage::Inline { data, mime_type } => {
                Some(format!("data:{mime_type};base64,{data}"))
            }
            ItemImage::None => None,
        }
    }
}

/// A lost or found report record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub kind: ItemKind,
    pub status: ItemStatus,
    pub name: String,
    pub description: String,
    pub category: Category,
    /// Where the item was lost or found, free text.
    pub location: String,
    pub image: ItemImage,
    pub reporter_name: String,
    pub reporter_email: Option<String>,
    pub reporter_phone: Option<String>,
    /// Session identity that created the report.
    pub owner_id: Option<Uuid>,
    /// Found items physically handed in at the campus office.
    pub submitted_to_office: bool,
    pub created_at: DateTime<Utc>,
}

/// User-submitted form fields for a new report. Kind, status, id, timestamp
/// and reporter identity are assigned by the lifecycle service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub category: String,
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub image: ItemImage,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub submitted_to_office: bool,
}

/// Profile record created at sign-up, keyed by the credential's user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

/// Stored authentication credential. The hash never leaves the auth seam.
#[derive(Debug, Clone)]
pub struct Credential {
    pub user_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// The authenticated user context attached to requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
}

impl From<UserProfile> for SessionUser {
    fn from(p: UserProfile) -> Self {
        SessionUser {
            id: p.id,
            email: p.email,
            full_name: p.full_name,
        }
    }
}

/// The AI verdict for one lost/found pair. Ephemeral; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchJudgment {
    /// Probability that the pair is the same object, in [0, 1].
    pub probability: f64,
    pub reasoning: String,
}

impl MatchJudgment {
    /// Models occasionally return values a hair outside the schema range.
    pub fn clamped(mut self) -> Self {
        self.probability = self.probability.clamp(0.0, 1.0);
        self
    }
}

/// Inline image payload forwarded to the AI judge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineImage {
    pub data: String,
    pub mime_type: String,
}

/// Pairwise judgment request assembled by the matching gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairRequest {
    pub lost_description: String,
    pub lost_image: Option<InlineImage>,
    pub found_description: String,
    pub found_image: Option<InlineImage>,
}

/// One entry of the candidate pool for a find-similar call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: Category,
}

impl From<&Item> for Candidate {
    fn from(item: &Item) -> Self {
        Candidate {
            id: item.id,
            name: item.name.clone(),
            description: item.description.clone(),
            category: item.category,
        }
    }
}
