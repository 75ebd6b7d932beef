//! # cf-services
//!
//! The application services sitting between the HTTP layer and the ports:
//! item lifecycle, AI matching gateway, and auth sessions. Each service
//! holds its collaborators as `Arc<dyn Trait>` handles injected at startup.

pub mod lifecycle;
pub mod matching;
pub mod sessions;

pub use lifecycle::ItemLifecycle;
pub use matching::MatchGateway;
pub use sessions::AuthSessions;

#[cfg(test)]
pub(crate) mod testutil;
