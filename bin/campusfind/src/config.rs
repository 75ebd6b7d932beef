//! Startup configuration, read once from the environment.
//!
//! Debug builds fall back to obviously-placeholder development defaults with
//! a warning; release builds refuse to start on a missing value so a
//! misconfigured deployment fails loudly instead of running against dummies.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_url: String,
    pub session_secret: String,
    /// The single allow-listed address permitted to resolve found items.
    pub admin_email: String,
    pub genai_base_url: String,
    pub genai_api_key: String,
    pub genai_model: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            bind_addr: env_or("CF_BIND_ADDR", "127.0.0.1:8080")?,
            database_url: env_or("DATABASE_URL", "sqlite:campusfind.db")?,
            session_secret: env_or("CF_SESSION_SECRET", "dev-session-secret")?,
            admin_email: env_or("CF_ADMIN_EMAIL", "office@campus.edu")?,
            genai_base_url: env_or(
                "GENAI_BASE_URL",
                "https://generativelanguage.googleapis.com",
            )?,
            genai_api_key: env_or("GENAI_API_KEY", "dev-placeholder-key")?,
            genai_model: env_or("GENAI_MODEL", "gemini-2.0-flash")?,
        })
    }
}

fn env_or(key: &str, dev_default: &str) -> anyhow::Result<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ if cfg!(debug_assertions) => {
            log::warn!("{key} not set; using development default {dev_default:?}");
            Ok(dev_default.to_string())
        }
        _ => anyhow::bail!("{key} must be set in a production build"),
    }
}
