//! # CampusFind Binary
//!
//! The entry point that assembles the application based on compile-time
//! features. Adapters are constructed once here and injected into the
//! services; nothing else holds a global handle.

mod config;

use actix_web::{web, App, HttpServer};
use std::sync::Arc;

use cf_api::handlers::AppState;
use cf_api::middleware;
use cf_services::{AuthSessions, ItemLifecycle, MatchGateway};
use config::Config;

// Feature-gated imports: this is the "compiled-to-order" seam
#[cfg(feature = "db-sqlite")]
use cf_db_sqlite::SqliteStore;

#[cfg(feature = "auth-simple")]
use cf_auth_simple::SimpleSessionAuth;

#[cfg(feature = "judge-genai")]
use cf_judge_genai::GenAiJudge;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cfg = Config::from_env()?;

    // 1. Persistence implementation
    #[cfg(feature = "db-sqlite")]
    let store = Arc::new(SqliteStore::new(&cfg.database_url).await?);

    // 2. Auth implementation
    #[cfg(feature = "auth-simple")]
    let auth = Arc::new(SimpleSessionAuth::new(&cfg.session_secret));

    // 3. AI judgment implementation
    #[cfg(feature = "judge-genai")]
    let judge = Arc::new(GenAiJudge::new(
        &cfg.genai_base_url,
        &cfg.genai_api_key,
        &cfg.genai_model,
    )?);

    // 4. Services over the ports (dynamic dispatch at the seams)
    let state = web::Data::new(AppState {
        items: store.clone(),
        lifecycle: ItemLifecycle::new(store.clone(), cfg.admin_email.clone()),
        matching: MatchGateway::new(store.clone(), judge),
        sessions: AuthSessions::new(store.clone(), store.clone(), auth),
    });

    log::info!("CampusFind starting on http://{}", cfg.bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::standard_middleware())
            .wrap(middleware::cors_policy())
            .configure(cf_api::configure_routes)
    })
    .bind(&cfg.bind_addr)?
    .run()
    .await?;

    Ok(())
}
