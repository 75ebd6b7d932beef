//! # cf-api
//!
//! The web routing and orchestration layer for CampusFind.

pub mod handlers;
pub mod middleware;

use actix_web::web;

/// Configures the routes for the application.
///
/// # Developer Note
/// We use a scoped configuration to allow the main binary to mount
/// the API under different paths if needed (e.g., /api/v1/).
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/items/{kind}", web::get().to(handlers::list_items))
            .route("/items/{kind}", web::post().to(handlers::create_item))
            .route("/items/{id}/returned", web::post().to(handlers::mark_returned))
            .route("/items/{id}/resolved", web::post().to(handlers::mark_resolved))
            .route("/items/{id}/similar", web::post().to(handlers::find_similar))
            .route("/match", web::post().to(handlers::match_pair))
            .route("/auth/signup", web::post().to(handlers::sign_up))
            .route("/auth/signin", web::post().to(handlers::sign_in))
            .route("/auth/session", web::get().to(handlers::session)),
    )
    // Server-rendered listing pages
    .route("/", web::get().to(handlers::index_page))
    .route("/items", web::get().to(handlers::items_page));
}
