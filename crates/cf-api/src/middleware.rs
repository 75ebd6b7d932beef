//! campusfind/crates/cf-api/src/middleware.rs
//!
//! Custom middleware for logging and traffic control.

use actix_cors::Cors;
use actix_web::middleware::Logger;

// Returns the standard request logger for the CampusFind API.
pub fn standard_middleware() -> Logger {
    // The 'default' logger outputs:
    // remote-ip "request-line" status-code response-size "referrer" "user-agent"
    Logger::default()
}

// Configures CORS (Cross-Origin Resource Sharing)
// Important if the UI and API ever live on different subdomains.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_header()
        .allowed_methods(vec!["GET", "POST"])
        .max_age(3600)
}
