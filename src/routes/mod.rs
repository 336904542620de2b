pub mod auth;
pub mod contact;
pub mod conversations;
pub mod health;
pub mod messages;
pub mod profiles;

use crate::middleware::error_handling;
use actix_web::web;

/// Register every route plus the extractor configs that turn malformed
/// bodies, query strings and path segments into VALIDATION responses.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error_handling::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error_handling::query_error_handler))
        .app_data(web::PathConfig::default().error_handler(error_handling::path_error_handler))
        .service(health::health)
        .service(health::metrics)
        .service(
            web::scope("/api")
                .configure(auth::configure)
                .configure(profiles::configure)
                .configure(conversations::configure)
                .configure(messages::configure)
                .configure(contact::configure),
        );
}
