//! HTTP inbound adapter exposing the REST endpoints under `/api/v1`.

use actix_web::web;

pub mod blogs;
pub mod error;
pub mod health;
pub mod images;
pub mod multipart;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::{ApiResult, json_error_handler, path_error_handler, query_error_handler};

/// Mount the account, blog and image routes, with extractor failures
/// reported in the shared error envelope.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .configure(users::configure)
        .configure(blogs::configure)
        .configure(images::configure);
}
