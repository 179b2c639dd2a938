// ============================================================================
// API Layer - HTTP plumbing over the accounts service
// ============================================================================
//
// - handlers:   one function per route
// - error:      ApiError, the single failure -> response translation point
// - middleware: per-request tracing span, request counter
// - models:     response bodies that are not domain dtos
//
// ============================================================================

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;

use actix_web::web;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::accounts::{AccountsError, AccountsService};
use crate::metrics::{self, Metrics};
use crate::store::Repository;

pub use error::ApiError;

/// Shared by every worker
pub struct AppState {
    pub service: AccountsService,
    pub repository: Arc<dyn Repository>,
    pub config: Arc<AppConfig>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(repository: Arc<dyn Repository>, config: Arc<AppConfig>, metrics: Arc<Metrics>) -> Self {
        let service = AccountsService::new(repository.clone(), config.accounts.clone(), metrics.clone());
        Self {
            service,
            repository,
            config,
            metrics,
        }
    }
}

/// Register routes and extractor error handlers
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, req| {
        ApiError::new(req, AccountsError::MalformedRequest(err.to_string())).into()
    });
    let query_config = web::QueryConfig::default().error_handler(|err, req| {
        ApiError::new(req, AccountsError::MalformedRequest(err.to_string())).into()
    });

    cfg.app_data(json_config)
        .app_data(query_config)
        .service(endpoint("/health", web::get().to(metrics::health_handler)))
        .service(endpoint("/metrics", web::get().to(metrics::metrics_handler)))
        .service(
            web::scope("/api")
                .service(endpoint("/create", web::post().to(handlers::create_account)))
                .service(endpoint("/fetch", web::get().to(handlers::fetch_account)))
                .service(endpoint("/update", web::put().to(handlers::update_account)))
                .service(endpoint("/delete", web::delete().to(handlers::delete_account)))
                .service(endpoint("/build-info", web::get().to(handlers::build_info)))
                .service(endpoint("/contact-info", web::get().to(handlers::contact_info))),
        )
        .default_service(web::to(handlers::route_not_found));
}

/// A single-method resource answering other methods with a structured 405
fn endpoint(path: &str, route: actix_web::Route) -> actix_web::Resource {
    web::resource(path)
        .route(route)
        .default_service(web::to(handlers::method_not_allowed))
}

// ============================================================================
// HTTP Tests
// ============================================================================
