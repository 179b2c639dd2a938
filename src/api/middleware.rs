use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{web, Error};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use super::AppState;

/// Open a span per request and log/count its completion
pub async fn request_tracing(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let request_id = Uuid::new_v4();
    let method = req.method().to_string();
    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %req.path(),
    );
    let state = req.app_data::<web::Data<AppState>>().cloned();
    let started = Instant::now();

    let response = next.call(req).instrument(span.clone()).await?;

    let status = response.status().as_u16();
    if let Some(state) = state {
        state.metrics.record_http_request(&method, status);
    }

    span.in_scope(|| {
        tracing::info!(
            status,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Request completed"
        );
    });

    Ok(response)
}
