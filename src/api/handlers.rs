//! HTTP request handlers for the accounts API

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};

use super::error::ApiError;
use super::models::*;
use super::AppState;
use crate::domain::accounts::{validate_mobile_number, AccountsError, CustomerDto, Validate};

/// Open an account for a new customer
pub async fn create_account(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<CustomerDto>,
) -> Result<HttpResponse, ApiError> {
    let customer_dto = body.into_inner();
    customer_dto
        .validate()
        .map_err(|e| ApiError::new(&req, e.into()))?;

    state
        .service
        .create_account(&customer_dto)
        .await
        .map_err(ApiError::at(&req))?;

    Ok(HttpResponse::Created().json(ResponseDto::new(STATUS_201, MESSAGE_201)))
}

/// Customer and account details by mobile number
pub async fn fetch_account(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<MobileNumberQuery>,
) -> Result<HttpResponse, ApiError> {
    let mobile_number = checked_mobile_number(&req, query.into_inner())?;

    let customer_dto = state
        .service
        .fetch_account(&mobile_number)
        .await
        .map_err(ApiError::at(&req))?;

    Ok(HttpResponse::Ok().json(customer_dto))
}

/// Update account and customer details
pub async fn update_account(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<CustomerDto>,
) -> Result<HttpResponse, ApiError> {
    let customer_dto = body.into_inner();
    customer_dto
        .validate()
        .map_err(|e| ApiError::new(&req, e.into()))?;

    let updated = state
        .service
        .update_account(&customer_dto)
        .await
        .map_err(ApiError::at(&req))?;

    if updated {
        Ok(HttpResponse::Ok().json(ResponseDto::new(STATUS_200, MESSAGE_200)))
    } else {
        Ok(HttpResponse::ExpectationFailed().json(ResponseDto::new(STATUS_417, MESSAGE_417_UPDATE)))
    }
}

/// Delete the customer and their accounts by mobile number
pub async fn delete_account(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<MobileNumberQuery>,
) -> Result<HttpResponse, ApiError> {
    let mobile_number = checked_mobile_number(&req, query.into_inner())?;

    let deleted = state
        .service
        .delete_account(&mobile_number)
        .await
        .map_err(ApiError::at(&req))?;

    if deleted {
        Ok(HttpResponse::Ok().json(ResponseDto::new(STATUS_200, MESSAGE_200)))
    } else {
        Ok(HttpResponse::ExpectationFailed().json(ResponseDto::new(STATUS_417, MESSAGE_417_DELETE)))
    }
}

pub async fn build_info(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(state.config.build.version.clone())
}

pub async fn contact_info(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ContactInfoDto::from(&state.config.contact_info))
}

/// Fallback for paths with no route
pub async fn route_not_found(req: HttpRequest) -> HttpResponse {
    unrouted(&req, StatusCode::NOT_FOUND)
}

/// Fallback for a known path hit with the wrong method
pub async fn method_not_allowed(req: HttpRequest) -> HttpResponse {
    unrouted(&req, StatusCode::METHOD_NOT_ALLOWED)
}

fn unrouted(req: &HttpRequest, status: StatusCode) -> HttpResponse {
    tracing::debug!(method = %req.method(), path = %req.path(), status = status.as_u16(), "No route");
    HttpResponse::build(status).json(ErrorResponseDto::new(
        format!("uri={}", req.path()),
        status,
        format!("No handler for {} {}", req.method(), req.path()),
    ))
}

fn checked_mobile_number(req: &HttpRequest, query: MobileNumberQuery) -> Result<String, ApiError> {
    validate_mobile_number("mobileNumber", &query.mobile_number)
        .map_err(|e| ApiError::new(req, AccountsError::from(e)))?;
    Ok(query.mobile_number)
}
