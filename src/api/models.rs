//! HTTP request/response models that are not domain transfer objects

use actix_web::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::ContactInfo;

pub const STATUS_201: &str = "201";
pub const MESSAGE_201: &str = "Account created successfully";
pub const STATUS_200: &str = "200";
pub const MESSAGE_200: &str = "Request processed successfully";
pub const STATUS_417: &str = "417";
pub const MESSAGE_417_UPDATE: &str = "Update operation failed. Please contact Dev team";
pub const MESSAGE_417_DELETE: &str = "Delete operation failed. Please contact Dev team";

/// Body of every successful write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDto {
    pub status_code: String,
    pub status_msg: String,
}

impl ResponseDto {
    pub fn new(status_code: &str, status_msg: &str) -> Self {
        Self {
            status_code: status_code.to_string(),
            status_msg: status_msg.to_string(),
        }
    }
}

/// Body of every translated failure except field validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponseDto {
    pub api_path: String,
    pub error_code: String,
    pub error_message: String,
    pub error_time: DateTime<Utc>,
}

impl ErrorResponseDto {
    pub fn new(api_path: impl Into<String>, status: StatusCode, error_message: impl Into<String>) -> Self {
        Self {
            api_path: api_path.into(),
            error_code: status_name(status),
            error_message: error_message.into(),
            error_time: Utc::now(),
        }
    }
}

/// `mobileNumber` query string of fetch and delete
#[derive(Debug, Clone, Deserialize)]
pub struct MobileNumberQuery {
    #[serde(rename = "mobileNumber")]
    pub mobile_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfoDto {
    pub message: String,
    pub contact_details: BTreeMap<String, String>,
    pub on_call_support: Vec<String>,
}

impl From<&ContactInfo> for ContactInfoDto {
    fn from(info: &ContactInfo) -> Self {
        Self {
            message: info.message.clone(),
            contact_details: info.contact_details.clone(),
            on_call_support: info.on_call_support.clone(),
        }
    }
}

/// "Not Found" -> "NOT_FOUND"
pub fn status_name(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => reason.to_uppercase().replace(' ', "_"),
        None => status.as_str().to_string(),
    }
}
