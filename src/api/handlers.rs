// 🌐 Route handlers and their JSON shapes

use super::error::{ApiError, MessageBody};
use super::AppState;
use crate::code::{institution_prefix, is_headquarter_suffix, is_well_formed_prefix, COUNTRY_CODE_LEN, CODE_LEN};
use crate::directory::{BankWithBranches, CountryListing, DirectoryService};
use crate::entities::BankRecord;
use crate::error::DirectoryResult;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Json};
use serde::{Deserialize, Serialize};

// ============================================================================
// Response / request bodies
// ============================================================================

/// One record as listed under a country or a headquarters
#[derive(Debug, Serialize)]
pub struct BankSummary {
    pub address: String,
    #[serde(rename = "bankName")]
    pub bank_name: String,
    #[serde(rename = "countryISO2")]
    pub country_code: String,
    #[serde(rename = "isHeadquarter")]
    pub is_headquarter: bool,
    #[serde(rename = "swiftCode")]
    pub swift_code: String,
}

impl From<BankRecord> for BankSummary {
    fn from(record: BankRecord) -> Self {
        Self {
            is_headquarter: record.is_headquarters(),
            address: record.address.unwrap_or_default(),
            bank_name: record.name,
            country_code: record.country_code,
            swift_code: record.code,
        }
    }
}

/// GET /v1/swift-codes/{code}
#[derive(Debug, Serialize)]
pub struct BankDetails {
    pub address: String,
    #[serde(rename = "bankName")]
    pub bank_name: String,
    #[serde(rename = "countryISO2")]
    pub country_code: String,
    #[serde(rename = "countryName")]
    pub country_name: String,
    #[serde(rename = "isHeadquarter")]
    pub is_headquarter: bool,
    #[serde(rename = "swiftCode")]
    pub swift_code: String,
    /// Present for headquarters only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<BankSummary>>,
}

impl From<BankWithBranches> for BankDetails {
    fn from(found: BankWithBranches) -> Self {
        let BankWithBranches { record, branches } = found;
        let is_headquarter = record.is_headquarters();
        Self {
            address: record.address.unwrap_or_default(),
            bank_name: record.name,
            country_code: record.country_code,
            country_name: record.country_name.unwrap_or_default(),
            is_headquarter,
            swift_code: record.code,
            branches: is_headquarter.then(|| branches.into_iter().map(BankSummary::from).collect()),
        }
    }
}

/// GET /v1/swift-codes/country/{iso2}
#[derive(Debug, Serialize)]
pub struct CountryCodes {
    #[serde(rename = "countryISO2")]
    pub country_code: String,
    #[serde(rename = "countryName")]
    pub country_name: String,
    #[serde(rename = "swiftCodes")]
    pub swift_codes: Vec<BankSummary>,
}

impl From<CountryListing> for CountryCodes {
    fn from(listing: CountryListing) -> Self {
        Self {
            country_code: listing.country_code,
            country_name: listing.country_name,
            swift_codes: listing.records.into_iter().map(BankSummary::from).collect(),
        }
    }
}

/// POST /v1/swift-codes
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateBankRequest {
    pub address: String,
    #[serde(rename = "bankName")]
    pub bank_name: String,
    #[serde(rename = "countryISO2")]
    pub country_code: String,
    #[serde(rename = "countryName")]
    pub country_name: String,
    #[serde(rename = "swiftCode")]
    pub swift_code: String,
}

impl From<CreateBankRequest> for BankRecord {
    fn from(req: CreateBankRequest) -> Self {
        BankRecord::new(req.swift_code, req.country_code, req.bank_name)
            .with_address(req.address)
            .with_country_name(req.country_name)
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Run a directory call on the blocking pool; the stores are synchronous.
async fn run_blocking<T, F>(state: &AppState, call: F) -> Result<T, ApiError>
where
    F: FnOnce(&DirectoryService) -> DirectoryResult<T> + Send + 'static,
    T: Send + 'static,
{
    let service = state.service.clone();
    tokio::task::spawn_blocking(move || call(&service))
        .await
        .map_err(|e| ApiError::Internal(format!("worker task failed: {}", e)))?
        .map_err(ApiError::from)
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /v1/swift-codes/{code}
pub async fn get_swift_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<BankDetails>, ApiError> {
    if code.chars().count() != CODE_LEN {
        return Err(ApiError::BadRequest("Invalid Swift code format".to_string()));
    }

    let found = run_blocking(&state, move |service| service.get_with_branches(&code)).await?;
    Ok(Json(found.into()))
}

/// GET /v1/swift-codes/country/{iso2}
pub async fn get_country_codes(
    State(state): State<AppState>,
    Path(country): Path<String>,
) -> Result<Json<CountryCodes>, ApiError> {
    if country.chars().count() != COUNTRY_CODE_LEN {
        return Err(ApiError::BadRequest("Invalid country code format".to_string()));
    }

    let listing = run_blocking(&state, move |service| service.list_by_country(&country)).await?;
    Ok(Json(listing.into()))
}

/// POST /v1/swift-codes
pub async fn create_swift_code(
    State(state): State<AppState>,
    body: Result<Json<CreateBankRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body.map_err(|_| ApiError::BadRequest("Invalid request body".to_string()))?;
    let record = BankRecord::from(request);

    run_blocking(&state, move |service| service.create(record)).await?;
    Ok((StatusCode::CREATED, Json(MessageBody::new("Bank added successfully"))))
}

/// DELETE /v1/swift-codes/{code}
pub async fn delete_swift_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    let code = code.trim().to_string();
    if code.is_empty() {
        return Err(ApiError::BadRequest("Missing SWIFT code".to_string()));
    }
    // A group delete needs a real 8-character prefix
    if is_headquarter_suffix(&code) && !is_well_formed_prefix(institution_prefix(&code)) {
        return Err(ApiError::BadRequest("Failed to delete bank".to_string()));
    }

    run_blocking(&state, move |service| service.remove(&code)).await?;
    Ok(Json(MessageBody::new("Successfully deleted")))
}

/// Anything no route claims
pub async fn route_not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::NotFound(format!("Route {} {} not found", method, uri.path()))
}
