//! Rental request API endpoints.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::db::{
    actions, requests, resource_types, CreateRentalRequest, RentalRequestResponse, RequestStatus,
    UpdateRequestStatusRequest, User,
};
use crate::AppState;

use super::audit::{audit_log, extract_client_ip};
use super::error::ApiError;
use super::validation::validate_uuid;

/// Create a request on a property as the calling tenant
pub async fn create_request(
    State(state): State<Arc<AppState>>,
    user: User,
    headers: HeaderMap,
    Json(req): Json<CreateRentalRequest>,
) -> Result<(StatusCode, Json<RentalRequestResponse>), ApiError> {
    if let Err(e) = validate_uuid(&req.property_id, "property_id") {
        return Err(ApiError::validation_field("property_id", e));
    }

    let request = requests::create(&state.db, &user.id, &req.property_id, &req.message)
        .await
        .map_err(ApiError::from_mutation)?;

    let ip = extract_client_ip(&headers, None);
    audit_log(
        &state,
        actions::REQUEST_CREATE,
        resource_types::REQUEST,
        Some(&request.id),
        None,
        Some(&user.id),
        ip.as_deref(),
        Some(serde_json::json!({ "property_id": req.property_id })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(request)))
}

/// List the caller's own requests, newest first
pub async fn list_tenant_requests(
    State(state): State<Arc<AppState>>,
    user: User,
) -> Result<Json<Vec<RentalRequestResponse>>, ApiError> {
    let results = requests::list_for_tenant(&state.db, &user.id).await?;
    Ok(Json(results))
}

/// List requests against any of the caller's properties, newest first
pub async fn list_landlord_requests(
    State(state): State<Arc<AppState>>,
    user: User,
) -> Result<Json<Vec<RentalRequestResponse>>, ApiError> {
    let results = requests::list_for_landlord(&state.db, &user.id).await?;
    Ok(Json(results))
}

/// Get a single request, fully populated (public)
pub async fn get_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RentalRequestResponse>, ApiError> {
    let request = requests::get(&state.db, &id).await?;
    Ok(Json(request))
}

/// Approve or reject a request (landlord of the referenced property only)
pub async fn update_request_status(
    State(state): State<Arc<AppState>>,
    user: User,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<UpdateRequestStatusRequest>,
) -> Result<Json<RentalRequestResponse>, ApiError> {
    if let Err(e) = validate_uuid(&id, "request_id") {
        return Err(ApiError::validation_field("request_id", e));
    }

    let status: RequestStatus = req.status.parse().map_err(|_| {
        ApiError::validation_field("status", "Status must be either approved or rejected")
    })?;

    let request = requests::transition_status(&state.db, &id, &user.id, status)
        .await
        .map_err(ApiError::from_mutation)?;

    let ip = extract_client_ip(&headers, None);
    audit_log(
        &state,
        actions::REQUEST_STATUS,
        resource_types::REQUEST,
        Some(&request.id),
        None,
        Some(&user.id),
        ip.as_deref(),
        Some(serde_json::json!({ "status": request.status })),
    )
    .await;

    Ok(Json(request))
}
