//! Property API endpoints: listings, search, and shortlists.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::db::{
    actions, properties, resource_types, CreatePropertyRequest, PropertyResponse,
    PropertySearchQuery, ShortlistStatusResponse, UpdatePropertyRequest, User,
};
use crate::AppState;

use super::audit::{audit_log, extract_client_ip};
use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{
    validate_address, validate_description, validate_images, validate_location, validate_price,
    validate_radius, validate_room_count, validate_title, validate_uuid,
};

/// Validate a CreatePropertyRequest
fn validate_create_request(req: &CreatePropertyRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_title(&req.title) {
        errors.add("title", &e);
    }

    if let Err(e) = validate_description(&req.description) {
        errors.add("description", &e);
    }

    if let Err(e) = validate_address(&req.address) {
        errors.add("address", &e);
    }

    if let Err(e) = validate_price(req.price) {
        errors.add("price", &e);
    }

    if let Err(e) = validate_room_count(req.bedrooms, "Bedrooms") {
        errors.add("bedrooms", &e);
    }

    if let Err(e) = validate_room_count(req.bathrooms, "Bathrooms") {
        errors.add("bathrooms", &e);
    }

    if let Err(e) = validate_location(&req.location) {
        errors.add("location", &e);
    }

    if let Err(e) = validate_images(&req.images) {
        errors.add("images", &e);
    }

    errors.finish()
}

/// Validate an UpdatePropertyRequest
fn validate_update_request(req: &UpdatePropertyRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Some(ref title) = req.title {
        if let Err(e) = validate_title(title) {
            errors.add("title", &e);
        }
    }

    if let Some(ref description) = req.description {
        if let Err(e) = validate_description(description) {
            errors.add("description", &e);
        }
    }

    if let Some(ref address) = req.address {
        if let Err(e) = validate_address(address) {
            errors.add("address", &e);
        }
    }

    if let Some(price) = req.price {
        if let Err(e) = validate_price(price) {
            errors.add("price", &e);
        }
    }

    if let Some(bedrooms) = req.bedrooms {
        if let Err(e) = validate_room_count(bedrooms, "Bedrooms") {
            errors.add("bedrooms", &e);
        }
    }

    if let Some(bathrooms) = req.bathrooms {
        if let Err(e) = validate_room_count(bathrooms, "Bathrooms") {
            errors.add("bathrooms", &e);
        }
    }

    if let Some(ref location) = req.location {
        if let Err(e) = validate_location(location) {
            errors.add("location", &e);
        }
    }

    if let Some(ref images) = req.images {
        if let Err(e) = validate_images(images) {
            errors.add("images", &e);
        }
    }

    errors.finish()
}

/// Validate search filters. A geo filter needs both coordinates; a lone
/// lat or lng is ignored, matching the original wire behavior.
fn validate_search_query(query: &PropertySearchQuery) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Some(center) = query.center() {
        if let Err(e) = validate_location(&center) {
            errors.add("location", &e);
        }
    }

    if let Some(radius) = query.radius {
        if let Err(e) = validate_radius(radius) {
            errors.add("radius", &e);
        }
    }

    if let Some(min_price) = query.min_price {
        if !min_price.is_finite() || min_price < 0.0 {
            errors.add("minPrice", "minPrice cannot be negative");
        }
    }

    if let Some(max_price) = query.max_price {
        if !max_price.is_finite() || max_price < 0.0 {
            errors.add("maxPrice", "maxPrice cannot be negative");
        }
    }

    errors.finish()
}

/// Create a new listing owned by the caller
pub async fn create_property(
    State(state): State<Arc<AppState>>,
    user: User,
    headers: HeaderMap,
    Json(req): Json<CreatePropertyRequest>,
) -> Result<(StatusCode, Json<PropertyResponse>), ApiError> {
    validate_create_request(&req)?;

    let property = properties::create(&state.db, &user, &req).await?;

    let ip = extract_client_ip(&headers, None);
    audit_log(
        &state,
        actions::PROPERTY_CREATE,
        resource_types::PROPERTY,
        Some(&property.id),
        Some(&property.title),
        Some(&user.id),
        ip.as_deref(),
        None,
    )
    .await;

    Ok((StatusCode::CREATED, Json(property)))
}

/// Search listings with composable filters. Tenants only ever see
/// available listings; the restriction is applied from the caller's role,
/// not from the query string.
pub async fn search_properties(
    State(state): State<Arc<AppState>>,
    user: User,
    Query(mut query): Query<PropertySearchQuery>,
) -> Result<Json<Vec<PropertyResponse>>, ApiError> {
    validate_search_query(&query)?;

    if user.is_tenant() {
        query.available = Some(true);
    }

    let results = properties::search(&state.db, &query).await?;
    Ok(Json(results))
}

/// List the caller's own listings
pub async fn list_landlord_properties(
    State(state): State<Arc<AppState>>,
    user: User,
) -> Result<Json<Vec<PropertyResponse>>, ApiError> {
    let results = properties::list_by_landlord(&state.db, &user.id).await?;
    Ok(Json(results))
}

/// List the listings the caller has shortlisted
pub async fn list_shortlisted_properties(
    State(state): State<Arc<AppState>>,
    user: User,
) -> Result<Json<Vec<PropertyResponse>>, ApiError> {
    let results = properties::list_shortlisted(&state.db, &user.id).await?;
    Ok(Json(results))
}

/// Get a single listing (public)
pub async fn get_property(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PropertyResponse>, ApiError> {
    let property = properties::get(&state.db, &id).await?;
    Ok(Json(property))
}

/// Update a listing (owner only)
pub async fn update_property(
    State(state): State<Arc<AppState>>,
    user: User,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<UpdatePropertyRequest>,
) -> Result<Json<PropertyResponse>, ApiError> {
    if let Err(e) = validate_uuid(&id, "property_id") {
        return Err(ApiError::validation_field("property_id", e));
    }

    validate_update_request(&req)?;

    let property = properties::update(&state.db, &id, &user.id, &req)
        .await
        .map_err(ApiError::from_mutation)?;

    let ip = extract_client_ip(&headers, None);
    audit_log(
        &state,
        actions::PROPERTY_UPDATE,
        resource_types::PROPERTY,
        Some(&property.id),
        Some(&property.title),
        Some(&user.id),
        ip.as_deref(),
        None,
    )
    .await;

    Ok(Json(property))
}

/// Delete a listing (owner only)
pub async fn delete_property(
    State(state): State<Arc<AppState>>,
    user: User,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if let Err(e) = validate_uuid(&id, "property_id") {
        return Err(ApiError::validation_field("property_id", e));
    }

    properties::delete(&state.db, &id, &user.id)
        .await
        .map_err(ApiError::from_mutation)?;

    let ip = extract_client_ip(&headers, None);
    audit_log(
        &state,
        actions::PROPERTY_DELETE,
        resource_types::PROPERTY,
        Some(&id),
        None,
        Some(&user.id),
        ip.as_deref(),
        None,
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// Add the caller to a listing's shortlist (idempotent)
pub async fn add_shortlist(
    State(state): State<Arc<AppState>>,
    user: User,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if let Err(e) = validate_uuid(&id, "property_id") {
        return Err(ApiError::validation_field("property_id", e));
    }

    properties::add_to_shortlist(&state.db, &id, &user.id)
        .await
        .map_err(ApiError::from_mutation)?;

    let ip = extract_client_ip(&headers, None);
    audit_log(
        &state,
        actions::SHORTLIST_ADD,
        resource_types::PROPERTY,
        Some(&id),
        None,
        Some(&user.id),
        ip.as_deref(),
        None,
    )
    .await;

    Ok(StatusCode::CREATED)
}

/// Remove the caller from a listing's shortlist (idempotent)
pub async fn remove_shortlist(
    State(state): State<Arc<AppState>>,
    user: User,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if let Err(e) = validate_uuid(&id, "property_id") {
        return Err(ApiError::validation_field("property_id", e));
    }

    properties::remove_from_shortlist(&state.db, &id, &user.id)
        .await
        .map_err(ApiError::from_mutation)?;

    let ip = extract_client_ip(&headers, None);
    audit_log(
        &state,
        actions::SHORTLIST_REMOVE,
        resource_types::PROPERTY,
        Some(&id),
        None,
        Some(&user.id),
        ip.as_deref(),
        None,
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// Check whether the caller has shortlisted a listing. Answers 200 when
/// shortlisted and 404 when not, so clients can probe with a HEAD-like GET.
pub async fn check_shortlist(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<String>,
) -> Result<Json<ShortlistStatusResponse>, ApiError> {
    if let Err(e) = validate_uuid(&id, "property_id") {
        return Err(ApiError::validation_field("property_id", e));
    }

    let shortlisted = properties::is_shortlisted(&state.db, &id, &user.id)
        .await
        .map_err(ApiError::from_mutation)?;

    if !shortlisted {
        return Err(ApiError::not_found("Property is not shortlisted"));
    }

    Ok(Json(ShortlistStatusResponse { shortlisted: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::test_support::{property_input, seed_user, test_pool};

    async fn test_state() -> Arc<AppState> {
        let pool = test_pool().await;
        Arc::new(AppState::new(Config::default(), pool))
    }

    #[tokio::test]
    async fn test_tenant_search_only_sees_available_listings() {
        let state = test_state().await;
        let landlord = seed_user(&state.db, "owner@example.com", "landlord").await;
        let tenant = seed_user(&state.db, "tenant@example.com", "tenant").await;

        let open = properties::create(&state.db, &landlord, &property_input("Open", 100.0, 1))
            .await
            .unwrap();
        let hidden = properties::create(&state.db, &landlord, &property_input("Hidden", 100.0, 1))
            .await
            .unwrap();
        let patch = UpdatePropertyRequest {
            available: Some(false),
            ..Default::default()
        };
        properties::update(&state.db, &hidden.id, &landlord.id, &patch)
            .await
            .unwrap();

        // A tenant never sees unavailable listings, whatever the query says
        let Json(results) = search_properties(
            axum::extract::State(state.clone()),
            tenant.clone(),
            axum::extract::Query(PropertySearchQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, open.id);

        // A landlord searching without filters sees both
        let Json(results) = search_properties(
            axum::extract::State(state),
            landlord,
            axum::extract::Query(PropertySearchQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(results.len(), 2);
    }
}
