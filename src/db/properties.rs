//! Property directory operations.
//!
//! Listing CRUD, shortlist membership, and the filtered/geo search. Every
//! operation takes the pool and returns `DomainError` kinds; HTTP concerns
//! stay in the API layer. Writes are single statements and rely on SQLite's
//! per-statement atomicity; there is no locking here.

use super::error::DomainError;
use super::geo;
use super::models::{
    serialize_images, CreatePropertyRequest, Property, PropertyResponse, PropertySearchQuery,
    UpdatePropertyRequest, User, UserResponse,
};
use super::DbPool;
use crate::access;

/// Fetch a raw property row
pub async fn fetch_property(pool: &DbPool, id: &str) -> Result<Option<Property>, sqlx::Error> {
    sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Tenant ids currently shortlisting a property, oldest membership first
async fn shortlist_ids(pool: &DbPool, property_id: &str) -> Result<Vec<String>, sqlx::Error> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT tenant_id FROM property_shortlists WHERE property_id = ? ORDER BY created_at, tenant_id",
    )
    .bind(property_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Assemble the API projection for a loaded row: landlord profile attached
/// (credentials stripped) and shortlist membership inlined.
pub async fn assemble(pool: &DbPool, property: Property) -> Result<PropertyResponse, DomainError> {
    let landlord = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&property.landlord_id)
        .fetch_one(pool)
        .await?;

    let shortlisted_by = shortlist_ids(pool, &property.id).await?;

    Ok(property.into_response(UserResponse::from(landlord), shortlisted_by))
}

async fn assemble_all(
    pool: &DbPool,
    properties: Vec<Property>,
) -> Result<Vec<PropertyResponse>, DomainError> {
    let mut results = Vec::with_capacity(properties.len());
    for property in properties {
        results.push(assemble(pool, property).await?);
    }
    Ok(results)
}

/// Create a listing owned by `landlord`. New listings are always available
/// and start with an empty shortlist. The owner must hold the landlord role
/// at creation time; the role is not re-validated afterwards.
pub async fn create(
    pool: &DbPool,
    landlord: &User,
    req: &CreatePropertyRequest,
) -> Result<PropertyResponse, DomainError> {
    if !landlord.is_landlord() {
        return Err(DomainError::validation(
            "Only landlord accounts can create properties",
        ));
    }

    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO properties (id, landlord_id, title, description, address, price, bedrooms, bathrooms, longitude, latitude, images, available, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&landlord.id)
    .bind(&req.title)
    .bind(&req.description)
    .bind(&req.address)
    .bind(req.price)
    .bind(req.bedrooms)
    .bind(req.bathrooms)
    .bind(req.location.longitude)
    .bind(req.location.latitude)
    .bind(serialize_images(&req.images))
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    let property = sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = ?")
        .bind(&id)
        .fetch_one(pool)
        .await?;

    assemble(pool, property).await
}

/// Apply a partial update. Only the owning landlord may change a listing.
pub async fn update(
    pool: &DbPool,
    property_id: &str,
    caller_id: &str,
    patch: &UpdatePropertyRequest,
) -> Result<PropertyResponse, DomainError> {
    let property = fetch_property(pool, property_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Property not found"))?;

    if !access::is_property_owner(&property, caller_id) {
        return Err(DomainError::forbidden(
            "Only the owning landlord can update this property",
        ));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let images_json = patch.images.as_deref().map(serialize_images);
    let (longitude, latitude) = match patch.location {
        Some(point) => (Some(point.longitude), Some(point.latitude)),
        None => (None, None),
    };

    sqlx::query(
        r#"
        UPDATE properties SET
            title = COALESCE(?, title),
            description = COALESCE(?, description),
            address = COALESCE(?, address),
            price = COALESCE(?, price),
            bedrooms = COALESCE(?, bedrooms),
            bathrooms = COALESCE(?, bathrooms),
            longitude = COALESCE(?, longitude),
            latitude = COALESCE(?, latitude),
            images = COALESCE(?, images),
            available = COALESCE(?, available),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&patch.title)
    .bind(&patch.description)
    .bind(&patch.address)
    .bind(patch.price)
    .bind(patch.bedrooms)
    .bind(patch.bathrooms)
    .bind(longitude)
    .bind(latitude)
    .bind(&images_json)
    .bind(patch.available)
    .bind(&now)
    .bind(property_id)
    .execute(pool)
    .await?;

    let updated = sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = ?")
        .bind(property_id)
        .fetch_one(pool)
        .await?;

    assemble(pool, updated).await
}

/// Delete a listing. Shortlist rows and requests cascade with it. A repeated
/// delete of the same id reports the entity as missing.
pub async fn delete(pool: &DbPool, property_id: &str, caller_id: &str) -> Result<(), DomainError> {
    let property = fetch_property(pool, property_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Property not found"))?;

    if !access::is_property_owner(&property, caller_id) {
        return Err(DomainError::forbidden(
            "Only the owning landlord can delete this property",
        ));
    }

    let result = sqlx::query("DELETE FROM properties WHERE id = ?")
        .bind(property_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DomainError::not_found("Property not found"));
    }

    Ok(())
}

/// Fetch a single listing with the landlord profile attached
pub async fn get(pool: &DbPool, property_id: &str) -> Result<PropertyResponse, DomainError> {
    let property = fetch_property(pool, property_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Property not found"))?;

    assemble(pool, property).await
}

/// All listings owned by a landlord, newest first
pub async fn list_by_landlord(
    pool: &DbPool,
    landlord_id: &str,
) -> Result<Vec<PropertyResponse>, DomainError> {
    let properties = sqlx::query_as::<_, Property>(
        "SELECT * FROM properties WHERE landlord_id = ? ORDER BY created_at DESC, id",
    )
    .bind(landlord_id)
    .fetch_all(pool)
    .await?;

    assemble_all(pool, properties).await
}

/// All listings a tenant has shortlisted, newest first
pub async fn list_shortlisted(
    pool: &DbPool,
    tenant_id: &str,
) -> Result<Vec<PropertyResponse>, DomainError> {
    let properties = sqlx::query_as::<_, Property>(
        r#"
        SELECT p.* FROM properties p
        INNER JOIN property_shortlists s ON p.id = s.property_id
        WHERE s.tenant_id = ?
        ORDER BY p.created_at DESC, p.id
        "#,
    )
    .bind(tenant_id)
    .fetch_all(pool)
    .await?;

    assemble_all(pool, properties).await
}

/// Filtered search. All present filters are ANDed; a geo center adds a
/// bounding-box prefilter in SQL and exact distance filtering/ordering on
/// the candidates (nearest first). Without a center the order is newest
/// first, which is stable for identical inputs.
pub async fn search(
    pool: &DbPool,
    filters: &PropertySearchQuery,
) -> Result<Vec<PropertyResponse>, DomainError> {
    // Build dynamic WHERE clause; all bound values are numeric
    let mut conditions: Vec<String> = Vec::new();
    let mut bindings: Vec<f64> = Vec::new();

    if let Some(min_price) = filters.min_price {
        conditions.push("price >= ?".to_string());
        bindings.push(min_price);
    }

    if let Some(max_price) = filters.max_price {
        conditions.push("price <= ?".to_string());
        bindings.push(max_price);
    }

    if let Some(bedrooms) = filters.bedrooms {
        conditions.push("bedrooms = ?".to_string());
        bindings.push(bedrooms as f64);
    }

    if let Some(bathrooms) = filters.bathrooms {
        conditions.push("bathrooms = ?".to_string());
        bindings.push(bathrooms as f64);
    }

    if let Some(available) = filters.available {
        conditions.push("available = ?".to_string());
        bindings.push(if available { 1.0 } else { 0.0 });
    }

    let center = filters.center();
    let radius_m = filters.radius.unwrap_or(geo::DEFAULT_SEARCH_RADIUS_M);

    if let Some(center) = center {
        let bbox = geo::bounding_box(center, radius_m);
        conditions.push("latitude BETWEEN ? AND ?".to_string());
        bindings.push(bbox.min_latitude);
        bindings.push(bbox.max_latitude);
        conditions.push("longitude BETWEEN ? AND ?".to_string());
        bindings.push(bbox.min_longitude);
        bindings.push(bbox.max_longitude);
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let sql = format!(
        "SELECT * FROM properties {} ORDER BY created_at DESC, id",
        where_clause
    );
    let mut query = sqlx::query_as::<_, Property>(&sql);
    for binding in &bindings {
        query = query.bind(*binding);
    }

    let mut properties = query.fetch_all(pool).await?;

    // Exact radius filter and nearest-first ordering on the bbox candidates
    if let Some(center) = center {
        let mut with_distance: Vec<(f64, Property)> = properties
            .into_iter()
            .map(|p| (geo::distance_m(center, p.location()), p))
            .filter(|(d, _)| *d <= radius_m)
            .collect();

        with_distance.sort_by(|(dist_a, a), (dist_b, b)| {
            dist_a
                .partial_cmp(dist_b)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });

        properties = with_distance.into_iter().map(|(_, p)| p).collect();
    }

    assemble_all(pool, properties).await
}

/// Add a tenant to a property's shortlist. A no-op when already present.
pub async fn add_to_shortlist(
    pool: &DbPool,
    property_id: &str,
    tenant_id: &str,
) -> Result<(), DomainError> {
    if fetch_property(pool, property_id).await?.is_none() {
        return Err(DomainError::not_found("Property not found"));
    }

    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query(
        "INSERT OR IGNORE INTO property_shortlists (property_id, tenant_id, created_at) VALUES (?, ?, ?)",
    )
    .bind(property_id)
    .bind(tenant_id)
    .bind(&now)
    .execute(pool)
    .await?;

    Ok(())
}

/// Remove a tenant from a property's shortlist. A no-op when absent.
pub async fn remove_from_shortlist(
    pool: &DbPool,
    property_id: &str,
    tenant_id: &str,
) -> Result<(), DomainError> {
    if fetch_property(pool, property_id).await?.is_none() {
        return Err(DomainError::not_found("Property not found"));
    }

    sqlx::query("DELETE FROM property_shortlists WHERE property_id = ? AND tenant_id = ?")
        .bind(property_id)
        .bind(tenant_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Is the tenant currently on the property's shortlist?
pub async fn is_shortlisted(
    pool: &DbPool,
    property_id: &str,
    tenant_id: &str,
) -> Result<bool, DomainError> {
    if fetch_property(pool, property_id).await?.is_none() {
        return Err(DomainError::not_found("Property not found"));
    }

    let count: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM property_shortlists WHERE property_id = ? AND tenant_id = ?",
    )
    .bind(property_id)
    .bind(tenant_id)
    .fetch_one(pool)
    .await?;

    Ok(count.0 > 0)
}
