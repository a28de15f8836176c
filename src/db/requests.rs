//! Rental request workflow operations.
//!
//! Requests borrow their write permissions from the property they reference:
//! every status transition resolves request -> property -> landlord and then
//! checks the pure ownership predicate. Nothing here caches or duplicates
//! ownership data onto the request row.

use super::error::DomainError;
use super::models::{
    RentalRequest, RentalRequestResponse, RequestStatus, User, UserResponse,
};
use super::{properties, DbPool};
use crate::access;

/// Fetch a raw request row
pub async fn fetch_request(pool: &DbPool, id: &str) -> Result<Option<RentalRequest>, sqlx::Error> {
    sqlx::query_as::<_, RentalRequest>("SELECT * FROM requests WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Assemble the API projection: tenant profile and fully-populated property
/// (landlord included, credentials stripped) attached inline.
async fn assemble(
    pool: &DbPool,
    request: RentalRequest,
) -> Result<RentalRequestResponse, DomainError> {
    let tenant = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&request.tenant_id)
        .fetch_one(pool)
        .await?;

    let property = properties::fetch_property(pool, &request.property_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Property not found"))?;
    let property = properties::assemble(pool, property).await?;

    Ok(request.into_response(UserResponse::from(tenant), property))
}

async fn assemble_all(
    pool: &DbPool,
    requests: Vec<RentalRequest>,
) -> Result<Vec<RentalRequestResponse>, DomainError> {
    let mut results = Vec::with_capacity(requests.len());
    for request in requests {
        results.push(assemble(pool, request).await?);
    }
    Ok(results)
}

/// Create a request on a property. The property must exist; the message must
/// not be blank. Several requests from the same tenant on the same property
/// are allowed.
pub async fn create(
    pool: &DbPool,
    tenant_id: &str,
    property_id: &str,
    message: &str,
) -> Result<RentalRequestResponse, DomainError> {
    if message.trim().is_empty() {
        return Err(DomainError::validation("Message is required"));
    }

    if properties::fetch_property(pool, property_id).await?.is_none() {
        return Err(DomainError::not_found("Property not found"));
    }

    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO requests (id, property_id, tenant_id, status, message, created_at, updated_at)
        VALUES (?, ?, ?, 'pending', ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(property_id)
    .bind(tenant_id)
    .bind(message)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    let request = sqlx::query_as::<_, RentalRequest>("SELECT * FROM requests WHERE id = ?")
        .bind(&id)
        .fetch_one(pool)
        .await?;

    assemble(pool, request).await
}

/// Fetch a single request, fully populated
pub async fn get(pool: &DbPool, request_id: &str) -> Result<RentalRequestResponse, DomainError> {
    let request = fetch_request(pool, request_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Request not found"))?;

    assemble(pool, request).await
}

/// All requests a tenant has created, newest first
pub async fn list_for_tenant(
    pool: &DbPool,
    tenant_id: &str,
) -> Result<Vec<RentalRequestResponse>, DomainError> {
    let requests = sqlx::query_as::<_, RentalRequest>(
        "SELECT * FROM requests WHERE tenant_id = ? ORDER BY created_at DESC, id",
    )
    .bind(tenant_id)
    .fetch_all(pool)
    .await?;

    assemble_all(pool, requests).await
}

/// All requests against any of a landlord's properties, newest first.
/// Resolves the landlord's property id set first, then filters requests by
/// membership in that set.
pub async fn list_for_landlord(
    pool: &DbPool,
    landlord_id: &str,
) -> Result<Vec<RentalRequestResponse>, DomainError> {
    let property_ids: Vec<(String,)> =
        sqlx::query_as("SELECT id FROM properties WHERE landlord_id = ?")
            .bind(landlord_id)
            .fetch_all(pool)
            .await?;

    if property_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; property_ids.len()].join(", ");
    let sql = format!(
        "SELECT * FROM requests WHERE property_id IN ({}) ORDER BY created_at DESC, id",
        placeholders
    );

    let mut query = sqlx::query_as::<_, RentalRequest>(&sql);
    for (id,) in &property_ids {
        query = query.bind(id);
    }

    let requests = query.fetch_all(pool).await?;

    assemble_all(pool, requests).await
}

/// Move a request to `approved` or `rejected`. Only those two targets are
/// accepted, and only the landlord owning the referenced property may
/// transition. Concurrent transitions are last-writer-wins at the store.
pub async fn transition_status(
    pool: &DbPool,
    request_id: &str,
    caller_id: &str,
    new_status: RequestStatus,
) -> Result<RentalRequestResponse, DomainError> {
    if !new_status.is_decision() {
        return Err(DomainError::validation(
            "Status must be either approved or rejected",
        ));
    }

    let request = fetch_request(pool, request_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Request not found"))?;

    // Resolve the referenced property, then check ownership over the loaded
    // pair rather than trusting anything stored on the request itself.
    let property = properties::fetch_property(pool, &request.property_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Property not found"))?;

    if !access::owns_requested_property(&request, &property, caller_id) {
        return Err(DomainError::forbidden(
            "Only the property's landlord can update this request",
        ));
    }

    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query("UPDATE requests SET status = ?, updated_at = ? WHERE id = ?")
        .bind(new_status.to_string())
        .bind(&now)
        .bind(request_id)
        .execute(pool)
        .await?;

    let updated = sqlx::query_as::<_, RentalRequest>("SELECT * FROM requests WHERE id = ?")
        .bind(request_id)
        .fetch_one(pool)
        .await?;

    assemble(pool, updated).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{GeoPoint, PropertySearchQuery};
    use crate::db::test_support::{property_input, seed_user, test_pool};

    async fn set_created_at(pool: &DbPool, request_id: &str, created_at: &str) {
        sqlx::query("UPDATE requests SET created_at = ? WHERE id = ?")
            .bind(created_at)
            .bind(request_id)
            .execute(pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_starts_pending_and_populated() {
        let pool = test_pool().await;
        let landlord = seed_user(&pool, "owner@example.com", "landlord").await;
        let tenant = seed_user(&pool, "tenant@example.com", "tenant").await;

        let property = properties::create(&pool, &landlord, &property_input("Elm flat", 1000.0, 2))
            .await
            .unwrap();

        let request = create(&pool, &tenant.id, &property.id, "Is this available?")
            .await
            .unwrap();

        assert_eq!(request.status, "pending");
        assert_eq!(request.tenant.id, tenant.id);
        assert_eq!(request.property.id, property.id);
        assert_eq!(request.property.landlord.id, landlord.id);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_message() {
        let pool = test_pool().await;
        let landlord = seed_user(&pool, "owner@example.com", "landlord").await;
        let tenant = seed_user(&pool, "tenant@example.com", "tenant").await;

        let property = properties::create(&pool, &landlord, &property_input("Elm flat", 1000.0, 2))
            .await
            .unwrap();

        for message in ["", "   "] {
            let err = create(&pool, &tenant.id, &property.id, message)
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn test_create_unknown_property() {
        let pool = test_pool().await;
        let tenant = seed_user(&pool, "tenant@example.com", "tenant").await;

        let err = create(&pool, &tenant.id, "missing-id", "Hello")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_requests_are_permitted() {
        let pool = test_pool().await;
        let landlord = seed_user(&pool, "owner@example.com", "landlord").await;
        let tenant = seed_user(&pool, "tenant@example.com", "tenant").await;

        let property = properties::create(&pool, &landlord, &property_input("Elm flat", 1000.0, 2))
            .await
            .unwrap();

        let first = create(&pool, &tenant.id, &property.id, "First ask")
            .await
            .unwrap();
        let second = create(&pool, &tenant.id, &property.id, "Second ask")
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(list_for_tenant(&pool, &tenant.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_for_tenant_newest_first() {
        let pool = test_pool().await;
        let landlord = seed_user(&pool, "owner@example.com", "landlord").await;
        let tenant = seed_user(&pool, "tenant@example.com", "tenant").await;

        let property = properties::create(&pool, &landlord, &property_input("Elm flat", 1000.0, 2))
            .await
            .unwrap();

        let older = create(&pool, &tenant.id, &property.id, "Older").await.unwrap();
        let newer = create(&pool, &tenant.id, &property.id, "Newer").await.unwrap();
        set_created_at(&pool, &older.id, "2026-01-01T10:00:00+00:00").await;
        set_created_at(&pool, &newer.id, "2026-01-02T10:00:00+00:00").await;

        let listed = list_for_tenant(&pool, &tenant.id).await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![newer.id.as_str(), older.id.as_str()]);
    }

    #[tokio::test]
    async fn test_list_for_landlord_covers_all_owned_properties() {
        let pool = test_pool().await;
        let landlord = seed_user(&pool, "owner@example.com", "landlord").await;
        let rival = seed_user(&pool, "rival@example.com", "landlord").await;
        let tenant = seed_user(&pool, "tenant@example.com", "tenant").await;

        let first = properties::create(&pool, &landlord, &property_input("First", 900.0, 1))
            .await
            .unwrap();
        let second = properties::create(&pool, &landlord, &property_input("Second", 1100.0, 2))
            .await
            .unwrap();
        let other = properties::create(&pool, &rival, &property_input("Other", 1300.0, 3))
            .await
            .unwrap();

        let on_first = create(&pool, &tenant.id, &first.id, "On first").await.unwrap();
        let on_second = create(&pool, &tenant.id, &second.id, "On second").await.unwrap();
        create(&pool, &tenant.id, &other.id, "On other").await.unwrap();

        let listed = list_for_landlord(&pool, &landlord.id).await.unwrap();
        let mut ids: Vec<&str> = listed.iter().map(|r| r.id.as_str()).collect();
        ids.sort();
        let mut expected = vec![on_first.id.as_str(), on_second.id.as_str()];
        expected.sort();
        assert_eq!(ids, expected);

        assert!(list_for_landlord(&pool, &tenant.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transition_validations() {
        let pool = test_pool().await;
        let landlord = seed_user(&pool, "owner@example.com", "landlord").await;
        let rival = seed_user(&pool, "rival@example.com", "landlord").await;
        let tenant = seed_user(&pool, "tenant@example.com", "tenant").await;

        let property = properties::create(&pool, &landlord, &property_input("Elm flat", 1000.0, 2))
            .await
            .unwrap();
        let request = create(&pool, &tenant.id, &property.id, "Interested")
            .await
            .unwrap();

        // Back to pending is not a decision
        let err = transition_status(&pool, &request.id, &landlord.id, RequestStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        // Neither a rival landlord nor the tenant may decide
        for caller in [&rival.id, &tenant.id] {
            let err = transition_status(&pool, &request.id, caller, RequestStatus::Approved)
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::Forbidden(_)));
        }

        let err = transition_status(&pool, "missing-id", &landlord.id, RequestStatus::Approved)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        let updated = transition_status(&pool, &request.id, &landlord.id, RequestStatus::Approved)
            .await
            .unwrap();
        assert_eq!(updated.status, "approved");

        // No terminal-state guard: a second decision overwrites the first
        let updated = transition_status(&pool, &request.id, &landlord.id, RequestStatus::Rejected)
            .await
            .unwrap();
        assert_eq!(updated.status, "rejected");
    }

    #[tokio::test]
    async fn test_end_to_end_request_lifecycle() {
        let pool = test_pool().await;
        let landlord_a = seed_user(&pool, "a@example.com", "landlord").await;
        let landlord_b = seed_user(&pool, "b@example.com", "landlord").await;
        let tenant = seed_user(&pool, "t@example.com", "tenant").await;

        let mut input = property_input("Canal flat", 1000.0, 2);
        input.location = GeoPoint::new(10.0, 20.0);
        let property = properties::create(&pool, &landlord_a, &input).await.unwrap();

        // Tenant finds the flat through search
        let filters = PropertySearchQuery {
            bedrooms: Some(2),
            ..Default::default()
        };
        let found = properties::search(&pool, &filters).await.unwrap();
        assert!(found.iter().any(|p| p.id == property.id));

        // Tenant asks about it
        let request = create(&pool, &tenant.id, &property.id, "interested")
            .await
            .unwrap();
        assert_eq!(request.status, "pending");

        // A rival landlord cannot decide on it
        let err = transition_status(&pool, &request.id, &landlord_b.id, RequestStatus::Approved)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        // The owner approves; the stored state and projections agree
        transition_status(&pool, &request.id, &landlord_a.id, RequestStatus::Approved)
            .await
            .unwrap();

        let reloaded = get(&pool, &request.id).await.unwrap();
        assert_eq!(reloaded.status, "approved");
        assert_eq!(reloaded.tenant.id, tenant.id);
        assert_eq!(reloaded.property.landlord.id, landlord_a.id);
    }
}
