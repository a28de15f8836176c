//! Ownership predicates consulted by the property and request operations.
//!
//! These are pure functions over already-loaded rows: no I/O, no pool
//! handles, so authorization rules stay testable without a database. The
//! callers are responsible for loading the entities first (resolve, then
//! check).

use crate::db::{Property, RentalRequest};

/// Does `user_id` own this property?
pub fn is_property_owner(property: &Property, user_id: &str) -> bool {
    property.landlord_id == user_id
}

/// Does `user_id` own the property a request refers to?
///
/// `property` must be the loaded row for `request.property_id`; a mismatched
/// pair never grants access.
pub fn owns_requested_property(
    request: &RentalRequest,
    property: &Property,
    user_id: &str,
) -> bool {
    request.property_id == property.id && is_property_owner(property, user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(id: &str, landlord_id: &str) -> Property {
        Property {
            id: id.to_string(),
            landlord_id: landlord_id.to_string(),
            title: "Two rooms near the park".to_string(),
            description: "Bright second-floor flat".to_string(),
            address: "12 Elm Street".to_string(),
            price: 1200.0,
            bedrooms: 2,
            bathrooms: 1,
            longitude: 18.07,
            latitude: 59.33,
            images: "[\"https://cdn.example.com/1.jpg\"]".to_string(),
            available: true,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    fn request(id: &str, property_id: &str, tenant_id: &str) -> RentalRequest {
        RentalRequest {
            id: id.to_string(),
            property_id: property_id.to_string(),
            tenant_id: tenant_id.to_string(),
            status: "pending".to_string(),
            message: "Is this still available?".to_string(),
            created_at: "2026-01-02T00:00:00Z".to_string(),
            updated_at: "2026-01-02T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_property_owner() {
        let p = property("p1", "landlord-a");
        assert!(is_property_owner(&p, "landlord-a"));
        assert!(!is_property_owner(&p, "landlord-b"));
        assert!(!is_property_owner(&p, ""));
    }

    #[test]
    fn test_request_property_owner() {
        let p = property("p1", "landlord-a");
        let r = request("r1", "p1", "tenant-t");

        assert!(owns_requested_property(&r, &p, "landlord-a"));
        assert!(!owns_requested_property(&r, &p, "landlord-b"));
        // The tenant who created the request is not the owner
        assert!(!owns_requested_property(&r, &p, "tenant-t"));
    }

    #[test]
    fn test_mismatched_property_never_grants() {
        let other = property("p2", "landlord-a");
        let r = request("r1", "p1", "tenant-t");

        // Correct landlord, wrong property row: the transitive rule only
        // holds for the property the request actually references.
        assert!(!owns_requested_property(&r, &other, "landlord-a"));
    }
}
