//! Property listing models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::common::{parse_images, GeoPoint};
use super::user::UserResponse;

/// Property row as stored. Coordinates are flattened into two REAL columns
/// and the image list is a JSON TEXT column.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Property {
    pub id: String,
    pub landlord_id: String,
    pub title: String,
    pub description: String,
    pub address: String,
    pub price: f64,
    pub bedrooms: i64,
    pub bathrooms: i64,
    pub longitude: f64,
    pub latitude: f64,
    pub images: String,
    pub available: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Property {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.longitude, self.latitude)
    }

    /// Assemble the API projection: landlord attached with credentials
    /// stripped, image JSON expanded, shortlist membership inlined.
    pub fn into_response(
        self,
        landlord: UserResponse,
        shortlisted_by: Vec<String>,
    ) -> PropertyResponse {
        let images = parse_images(&self.images);
        PropertyResponse {
            id: self.id,
            landlord_id: self.landlord_id,
            title: self.title,
            description: self.description,
            address: self.address,
            price: self.price,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            location: GeoPoint::new(self.longitude, self.latitude),
            images,
            available: self.available,
            shortlisted_by,
            landlord,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Property detail view with the landlord profile attached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyResponse {
    pub id: String,
    pub landlord_id: String,
    pub title: String,
    pub description: String,
    pub address: String,
    pub price: f64,
    pub bedrooms: i64,
    pub bathrooms: i64,
    pub location: GeoPoint,
    pub images: Vec<String>,
    pub available: bool,
    pub shortlisted_by: Vec<String>,
    pub landlord: UserResponse,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePropertyRequest {
    pub title: String,
    pub description: String,
    pub address: String,
    pub price: f64,
    pub bedrooms: i64,
    pub bathrooms: i64,
    pub location: GeoPoint,
    pub images: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePropertyRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub price: Option<f64>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub location: Option<GeoPoint>,
    pub images: Option<Vec<String>>,
    pub available: Option<bool>,
}

/// Search filters, deserialized straight from the query string. Parameter
/// names match the public wire shape (`minPrice`, `lat`, `lng`, ...); all
/// filters are optional and conjunctive.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySearchQuery {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub available: Option<bool>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius: Option<f64>,
}

impl PropertySearchQuery {
    /// Geo center, present only when both coordinates were supplied.
    pub fn center(&self) -> Option<GeoPoint> {
        match (self.lng, self.lat) {
            (Some(lng), Some(lat)) => Some(GeoPoint::new(lng, lat)),
            _ => None,
        }
    }
}

/// Response for shortlist membership checks
#[derive(Debug, Serialize)]
pub struct ShortlistStatusResponse {
    pub shortlisted: bool,
}
