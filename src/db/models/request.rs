//! Rental request models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::property::PropertyResponse;
use super::user::UserResponse;

/// Lifecycle state of a rental request. `Pending` is the only state a
/// request is ever created in; the other two are set by the property's
/// landlord.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    /// True for the states a landlord may move a request into.
    pub fn is_decision(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("Unknown request status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RentalRequest {
    pub id: String,
    pub property_id: String,
    pub tenant_id: String,
    pub status: String,
    pub message: String,
    pub created_at: String,
    pub updated_at: String,
}

impl RentalRequest {
    pub fn status_enum(&self) -> Option<RequestStatus> {
        self.status.parse().ok()
    }

    /// Assemble the API projection with tenant and property fully attached.
    pub fn into_response(
        self,
        tenant: UserResponse,
        property: PropertyResponse,
    ) -> RentalRequestResponse {
        RentalRequestResponse {
            id: self.id,
            property,
            tenant,
            status: self.status,
            message: self.message,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Request detail view with tenant and property (and its landlord) inline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalRequestResponse {
    pub id: String,
    pub property: PropertyResponse,
    pub tenant: UserResponse,
    pub status: String,
    pub message: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateRentalRequest {
    pub property_id: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequestStatusRequest {
    pub status: String,
}
