//! Input validation for API requests.
//!
//! Field-format checks for listing, request, and account payloads. Each
//! function reports a single human-readable problem; handlers collect them
//! with the `ValidationErrorBuilder` from the `error` module.

use lazy_static::lazy_static;
use regex::Regex;

use crate::db::GeoPoint;

lazy_static! {
    /// Regex for a plausible email address (local@domain.tld)
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();

    /// Regex for phone numbers: optional +, digits with spaces/dashes/parens
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9][0-9 ()\-]{5,19}$").unwrap();
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email address".to_string());
    }

    Ok(())
}

/// Validate a phone number
pub fn validate_phone(phone: &str) -> Result<(), String> {
    if phone.is_empty() {
        return Err("Phone number is required".to_string());
    }

    if !PHONE_REGEX.is_match(phone) {
        return Err("Invalid phone number format".to_string());
    }

    Ok(())
}

/// Validate a display name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }

    if name.len() > 100 {
        return Err("Name is too long (max 100 characters)".to_string());
    }

    Ok(())
}

/// Validate an account role
pub fn validate_role(role: &str) -> Result<(), String> {
    role.parse::<crate::db::UserRole>()
        .map(|_| ())
        .map_err(|_| "Role must be either tenant or landlord".to_string())
}

/// Validate a listing title
pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Title is required".to_string());
    }

    if title.len() > 200 {
        return Err("Title is too long (max 200 characters)".to_string());
    }

    Ok(())
}

/// Validate a listing description
pub fn validate_description(description: &str) -> Result<(), String> {
    if description.trim().is_empty() {
        return Err("Description is required".to_string());
    }

    if description.len() > 5000 {
        return Err("Description is too long (max 5000 characters)".to_string());
    }

    Ok(())
}

/// Validate a street address
pub fn validate_address(address: &str) -> Result<(), String> {
    if address.trim().is_empty() {
        return Err("Address is required".to_string());
    }

    if address.len() > 500 {
        return Err("Address is too long (max 500 characters)".to_string());
    }

    Ok(())
}

/// Validate a monthly price
pub fn validate_price(price: f64) -> Result<(), String> {
    if !price.is_finite() {
        return Err("Price must be a number".to_string());
    }

    if price <= 0.0 {
        return Err("Price must be greater than 0".to_string());
    }

    Ok(())
}

/// Validate a room count (bedrooms, bathrooms)
pub fn validate_room_count(count: i64, field_name: &str) -> Result<(), String> {
    if count < 0 {
        return Err(format!("{} cannot be negative", field_name));
    }

    if count > 50 {
        return Err(format!("{} is unreasonably large (max 50)", field_name));
    }

    Ok(())
}

/// Validate a coordinate pair
pub fn validate_location(location: &GeoPoint) -> Result<(), String> {
    if !location.is_valid() {
        return Err("Location must be a valid (longitude, latitude) pair".to_string());
    }

    Ok(())
}

/// Validate the image reference list
pub fn validate_images(images: &[String]) -> Result<(), String> {
    if images.is_empty() {
        return Err("At least one image is required".to_string());
    }

    if images.len() > 30 {
        return Err("Too many images (max 30)".to_string());
    }

    for image in images {
        if image.trim().is_empty() {
            return Err("Image references cannot be empty".to_string());
        }
        if image.len() > 2048 {
            return Err("Image reference is too long (max 2048 characters)".to_string());
        }
    }

    Ok(())
}

/// Validate a search radius in meters
pub fn validate_radius(radius: f64) -> Result<(), String> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err("Radius must be greater than 0".to_string());
    }

    Ok(())
}

/// Validate a UUID string
pub fn validate_uuid(id: &str, field_name: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err(format!("{} is required", field_name));
    }

    if uuid::Uuid::parse_str(id).is_err() {
        return Err(format!("Invalid {} format", field_name));
    }

    Ok(())
}
