//! Data models for the Apni Zameen API.
//!
//! Row types map directly to tables via `sqlx::FromRow` and are serialized
//! as-is in responses. Enumerated columns are stored as lowercase text and
//! parsed into the enums below when a request is validated.

use chrono::{DateTime, Utc};
use common::secret::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Enumerations
// ============================================================================

/// Kind of property being listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    House,
    Apartment,
    Villa,
    Plot,
    Commercial,
}

impl PropertyType {
    pub const ALL: [PropertyType; 5] = [
        PropertyType::House,
        PropertyType::Apartment,
        PropertyType::Villa,
        PropertyType::Plot,
        PropertyType::Commercial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::House => "house",
            PropertyType::Apartment => "apartment",
            PropertyType::Villa => "villa",
            PropertyType::Plot => "plot",
            PropertyType::Commercial => "commercial",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Invalid property type: {s}"))
    }
}

/// Listing availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    #[default]
    Available,
    Sold,
    Pending,
}

impl PropertyStatus {
    pub const ALL: [PropertyStatus; 3] = [
        PropertyStatus::Available,
        PropertyStatus::Sold,
        PropertyStatus::Pending,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Available => "available",
            PropertyStatus::Sold => "sold",
            PropertyStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyStatus::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Invalid property status: {s}"))
    }
}

/// Progress of a buyer's inquiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InquiryStatus {
    #[default]
    Pending,
    Responded,
    Closed,
}

impl InquiryStatus {
    pub const ALL: [InquiryStatus; 3] = [
        InquiryStatus::Pending,
        InquiryStatus::Responded,
        InquiryStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InquiryStatus::Pending => "pending",
            InquiryStatus::Responded => "responded",
            InquiryStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for InquiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InquiryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InquiryStatus::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Invalid inquiry status: {s}"))
    }
}

// ============================================================================
// Users
// ============================================================================

/// Full user record (maps to users table). Never serialized.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user; the password hash never leaves the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            role: row.role,
            created_at: row.created_at,
        }
    }
}

fn empty_password() -> SecretString {
    SecretString::from("")
}

/// Registration request.
///
/// Missing fields deserialize as empty so validation can report them as 400.
/// The password is redacted from `Debug`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "empty_password")]
    pub password: SecretString,
    pub phone: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default = "empty_password")]
    pub password: SecretString,
}

/// Response for register and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Option<String>,
}

// ============================================================================
// Properties
// ============================================================================

/// Property listing (maps to properties table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PropertyRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub property_type: String,
    pub status: String,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area: Option<f64>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing row for search results.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PropertySummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub property: PropertyRow,
    pub owner_name: String,
    pub primary_image: Option<String>,
}

/// Image attached to a listing (maps to property_images table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PropertyImage {
    pub id: i64,
    pub property_id: i64,
    pub image_url: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

/// Owner contact columns joined onto a listing.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PropertyWithOwner {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub property: PropertyRow,
    pub owner_name: String,
    pub owner_email: String,
    pub owner_phone: Option<String>,
}

/// Full listing detail with its images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDetail {
    #[serde(flatten)]
    pub listing: PropertyWithOwner,
    pub images: Vec<PropertyImage>,
}

/// Search filters for `GET /api/v1/properties`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyFilters {
    pub city: Option<String>,
    pub property_type: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub bedrooms: Option<i32>,
    pub status: Option<String>,
}

/// Validated search filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySearch {
    pub city: Option<String>,
    pub property_type: Option<PropertyType>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub bedrooms: Option<i32>,
    pub status: Option<PropertyStatus>,
}

/// Body of `POST /api/v1/properties`.
///
/// Required fields are optional here so that a missing field is reported
/// by name with a 400.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePropertyRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub property_type: Option<String>,
    pub status: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area: Option<f64>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub images: Option<Vec<String>>,
}

/// Body of `PUT /api/v1/properties/:id`; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePropertyRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub property_type: Option<String>,
    pub status: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area: Option<f64>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub images: Option<Vec<String>>,
}

/// Validated listing fields ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProperty {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub property_type: PropertyType,
    pub status: PropertyStatus,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area: Option<f64>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// Validated partial update. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub property_type: Option<PropertyType>,
    pub status: Option<PropertyStatus>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area: Option<f64>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

impl PropertyChanges {
    pub fn is_empty(&self) -> bool {
        *self == PropertyChanges::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyCreatedResponse {
    pub message: String,
    pub property_id: i64,
}

// ============================================================================
// Inquiries
// ============================================================================

/// Inquiry record (maps to inquiries table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct InquiryRow {
    pub id: i64,
    pub user_id: i64,
    pub property_id: i64,
    pub message: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inquiry joined with its property and inquirer.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InquiryView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub inquiry: InquiryRow,
    pub property_title: String,
    pub property_owner_id: i64,
    pub user_name: String,
    pub user_email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInquiryRequest {
    pub property_id: Option<i64>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateInquiryRequest {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InquiryCreatedResponse {
    pub message: String,
    pub inquiry_id: i64,
}

// ============================================================================
// Favorites
// ============================================================================

/// A favorited listing with its image URLs (primary first).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FavoriteProperty {
    pub favorite_id: i64,
    pub favorited_at: DateTime<Utc>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub property: PropertyRow,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddFavoriteRequest {
    pub property_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteCheckResponse {
    pub is_favorite: bool,
}

// ============================================================================
// Shared
// ============================================================================

/// Plain acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of `GET /ready`.
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl ReadinessResponse {
    pub fn ready() -> Self {
        Self {
            status: "ready",
            database: "healthy",
            error: None,
        }
    }

    /// The driver error stays in the logs; callers get a fixed message.
    pub fn database_down() -> Self {
        Self {
            status: "not_ready",
            database: "unhealthy",
            error: Some("Service dependencies unavailable"),
        }
    }
}
