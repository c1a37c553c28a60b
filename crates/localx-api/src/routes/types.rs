//! Request/Response DTOs

use localx_db::{Booking, Tour, utils::format_booking_date};
use serde::{Deserialize, Serialize};

// ==================== Generic Types ====================

/// Plain message response
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

// ==================== User Types ====================

/// Registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Registration response
#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: String,
    pub email: String,
    pub message: String,
}

/// Login credentials, OAuth2 password-flow field names
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(alias = "email")]
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Current user profile
#[derive(Serialize)]
pub struct MeResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

// ==================== Tour Types ====================

/// Create tour request
#[derive(Deserialize)]
pub struct CreateTourRequest {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Tour response
#[derive(Serialize)]
pub struct TourResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub images: Vec<String>,
}

impl From<Tour> for TourResponse {
    fn from(tour: Tour) -> Self {
        Self {
            id: tour.id.to_string(),
            title: tour.title,
            description: tour.description,
            price: tour.price,
            location: tour.location,
            images: tour.images,
        }
    }
}

// ==================== Booking Types ====================

/// Create booking request; `date` is `YYYY-MM-DDTHH:MM:SS`
#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub tour_id: String,
    pub date: String,
}

/// Booking response
#[derive(Serialize)]
pub struct BookingResponse {
    pub id: String,
    pub tour_id: String,
    pub user_id: String,
    pub date: String,
    pub status: String,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id.to_string(),
            tour_id: booking.tour_id.to_string(),
            user_id: booking.user_id.to_string(),
            date: format_booking_date(&booking.date),
            status: booking.status.as_str().to_string(),
        }
    }
}
