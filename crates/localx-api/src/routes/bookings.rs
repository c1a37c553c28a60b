//! Booking routes

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch},
};
use localx_auth::Identity;
use localx_db::{BookingStatus, DbError, NewBooking, utils::parse_booking_date};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::extract::{RequireAdmin, RequireAuth};
use crate::state::AppState;

use super::parse_id;
use super::types::{BookingResponse, CreateBookingRequest, MessageResponse};

const BOOKING_NOT_FOUND: &str = "Booking not found";

fn caller_id(identity: &Identity) -> Result<i64, ApiError> {
    identity
        .user_id()
        .ok_or_else(|| ApiError::Internal(format!("Non-numeric user id: {}", identity.id)))
}

/// POST /bookings
async fn create_booking(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    let user_id = caller_id(&identity)?;
    let tour_id = parse_id(&request.tour_id, "Tour not found")?;
    let date = parse_booking_date(&request.date).ok_or_else(|| {
        ApiError::BadRequest("Invalid date, expected YYYY-MM-DDTHH:MM:SS".to_string())
    })?;

    let booking = state
        .db
        .insert_booking(NewBooking { user_id, tour_id, date })
        .await
        .map_err(|e| match e {
            DbError::NotFound(_) => ApiError::NotFound("Tour not found".to_string()),
            other => ApiError::Database(other),
        })?;

    metrics::counter!("localx_bookings_created_total").increment(1);
    info!("User {} booked tour {} (booking {})", user_id, tour_id, booking.id);

    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// GET /bookings
async fn list_user_bookings(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let user_id = caller_id(&identity)?;
    let bookings = state.db.list_bookings_for_user(user_id).await?;
    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}

/// GET /bookings/all (Admin only)
async fn list_all_bookings(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let bookings = state.db.list_bookings().await?;
    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}

/// DELETE /bookings/{id}
async fn cancel_booking(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    const NOT_ALLOWED: &str = "Booking not found or not allowed to cancel";

    let user_id = caller_id(&identity)?;
    let id = parse_id(&id, NOT_ALLOWED)?;

    // Someone else's booking looks the same as a missing one
    let owned = state
        .db
        .get_booking(id)
        .await?
        .is_some_and(|b| b.user_id == user_id);
    if !owned || !state.db.delete_booking(id).await? {
        debug!("User {} may not cancel booking {}", user_id, id);
        return Err(ApiError::NotFound(NOT_ALLOWED.to_string()));
    }

    info!("User {} canceled booking {}", user_id, id);
    Ok(Json(MessageResponse::new("Booking canceled")))
}

/// DELETE /bookings/{id}/admin (Admin only)
async fn cancel_booking_admin(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id, BOOKING_NOT_FOUND)?;

    if !state.db.delete_booking(id).await? {
        return Err(ApiError::NotFound(BOOKING_NOT_FOUND.to_string()));
    }

    info!("Admin {} canceled booking {}", admin.id, id);
    Ok(Json(MessageResponse::new("Booking canceled by admin")))
}

/// PATCH /bookings/{id}/confirm (Admin only)
async fn confirm_booking(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id, BOOKING_NOT_FOUND)?;

    if !state.db.update_booking_status(id, BookingStatus::Confirmed).await? {
        return Err(ApiError::NotFound(BOOKING_NOT_FOUND.to_string()));
    }

    info!("Admin {} confirmed booking {}", admin.id, id);
    Ok(Json(MessageResponse::new("Booking confirmed")))
}

/// Create booking routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_user_bookings).post(create_booking))
        .route("/bookings/all", get(list_all_bookings))
        .route("/bookings/{id}", delete(cancel_booking))
        .route("/bookings/{id}/admin", delete(cancel_booking_admin))
        .route("/bookings/{id}/confirm", patch(confirm_booking))
}
