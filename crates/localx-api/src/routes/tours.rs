//! Tour routes

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use localx_db::NewTour;
use tracing::info;

use crate::error::ApiError;
use crate::extract::RequireAdmin;
use crate::state::AppState;

use super::parse_id;
use super::types::{CreateTourRequest, TourResponse};

const TOUR_NOT_FOUND: &str = "Tour not found";

fn validate_tour(request: &CreateTourRequest) -> Result<(), ApiError> {
    if request.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title cannot be empty".to_string()));
    }
    if !request.price.is_finite() || request.price < 0.0 {
        return Err(ApiError::BadRequest(
            "Price must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

/// POST /tours (Admin only)
async fn create_tour(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<CreateTourRequest>,
) -> Result<(StatusCode, Json<TourResponse>), ApiError> {
    validate_tour(&request)?;

    let tour = state
        .db
        .insert_tour(NewTour {
            title: request.title,
            description: request.description,
            price: request.price,
            location: request.location,
            images: request.images,
        })
        .await?;

    info!("Admin {} created tour {}", admin.id, tour.id);

    Ok((StatusCode::CREATED, Json(tour.into())))
}

/// GET /tours/{id}
async fn get_tour(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TourResponse>, ApiError> {
    let id = parse_id(&id, TOUR_NOT_FOUND)?;
    let tour = state
        .db
        .get_tour(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(TOUR_NOT_FOUND.to_string()))?;

    Ok(Json(tour.into()))
}

/// GET /tours
async fn list_tours(State(state): State<AppState>) -> Result<Json<Vec<TourResponse>>, ApiError> {
    let tours = state.db.list_tours().await?;
    Ok(Json(tours.into_iter().map(TourResponse::from).collect()))
}

/// Create tour routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tours", get(list_tours).post(create_tour))
        .route("/tours/{id}", get(get_tour))
}
