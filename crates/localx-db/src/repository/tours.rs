//! Tour operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewTour, Tour};
use crate::repository::Database;

const TOUR_COLUMNS: &str = "id, title, description, price, location, images, created_at";

impl Database {
    // ==================== Tour Operations ====================

    /// Insert a new tour
    pub async fn insert_tour(&self, tour: NewTour) -> Result<Tour, DbError> {
        let now = Utc::now();
        let images = serde_json::to_string(&tour.images)?;

        let result = sqlx::query(
            r#"
            INSERT INTO tours (title, description, price, location, images, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&tour.title)
        .bind(&tour.description)
        .bind(tour.price)
        .bind(&tour.location)
        .bind(images)
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(Tour {
            id,
            title: tour.title,
            description: tour.description,
            price: tour.price,
            location: tour.location,
            images: tour.images,
            created_at: now,
        })
    }

    /// Get a tour by ID
    pub async fn get_tour(&self, id: i64) -> Result<Option<Tour>, DbError> {
        let result = sqlx::query(&format!("SELECT {} FROM tours WHERE id = ?", TOUR_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        result.map(|row| Tour::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List all tours in insertion order
    pub async fn list_tours(&self) -> Result<Vec<Tour>, DbError> {
        let rows = sqlx::query(&format!("SELECT {} FROM tours ORDER BY id", TOUR_COLUMNS))
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| Tour::try_from(row).map_err(DbError::from))
            .collect()
    }
}
