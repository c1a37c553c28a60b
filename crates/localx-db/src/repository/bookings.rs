//! Booking operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{Booking, BookingStatus, NewBooking};
use crate::repository::Database;
use crate::utils::format_booking_date;

const BOOKING_COLUMNS: &str = "id, user_id, tour_id, date, status, created_at";

impl Database {
    // ==================== Booking Operations ====================

    /// Insert a new pending booking; the referenced tour must exist
    pub async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, DbError> {
        if self.get_tour(booking.tour_id).await?.is_none() {
            return Err(DbError::NotFound(format!("Tour: {}", booking.tour_id)));
        }

        let now = Utc::now();
        let status = BookingStatus::Pending;

        let result = sqlx::query(
            r#"
            INSERT INTO bookings (user_id, tour_id, date, status, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(booking.user_id)
        .bind(booking.tour_id)
        .bind(format_booking_date(&booking.date))
        .bind(status.as_str())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(Booking {
            id,
            user_id: booking.user_id,
            tour_id: booking.tour_id,
            date: booking.date,
            status,
            created_at: now,
        })
    }

    /// Get a booking by ID
    pub async fn get_booking(&self, id: i64) -> Result<Option<Booking>, DbError> {
        let result = sqlx::query(&format!("SELECT {} FROM bookings WHERE id = ?", BOOKING_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        result.map(|row| Booking::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List bookings made by one user
    pub async fn list_bookings_for_user(&self, user_id: i64) -> Result<Vec<Booking>, DbError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM bookings WHERE user_id = ? ORDER BY id",
            BOOKING_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Booking::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// List every booking
    pub async fn list_bookings(&self) -> Result<Vec<Booking>, DbError> {
        let rows = sqlx::query(&format!("SELECT {} FROM bookings ORDER BY id", BOOKING_COLUMNS))
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| Booking::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Update booking status
    pub async fn update_booking_status(&self, id: i64, status: BookingStatus) -> Result<bool, DbError> {
        let result = sqlx::query("UPDATE bookings SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a booking
    pub async fn delete_booking(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
