//! Database models

use crate::utils::{parse_booking_date, parse_datetime_or_now};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Error type for parsing models from strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    InvalidUserRole(String),
    InvalidBookingStatus(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidUserRole(s) => write!(f, "Invalid user role: {}", s),
            ParseError::InvalidBookingStatus(s) => write!(f, "Invalid booking status: {}", s),
        }
    }
}

impl std::error::Error for ParseError {}

/// User role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    /// Decode a role as found in a stored record.
    ///
    /// A missing role means `User`. Values outside `{user, admin}` are
    /// normalized to `User` so that nothing unknown reaches an access check.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            None => UserRole::User,
            Some(raw) => raw.trim().to_ascii_lowercase().parse().unwrap_or_else(|_| {
                warn!("Unknown stored user role '{}', treating as user", raw);
                UserRole::User
            }),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            _ => Err(ParseError::InvalidUserRole(s.to_string())),
        }
    }
}

/// User model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user (for insertion)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// Tour listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tour {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// New tour (for insertion)
#[derive(Debug, Clone)]
pub struct NewTour {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub images: Vec<String>,
}

/// Booking status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
        }
    }

    /// Decode a status as found in a stored record; unknown values read as `Pending`
    pub fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            warn!("Unknown stored booking status '{}', treating as pending", value);
            BookingStatus::Pending
        })
    }
}

impl FromStr for BookingStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            _ => Err(ParseError::InvalidBookingStatus(s.to_string())),
        }
    }
}

/// Booking of a tour by a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub tour_id: i64,
    pub date: NaiveDateTime,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// New booking (for insertion); always starts out pending
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: i64,
    pub tour_id: i64,
    pub date: NaiveDateTime,
}

// ==================== TryFrom Implementations ====================

impl TryFrom<&sqlx::sqlite::SqliteRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let role: Option<String> = row.try_get("role")?;
        Ok(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: UserRole::from_stored(role.as_deref()),
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Tour {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let images: String = row.try_get("images")?;
        let images: Vec<String> = serde_json::from_str(&images).map_err(|e| sqlx::Error::ColumnDecode {
            index: "images".to_string(),
            source: Box::new(e),
        })?;
        Ok(Tour {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            location: row.try_get("location")?,
            images,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Booking {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let date: String = row.try_get("date")?;
        let status: String = row.try_get("status")?;
        Ok(Booking {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            tour_id: row.try_get("tour_id")?,
            date: parse_booking_date(&date).ok_or_else(|| sqlx::Error::ColumnDecode {
                index: "date".to_string(),
                source: format!("invalid booking date: {}", date).into(),
            })?,
            status: BookingStatus::from_stored(&status),
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
        })
    }
}
