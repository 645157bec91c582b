use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use sqlx::postgres::PgDatabaseError;
use thiserror::Error;
use tracing::error;

use crate::{ReservationId, ReservationStatus, RoomId, ServiceId};

#[derive(Error, Debug)]
pub enum Error {
    #[error("database error: {0}")]
    DbError(sqlx::Error),

    #[error("Failed to read configuration file")]
    ConfigReadError,

    #[error("Failed to parse configuration file")]
    ConfigParseError,

    #[error("start_date and end_date are required")]
    MissingDates,

    #[error("end_date must be after start_date")]
    InvalidDateRange,

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingRequiredFields(Vec<&'static str>),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid status {0}")]
    InvalidStatus(String),

    #[error("Invalid page size {0}")]
    InvalidPageSize(i64),

    #[error("Invalid cursor {0}")]
    InvalidCursor(i64),

    #[error("The room is no longer available for the selected dates")]
    RoomNotAvailable,

    #[error("A room with this number already exists")]
    RoomNumberExists,

    #[error("The room cannot be deleted because it has active reservations")]
    RoomHasActiveReservations,

    #[error("The room cannot be deleted because reservations still reference it")]
    RoomHasReservations,

    #[error("Room {0} not found")]
    RoomNotFound(RoomId),

    #[error("Reservation {0} not found")]
    ReservationNotFound(ReservationId),

    #[error("Service {0} not found")]
    ServiceNotFound(ServiceId),

    #[error("No record found by the given condition")]
    NotFound,

    #[error("User is not authenticated")]
    Unauthorized,

    #[error("User is not allowed to perform this action")]
    Forbidden,

    #[error("Cannot change reservation status from {from} to {to}")]
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },

    #[error("Reservations can only be cancelled at least one day before check-in")]
    CancellationNotAllowed,

    #[error("The reservation could not be created")]
    TransactionFailed,
}

impl Error {
    /// stable code clients can match on
    pub fn code(&self) -> &'static str {
        match self {
            Error::DbError(_) => "INTERNAL_ERROR",
            Error::ConfigReadError | Error::ConfigParseError => "CONFIG_ERROR",
            Error::MissingDates => "MISSING_DATES",
            Error::InvalidDateRange => "INVALID_DATE_RANGE",
            Error::MissingRequiredFields(_) => "MISSING_REQUIRED_FIELDS",
            Error::InvalidInput(_) => "VALIDATION_ERROR",
            Error::InvalidStatus(_) => "INVALID_STATUS",
            Error::InvalidPageSize(_) | Error::InvalidCursor(_) => "INVALID_PAGINATION",
            Error::RoomNotAvailable => "ROOM_NOT_AVAILABLE",
            Error::RoomNumberExists => "ROOM_NUMBER_EXISTS",
            Error::RoomHasActiveReservations => "ROOM_HAS_ACTIVE_RESERVATIONS",
            Error::RoomHasReservations => "ROOM_HAS_RESERVATIONS",
            Error::RoomNotFound(_) => "ROOM_NOT_FOUND",
            Error::ReservationNotFound(_) => "RESERVATION_NOT_FOUND",
            Error::ServiceNotFound(_) => "SERVICE_NOT_FOUND",
            Error::NotFound => "NOT_FOUND",
            Error::Unauthorized => "UNAUTHORIZED",
            Error::Forbidden => "FORBIDDEN",
            Error::InvalidTransition { .. } => "INVALID_STATUS_TRANSITION",
            Error::CancellationNotAllowed => "CANCELLATION_NOT_ALLOWED",
            Error::TransactionFailed => "RESERVATION_FAILED",
        }
    }

    /// message shown to the caller, internal failures never leak their detail
    pub fn public_message(&self) -> String {
        match self {
            Error::DbError(_) | Error::ConfigReadError | Error::ConfigParseError => {
                "Internal server error".to_string()
            }
            e => e.to_string(),
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::DbError(_), Self::DbError(_)) => true,
            (Self::MissingRequiredFields(v1), Self::MissingRequiredFields(v2)) => v1 == v2,
            (Self::InvalidInput(v1), Self::InvalidInput(v2)) => v1 == v2,
            (Self::InvalidStatus(v1), Self::InvalidStatus(v2)) => v1 == v2,
            (Self::InvalidPageSize(v1), Self::InvalidPageSize(v2)) => v1 == v2,
            (Self::InvalidCursor(v1), Self::InvalidCursor(v2)) => v1 == v2,
            (Self::RoomNotFound(v1), Self::RoomNotFound(v2)) => v1 == v2,
            (Self::ReservationNotFound(v1), Self::ReservationNotFound(v2)) => v1 == v2,
            (Self::ServiceNotFound(v1), Self::ServiceNotFound(v2)) => v1 == v2,
            (
                Self::InvalidTransition { from: f1, to: t1 },
                Self::InvalidTransition { from: f2, to: t2 },
            ) => f1 == f2 && t1 == t2,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(e) => {
                let err: &PgDatabaseError = e.downcast_ref();
                match (err.code(), err.constraint()) {
                    ("23P01", Some("reservations_no_overlap")) => Error::RoomNotAvailable,
                    ("23514", Some("reservations_valid_stay")) => Error::InvalidDateRange,
                    ("23505", Some("rooms_number_key")) => Error::RoomNumberExists,
                    ("23503", Some("reservations_room_id_fkey")) => Error::RoomHasReservations,
                    _ => Error::DbError(sqlx::Error::Database(e)),
                }
            }
            sqlx::Error::RowNotFound => Error::NotFound,
            _ => Error::DbError(e),
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::DbError(_)
            | Error::ConfigReadError
            | Error::ConfigParseError
            | Error::TransactionFailed => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::RoomNotFound(_)
            | Error::ReservationNotFound(_)
            | Error::ServiceNotFound(_)
            | Error::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = self.code(), "request failed: {:?}", self);
        }
        HttpResponse::build(status).json(json!({
            "success": false,
            "error": self.public_message(),
            "code": self.code(),
        }))
    }
}
