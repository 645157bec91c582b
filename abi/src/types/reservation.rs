use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};

use super::{parse_column, parse_optional_column};
use crate::{
    nights_between, overlaps, ClientId, EmployeeId, Id, PaymentMethod, ReservationId,
    ReservationStatus, RoomId, RoomType,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub booked_at: DateTime<Utc>,
    pub start_date: NaiveDate,
    /// exclusive
    pub end_date: NaiveDate,
    pub status: ReservationStatus,
    pub client_id: ClientId,
    pub employee_id: Option<EmployeeId>,
    pub room_id: RoomId,
}

impl Reservation {
    pub fn nights(&self) -> i64 {
        nights_between(self.start_date, self.end_date)
    }

    /// whether this reservation blocks the room for `[start, end)`
    pub fn blocks(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.status.is_active() && overlaps((self.start_date, self.end_date), (start, end))
    }
}

impl Id for Reservation {
    fn id(&self) -> i64 {
        self.id
    }
}

impl FromRow<'_, PgRow> for Reservation {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            booked_at: row.try_get("booked_at")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            status: parse_column(row, "status")?,
            client_id: row.try_get("client_id")?,
            employee_id: row.try_get("employee_id")?,
            room_id: row.try_get("room_id")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSummary {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub number: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub invoice_id: Option<i64>,
    pub method: Option<PaymentMethod>,
    pub amount: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationDetails {
    pub total_cost: Option<Decimal>,
    pub special_requests: String,
}

/// reservation joined with its client, room, invoice and payment for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationConfirmation {
    pub id: ReservationId,
    pub booking_date: DateTime<Utc>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ReservationStatus,
    pub client_id: ClientId,
    pub client: ClientSummary,
    pub room: RoomSummary,
    pub payment: PaymentSummary,
    pub details: ReservationDetails,
}

impl FromRow<'_, PgRow> for ReservationConfirmation {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let first_name: String = row.try_get("first_name")?;
        let last_name: String = row.try_get("last_name")?;
        let special_requests: Option<String> = row.try_get("special_requests")?;
        Ok(Self {
            id: row.try_get("id")?,
            booking_date: row.try_get("booked_at")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            status: parse_column(row, "status")?,
            client_id: row.try_get("client_id")?,
            client: ClientSummary {
                name: format!("{} {}", first_name, last_name),
                email: row.try_get("email")?,
                phone: row.try_get("phone")?,
            },
            room: RoomSummary {
                number: row.try_get("room_number")?,
                room_type: parse_column(row, "room_type")?,
                price: row.try_get("room_price")?,
            },
            payment: PaymentSummary {
                invoice_id: row.try_get("invoice_id")?,
                method: parse_optional_column(row, "payment_method")?,
                amount: row.try_get("payment_amount")?,
            },
            details: ReservationDetails {
                total_cost: row.try_get("total_cost")?,
                special_requests: special_requests.unwrap_or_default(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reservation(status: ReservationStatus) -> Reservation {
        Reservation {
            id: 1,
            booked_at: Utc::now(),
            start_date: "2024-06-10".parse().unwrap(),
            end_date: "2024-06-12".parse().unwrap(),
            status,
            client_id: 1,
            employee_id: None,
            room_id: 101,
        }
    }

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn active_reservation_should_block_overlapping_stay() {
        let rsvp = reservation(ReservationStatus::Confirmed);
        assert_eq!(rsvp.nights(), 2);
        assert!(rsvp.blocks(d("2024-06-11"), d("2024-06-13")));
        assert!(!rsvp.blocks(d("2024-06-12"), d("2024-06-14")));
    }

    #[test]
    fn inactive_reservation_should_not_block() {
        for status in [ReservationStatus::Cancelled, ReservationStatus::Completed] {
            assert!(!reservation(status).blocks(d("2024-06-10"), d("2024-06-12")));
        }
    }
}
