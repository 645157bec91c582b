use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};

use super::parse_column;
use crate::{
    check_amount, check_length, Error, ReservationId, ServiceId, Validator, MAX_NAME_LEN,
    MAX_SERVICE_NAME_LEN,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(alias = "card")]
    Card,
    #[serde(alias = "cash")]
    Cash,
    #[serde(alias = "transfer")]
    Transfer,
}

db_enum!(PaymentMethod {
    Card => "card",
    Cash => "cash",
    Transfer => "transfer",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

db_enum!(InvoiceStatus {
    Pending => "pending",
    Paid => "paid",
});

/// an add-on from the service catalog (breakfast, spa, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceItem {
    pub id: ServiceId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewServiceItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "General".to_string()
}

impl Validator for NewServiceItem {
    fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::MissingRequiredFields(vec!["name"]));
        }
        check_length("name", &self.name, MAX_SERVICE_NAME_LEN)?;
        check_length("category", &self.category, MAX_NAME_LEN)?;
        check_amount("price", self.price)
    }
}

/// a service attached to a reservation, priced when the booking was made
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ServiceLineItem {
    pub id: i64,
    pub reservation_id: ReservationId,
    pub service_id: ServiceId,
    pub quantity: i32,
    pub total_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub reservation_id: ReservationId,
    pub total: Decimal,
    pub status: InvoiceStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub invoice_id: i64,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub paid_at: DateTime<Utc>,
}

impl FromRow<'_, PgRow> for ServiceItem {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            category: row.try_get("category")?,
        })
    }
}

impl FromRow<'_, PgRow> for Invoice {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            reservation_id: row.try_get("reservation_id")?,
            total: row.try_get("total")?,
            status: parse_column(row, "status")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl FromRow<'_, PgRow> for Payment {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            invoice_id: row.try_get("invoice_id")?,
            amount: row.try_get("amount")?,
            method: parse_column(row, "method")?,
            paid_at: row.try_get("paid_at")?,
        })
    }
}
