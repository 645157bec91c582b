use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::validate_range;
use crate::{
    check_amount, check_length, Error, Invoice, Payment, PaymentMethod, Reservation, RoomId,
    ServiceId, ServiceLineItem, MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_PHONE_LEN,
};

/// contact details of the person staying, used for first-time bookers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestInfo {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl GuestInfo {
    fn validate(&self) -> Result<(), Error> {
        check_length("first_name", &self.first_name, MAX_NAME_LEN)?;
        check_length("last_name", &self.last_name, MAX_NAME_LEN)?;
        check_length("email", &self.email, MAX_EMAIL_LEN)?;
        check_length("phone", &self.phone, MAX_PHONE_LEN)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSelection {
    #[serde(deserialize_with = "flexible_id")]
    pub id: ServiceId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    /// informational, line items are priced from the catalog
    #[serde(default)]
    pub total_price: Option<Decimal>,
}

fn default_quantity() -> i32 {
    1
}

/// booking payload as received, every field may be missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    #[serde(default, deserialize_with = "flexible_optional_id")]
    pub room_id: Option<RoomId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub services: Vec<ServiceSelection>,
    pub guest_info: Option<GuestInfo>,
    pub payment_method: Option<PaymentMethod>,
    pub total_amount: Option<Decimal>,
    #[serde(default)]
    pub special_requests: String,
}

/// a booking request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub room_id: RoomId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub services: Vec<ServiceSelection>,
    pub guest: GuestInfo,
    pub payment_method: PaymentMethod,
    pub total_amount: Decimal,
    pub special_requests: String,
}

/// everything the booking transaction committed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Booking {
    pub reservation: Reservation,
    pub line_items: Vec<ServiceLineItem>,
    pub invoice: Invoice,
    pub payment: Payment,
}

impl BookingRequest {
    pub fn new(room_id: RoomId, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            room_id: Some(room_id),
            start_date: Some(start),
            end_date: Some(end),
            ..Default::default()
        }
    }

    pub fn with_service(mut self, id: ServiceId, quantity: i32) -> Self {
        self.services.push(ServiceSelection {
            id,
            quantity,
            total_price: None,
        });
        self
    }

    pub fn with_payment(mut self, method: PaymentMethod, total_amount: Decimal) -> Self {
        self.payment_method = Some(method);
        self.total_amount = Some(total_amount);
        self
    }

    pub fn with_guest(mut self, guest: GuestInfo) -> Self {
        self.guest_info = Some(guest);
        self
    }

    /// check every required field before anything is written
    pub fn validated(self) -> Result<NewBooking, Error> {
        let mut missing = vec![];
        if self.room_id.is_none() {
            missing.push("room_id");
        }
        if self.start_date.is_none() {
            missing.push("start_date");
        }
        if self.end_date.is_none() {
            missing.push("end_date");
        }
        if self.guest_info.is_none() {
            missing.push("guest_info");
        }
        if self.payment_method.is_none() {
            missing.push("payment_method");
        }
        // a zero amount counts as not given
        let total_amount = self.total_amount.filter(|amount| !amount.is_zero());
        if total_amount.is_none() {
            missing.push("total_amount");
        }

        let (
            Some(room_id),
            Some(guest),
            Some(payment_method),
            Some(total_amount),
        ) = (self.room_id, self.guest_info, self.payment_method, total_amount) else {
            return Err(Error::MissingRequiredFields(missing));
        };
        if !missing.is_empty() {
            return Err(Error::MissingRequiredFields(missing));
        }

        let (start_date, end_date) = validate_range(self.start_date, self.end_date)?;

        check_amount("total_amount", total_amount)?;
        guest.validate()?;
        if let Some(s) = self.services.iter().find(|s| s.quantity < 1) {
            return Err(Error::InvalidInput(format!(
                "quantity for service {} must be at least 1",
                s.id
            )));
        }

        Ok(NewBooking {
            room_id,
            start_date,
            end_date,
            services: self.services,
            guest,
            payment_method,
            total_amount,
            special_requests: self.special_requests,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    fn into_id<E: serde::de::Error>(self) -> Result<i64, E> {
        match self {
            RawId::Number(n) => Ok(n),
            RawId::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid id '{}'", s))),
        }
    }
}

/// ids arrive either as numbers or as numeric strings
fn flexible_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    RawId::deserialize(deserializer)?.into_id()
}

fn flexible_optional_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<i64>, D::Error> {
    Option::<RawId>::deserialize(deserializer)?
        .map(RawId::into_id)
        .transpose()
}
