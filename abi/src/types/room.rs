use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};

use super::parse_column;
use crate::{
    check_amount, check_length, normalize_amenities, Error, RoomId, Validator,
    MAX_ROOM_NUMBER_LEN,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    #[serde(alias = "single")]
    Single,
    #[serde(alias = "double")]
    Double,
    #[serde(alias = "suite")]
    Suite,
}

db_enum!(RoomType {
    Single => "single",
    Double => "double",
    Suite => "suite",
});

/// advisory only, occupancy for booking comes from overlapping reservations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomStatus {
    #[serde(alias = "available")]
    Available,
    #[serde(alias = "occupied")]
    Occupied,
    #[serde(alias = "maintenance")]
    Maintenance,
}

db_enum!(RoomStatus {
    Available => "available",
    Occupied => "occupied",
    Maintenance => "maintenance",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub number: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub price: Decimal,
    pub status: RoomStatus,
    pub capacity: i32,
    pub amenities: Vec<String>,
    pub description: String,
}

/// payload for creating or replacing a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRoom {
    pub number: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub price: Decimal,
    #[serde(default = "default_room_status")]
    pub status: RoomStatus,
    #[serde(default = "default_capacity")]
    pub capacity: i32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub description: String,
}

fn default_room_status() -> RoomStatus {
    RoomStatus::Available
}

fn default_capacity() -> i32 {
    2
}

impl NewRoom {
    pub fn new(number: impl Into<String>, room_type: RoomType, price: Decimal) -> Self {
        Self {
            number: number.into(),
            room_type,
            price,
            status: default_room_status(),
            capacity: default_capacity(),
            amenities: vec![],
            description: String::new(),
        }
    }
}

impl Validator for NewRoom {
    fn validate(&self) -> Result<(), Error> {
        if self.number.trim().is_empty() {
            return Err(Error::MissingRequiredFields(vec!["number"]));
        }
        check_length("number", &self.number, MAX_ROOM_NUMBER_LEN)?;
        check_amount("price", self.price)?;
        if self.capacity <= 0 {
            return Err(Error::InvalidInput("capacity must be positive".into()));
        }
        Ok(())
    }
}

/// a free room for the searched stay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailableRoom {
    #[serde(flatten)]
    pub room: Room,
    pub nights: i64,
    pub total_nights_cost: Decimal,
    pub available: bool,
}

impl AvailableRoom {
    pub fn new(room: Room, nights: i64) -> Self {
        let total_nights_cost = room.price * Decimal::from(nights);
        Self {
            room,
            nights,
            total_nights_cost,
            available: true,
        }
    }
}

impl FromRow<'_, PgRow> for Room {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let amenities: Option<String> = row.try_get("amenities")?;
        Ok(Self {
            id: row.try_get("id")?,
            number: row.try_get("number")?,
            room_type: parse_column(row, "room_type")?,
            price: row.try_get("price")?,
            status: parse_column(row, "status")?,
            capacity: row.try_get("capacity")?,
            amenities: normalize_amenities(amenities.as_deref()),
            description: row.try_get("description")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn room() -> Room {
        Room {
            id: 1,
            number: "101".to_string(),
            room_type: RoomType::Double,
            price: dec!(100),
            status: RoomStatus::Available,
            capacity: 2,
            amenities: vec!["WiFi".to_string()],
            description: "Garden view".to_string(),
        }
    }

    #[test]
    fn total_cost_should_be_price_times_nights() {
        let available = AvailableRoom::new(room(), 3);
        assert_eq!(available.total_nights_cost, dec!(300));
        assert!(available.available);
    }

    #[test]
    fn available_room_should_serialize_flat() {
        let value = serde_json::to_value(AvailableRoom::new(room(), 2)).unwrap();
        assert_eq!(value["number"], "101");
        assert_eq!(value["type"], "Double");
        assert_eq!(value["nights"], 2);
        assert_eq!(value["total_nights_cost"], 200.0);
        assert_eq!(value["available"], true);
    }

    #[test]
    fn room_enums_should_parse_leniently() {
        assert_eq!("SUITE".parse::<RoomType>().unwrap(), RoomType::Suite);
        assert_eq!(
            "maintenance".parse::<RoomStatus>().unwrap(),
            RoomStatus::Maintenance
        );
        assert!("penthouse".parse::<RoomType>().is_err());
        assert_eq!(RoomType::Double.to_string(), "double");
    }

    #[test]
    fn new_room_should_fill_defaults() {
        let room: NewRoom =
            serde_json::from_str(r#"{"number": "202", "type": "suite", "price": 250}"#).unwrap();
        assert_eq!(room.status, RoomStatus::Available);
        assert_eq!(room.capacity, 2);
        assert!(room.validate().is_ok());
    }

    #[test]
    fn new_room_should_be_validated() {
        let mut room = NewRoom::new(" ", RoomType::Single, dec!(80));
        assert_eq!(
            room.validate().unwrap_err(),
            Error::MissingRequiredFields(vec!["number"])
        );
        room.number = "12".into();
        room.capacity = 0;
        assert!(matches!(room.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn new_room_should_fit_its_columns() {
        let room = NewRoom::new("9".repeat(17), RoomType::Single, dec!(80));
        assert_eq!(
            room.validate().unwrap_err(),
            Error::InvalidInput("number must be at most 16 characters".to_string())
        );
        let room = NewRoom::new("101", RoomType::Single, dec!(80.505));
        assert!(matches!(room.validate(), Err(Error::InvalidInput(_))));
        let room = NewRoom::new("101", RoomType::Single, dec!(100000000));
        assert_eq!(
            room.validate().unwrap_err(),
            Error::InvalidInput("price is too large".to_string())
        );
    }
}
