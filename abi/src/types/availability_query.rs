use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::validate_range;
use crate::{Error, RoomType, Validator};

/// search parameters for free rooms, as received on the query string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// `all` or empty means any type
    pub room_type: Option<String>,
    /// minimum capacity
    pub guests: Option<i32>,
}

impl AvailabilityQuery {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: Some(start.to_string()),
            end_date: Some(end.to_string()),
            room_type: None,
            guests: None,
        }
    }

    pub fn with_room_type(mut self, room_type: RoomType) -> Self {
        self.room_type = Some(room_type.to_string());
        self
    }

    pub fn with_guests(mut self, guests: i32) -> Self {
        self.guests = Some(guests);
        self
    }

    pub fn stay(&self) -> Result<(NaiveDate, NaiveDate), Error> {
        let start = parse_date(self.start_date.as_deref(), "start_date")?;
        let end = parse_date(self.end_date.as_deref(), "end_date")?;
        validate_range(start, end)
    }

    pub fn room_type_filter(&self) -> Result<Option<RoomType>, Error> {
        match self.room_type.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(t) if t.eq_ignore_ascii_case("all") => Ok(None),
            Some(t) => t.parse().map(Some),
        }
    }

    pub fn min_capacity(&self) -> Result<Option<i32>, Error> {
        match self.guests {
            Some(g) if g <= 0 => Err(Error::InvalidInput("guests must be positive".into())),
            g => Ok(g),
        }
    }
}

fn parse_date(raw: Option<&str>, field: &str) -> Result<Option<NaiveDate>, Error> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidInput(format!("{} must be a YYYY-MM-DD date", field))),
    }
}

impl Validator for AvailabilityQuery {
    fn validate(&self) -> Result<(), Error> {
        self.stay()?;
        self.room_type_filter()?;
        self.min_capacity()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(start: Option<&str>, end: Option<&str>) -> AvailabilityQuery {
        AvailabilityQuery {
            start_date: start.map(String::from),
            end_date: end.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn missing_dates_should_be_rejected() {
        assert_eq!(
            query(None, Some("2024-06-12")).validate().unwrap_err(),
            Error::MissingDates
        );
        assert_eq!(
            query(Some(""), Some("2024-06-12")).validate().unwrap_err(),
            Error::MissingDates
        );
    }

    #[test]
    fn empty_stay_should_be_rejected() {
        assert_eq!(
            query(Some("2024-06-12"), Some("2024-06-12"))
                .validate()
                .unwrap_err(),
            Error::InvalidDateRange
        );
    }

    #[test]
    fn malformed_date_should_be_invalid_input() {
        assert!(matches!(
            query(Some("12/06/2024"), Some("2024-06-14")).validate(),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn room_type_all_should_mean_no_filter() {
        let mut q = query(Some("2024-06-12"), Some("2024-06-14"));
        q.room_type = Some("all".into());
        assert_eq!(q.room_type_filter().unwrap(), None);
        q.room_type = Some("Suite".into());
        assert_eq!(q.room_type_filter().unwrap(), Some(RoomType::Suite));
        q.room_type = Some("villa".into());
        assert!(q.validate().is_err());
    }

    #[test]
    fn builder_helpers_should_round_trip() {
        let start: NaiveDate = "2024-06-12".parse().unwrap();
        let end: NaiveDate = "2024-06-14".parse().unwrap();
        let q = AvailabilityQuery::new(start, end)
            .with_room_type(RoomType::Double)
            .with_guests(2);
        assert_eq!(q.stay().unwrap(), (start, end));
        assert_eq!(q.room_type_filter().unwrap(), Some(RoomType::Double));
        assert_eq!(q.min_capacity().unwrap(), Some(2));
        assert!(q.with_guests(0).validate().is_err());
    }
}
