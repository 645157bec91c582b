use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::Error;

pub const DEFAULT_AMENITIES: [&str; 3] = ["WiFi", "TV", "Air conditioning"];

/// column widths of the text columns written from user input
pub const MAX_ROOM_NUMBER_LEN: usize = 16;
pub const MAX_NAME_LEN: usize = 64;
pub const MAX_SERVICE_NAME_LEN: usize = 128;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_PHONE_LEN: usize = 32;

/// money columns are NUMERIC(10, 2)
const MONEY_SCALE: u32 = 2;
const MONEY_DIGITS: u32 = 8;

pub fn check_length(field: &str, value: &str, max: usize) -> Result<(), Error> {
    if value.trim().chars().count() > max {
        return Err(Error::InvalidInput(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

/// a non-negative amount that fits a NUMERIC(10, 2) column without rounding
pub fn check_amount(field: &str, amount: Decimal) -> Result<(), Error> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::InvalidInput(format!("{} must not be negative", field)));
    }
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(Error::InvalidInput(format!(
            "{} must have at most {} decimal places",
            field, MONEY_SCALE
        )));
    }
    if amount.trunc() >= Decimal::from(10_i64.pow(MONEY_DIGITS)) {
        return Err(Error::InvalidInput(format!("{} is too large", field)));
    }
    Ok(())
}

/// half-open date intervals `[a_start, a_end)` and `[b_start, b_end)` share at least one night
pub fn overlaps(a: (NaiveDate, NaiveDate), b: (NaiveDate, NaiveDate)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

/// number of nights between two dates, zero or negative when the range is empty
pub fn nights_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// amenities are stored as comma separated text, an unset or blank value means the defaults
pub fn normalize_amenities(raw: Option<&str>) -> Vec<String> {
    let items: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    if items.is_empty() {
        DEFAULT_AMENITIES.iter().map(|s| s.to_string()).collect()
    } else {
        items
    }
}

pub fn join_amenities(amenities: &[String]) -> Option<String> {
    let joined = amenities
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    (!joined.is_empty()).then_some(joined)
}

/// a client may cancel only while the stay starts at least one day after `today`
pub fn cancellation_allowed(start: NaiveDate, today: NaiveDate) -> bool {
    start >= today + Duration::days(1)
}
