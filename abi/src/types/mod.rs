use std::ops::Bound;

use chrono::NaiveDate;
use sqlx::{postgres::types::PgRange, postgres::PgRow, Row};

use crate::Error;

/// Display/FromStr for enums persisted as lowercase postgres enum labels.
/// Parsing accepts the label, any extra spelling after `|`, or the variant name in any case.
/// Unknown input is reported through the closure after `else`, `InvalidInput` by default.
macro_rules! db_enum {
    ($name:ident { $($variant:ident => $label:literal $(| $alias:literal)*),+ $(,)? }) => {
        db_enum!($name { $($variant => $label $(| $alias)*),+ } else |s: &str| {
            crate::Error::InvalidInput(format!("unknown {} '{}'", stringify!($name), s))
        });
    };
    ($name:ident { $($variant:ident => $label:literal $(| $alias:literal)*),+ $(,)? } else $invalid:expr) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $(
                    if s.eq_ignore_ascii_case($label)
                        $(|| s.eq_ignore_ascii_case($alias))*
                        || s.eq_ignore_ascii_case(stringify!($variant))
                    {
                        return Ok(Self::$variant);
                    }
                )+
                let invalid = $invalid;
                Err(invalid(s))
            }
        }
    };
}

mod availability_query;
mod billing;
mod booking;
mod client;
mod identity;
mod reservation;
mod reservation_filter;
mod reservation_status;
mod room;

pub use availability_query::*;
pub use billing::*;
pub use booking::*;
pub use client::*;
pub use identity::*;
pub use reservation::*;
pub use reservation_filter::*;
pub use reservation_status::*;
pub use room::*;

pub fn validate_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(NaiveDate, NaiveDate), Error> {
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok((start, end)),
        (Some(_), Some(_)) => Err(Error::InvalidDateRange),
        _ => Err(Error::MissingDates),
    }
}

/// `[start, end)` as a postgres daterange
pub fn get_stay(start: NaiveDate, end: NaiveDate) -> PgRange<NaiveDate> {
    PgRange {
        start: Bound::Included(start),
        end: Bound::Excluded(end),
    }
}

/// read a column rendered as text (enum columns are selected with `::text`) and parse it
pub(crate) fn parse_column<T>(row: &PgRow, column: &str) -> Result<T, sqlx::Error>
where
    T: std::str::FromStr<Err = Error>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: Error| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

pub(crate) fn parse_optional_column<T>(row: &PgRow, column: &str) -> Result<Option<T>, sqlx::Error>
where
    T: std::str::FromStr<Err = Error>,
{
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|raw| {
        raw.parse().map_err(|e: Error| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
    })
    .transpose()
}
