mod config;
mod error;
mod pager;
mod types;
mod utils;

pub use config::*;
pub use error::Error;
pub use pager::{Id, PageInfo, Pager, Paginator};
pub use types::*;
pub use utils::*;

pub type RoomId = i64;
pub type ReservationId = i64;
pub type ClientId = i64;
pub type EmployeeId = i64;
pub type ServiceId = i64;

/// validate the data structure, return error if invalid
pub trait Validator {
    fn validate(&self) -> Result<(), Error>;
}

/// fill in defaults and normalize user supplied values before validation
pub trait Normalizer: Validator {
    /// caller should call normalize to make sure the data structure is ready to use
    fn normalize(&mut self) -> Result<(), Error> {
        self.validate()?;
        self.do_normalize();
        Ok(())
    }

    /// user shall implement do_normalize() to normalize the data structure
    fn do_normalize(&mut self);
}

pub trait ToSql {
    fn to_sql(&self) -> String;
}
