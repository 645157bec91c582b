use std::collections::VecDeque;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::{
    pager::{Id, PageInfo, Pager, Paginator},
    ClientId, Error, Normalizer, ReservationStatus, RoomId, ToSql, Validator,
};

pub const DEFAULT_PAGE_SIZE: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(build_fn(name = "private_build"), setter(into), default)]
#[serde(default)]
pub struct ReservationFilter {
    #[builder(setter(into, strip_option))]
    pub client_id: Option<ClientId>,
    #[builder(setter(into, strip_option))]
    pub room_id: Option<RoomId>,
    #[builder(setter(into, strip_option))]
    pub status: Option<ReservationStatus>,
    #[builder(setter(into, strip_option))]
    pub cursor: Option<i64>,
    pub page_size: i64,
    pub desc: bool,
}

impl Default for ReservationFilter {
    fn default() -> Self {
        Self {
            client_id: None,
            room_id: None,
            status: None,
            cursor: None,
            page_size: DEFAULT_PAGE_SIZE,
            desc: false,
        }
    }
}

impl ReservationFilterBuilder {
    pub fn build(&self) -> Result<ReservationFilter, Error> {
        let mut filter = self
            .private_build()
            .map_err(|e| Error::InvalidInput(e.to_string()))?;
        filter.normalize()?;
        Ok(filter)
    }
}

impl Validator for ReservationFilter {
    fn validate(&self) -> Result<(), Error> {
        if self.page_size < 10 || self.page_size > 100 {
            return Err(Error::InvalidPageSize(self.page_size));
        }
        if let Some(cursor) = self.cursor {
            if cursor < 0 {
                return Err(Error::InvalidCursor(cursor));
            }
        }
        Ok(())
    }
}

impl Normalizer for ReservationFilter {
    fn normalize(&mut self) -> Result<(), Error> {
        self.do_normalize();
        self.validate()
    }

    fn do_normalize(&mut self) {
        if self.page_size == 0 {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        if self.cursor == Some(0) {
            self.cursor = None;
        }
    }
}

impl ReservationFilter {
    pub fn get_pager<T: Id>(&self, data: &mut VecDeque<T>) -> Pager {
        self.page_info().get_pager(data)
    }

    pub fn get_cursor(&self) -> i64 {
        self.cursor.unwrap_or(if self.desc { i64::MAX } else { 0 })
    }

    pub fn next_page(&self, pager: &Pager) -> Option<Self> {
        self.page_info().next_page(pager).map(|page_info| Self {
            cursor: page_info.cursor,
            page_size: page_info.page_size,
            desc: page_info.desc,
            ..self.clone()
        })
    }

    /// clients only ever see their own reservations
    pub fn restricted_to(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    fn page_info(&self) -> PageInfo {
        PageInfo {
            cursor: self.cursor,
            page_size: self.page_size,
            desc: self.desc,
        }
    }
}

impl ToSql for ReservationFilter {
    fn to_sql(&self) -> String {
        let limit = self.page_size + 1;

        let cursor_cond = if self.desc {
            format!("id < {}", self.get_cursor())
        } else {
            format!("id > {}", self.get_cursor())
        };

        let mut conds = vec![cursor_cond];
        if let Some(status) = self.status {
            conds.push(format!("status = '{}'", status));
        }
        if let Some(client_id) = self.client_id {
            conds.push(format!("client_id = {}", client_id));
        }
        if let Some(room_id) = self.room_id {
            conds.push(format!("room_id = {}", room_id));
        }

        let direction = if self.desc { "DESC" } else { "ASC" };

        format!(
            "SELECT id, booked_at, start_date, end_date, status::text AS status, client_id, employee_id, room_id FROM hotel.reservations WHERE {} ORDER BY id {} LIMIT {}",
            conds.join(" AND "),
            direction,
            limit
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_should_generate_correct_sql() {
        let filter = ReservationFilterBuilder::default()
            .client_id(42)
            .build()
            .unwrap();

        assert_eq!(filter.to_sql(), "SELECT id, booked_at, start_date, end_date, status::text AS status, client_id, employee_id, room_id FROM hotel.reservations WHERE id > 0 AND client_id = 42 ORDER BY id ASC LIMIT 11")
    }

    #[test]
    fn filter_with_status_and_cursor_should_generate_correct_sql() {
        let filter = ReservationFilterBuilder::default()
            .status(ReservationStatus::Confirmed)
            .room_id(7)
            .cursor(100)
            .page_size(20)
            .desc(true)
            .build()
            .unwrap();

        assert_eq!(filter.to_sql(), "SELECT id, booked_at, start_date, end_date, status::text AS status, client_id, employee_id, room_id FROM hotel.reservations WHERE id < 100 AND status = 'confirmed' AND room_id = 7 ORDER BY id DESC LIMIT 21")
    }

    #[test]
    fn filter_should_reject_bad_page_size() {
        let err = ReservationFilterBuilder::default()
            .page_size(500)
            .build()
            .unwrap_err();
        assert_eq!(err, Error::InvalidPageSize(500));
    }

    #[test]
    fn filter_should_deserialize_from_query_defaults() {
        let filter: ReservationFilter = serde_json::from_str(r#"{"status": "Pending"}"#).unwrap();
        assert_eq!(filter.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(filter.status, Some(ReservationStatus::Pending));
    }

    #[test]
    fn restricted_filter_should_pin_client() {
        let filter = ReservationFilter {
            client_id: Some(1),
            ..Default::default()
        }
        .restricted_to(9);
        assert_eq!(filter.client_id, Some(9));
    }

    #[test]
    fn next_page_should_keep_conditions() {
        let filter = ReservationFilterBuilder::default()
            .status(ReservationStatus::Pending)
            .build()
            .unwrap();
        let pager = Pager {
            prev: None,
            next: Some(10),
            total: None,
        };
        let next = filter.next_page(&pager).unwrap();
        assert_eq!(next.cursor, Some(10));
        assert_eq!(next.status, Some(ReservationStatus::Pending));
    }
}
