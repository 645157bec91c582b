mod catalog;
mod manager;

use abi::{
    AvailabilityQuery, AvailableRoom, Booking, BookingPolicy, BookingRequest, Error, Identity,
    NewRoom, NewServiceItem, Pager, Reservation, ReservationConfirmation, ReservationFilter,
    ReservationId, ReservationStatus, Room, RoomId, RoomStatus, RoomType, ServiceItem,
    ServiceLineItem,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

#[derive(Debug, Clone)]
pub struct ReservationManager {
    pool: PgPool,
}

#[async_trait]
pub trait Rsvp {
    /// rooms free for the whole stay, cheapest first
    async fn available_rooms(&self, query: AvailabilityQuery) -> Result<Vec<AvailableRoom>, Error>;

    /// book a room with its services, invoice and payment in one transaction
    async fn reserve(
        &self,
        caller: &Identity,
        request: BookingRequest,
        policy: &BookingPolicy,
    ) -> Result<Booking, Error>;

    /// joined view of a reservation for confirmation pages
    async fn confirmation(&self, id: ReservationId) -> Result<ReservationConfirmation, Error>;

    /// get a reservation by id
    async fn get(&self, id: ReservationId) -> Result<Reservation, Error>;

    /// move a reservation to `status` if the transition table allows it
    async fn change_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> Result<Reservation, Error>;

    /// cancel on behalf of `caller`, clients are held to the cancellation window
    async fn cancel(
        &self,
        caller: &Identity,
        id: ReservationId,
        today: NaiveDate,
    ) -> Result<Reservation, Error>;

    /// query reservations, order by reservation id
    async fn filter(&self, filter: ReservationFilter) -> Result<(Vec<Reservation>, Pager), Error>;

    /// services booked with a reservation
    async fn line_items(&self, id: ReservationId) -> Result<Vec<ServiceLineItem>, Error>;
}

/// room inventory and the add-on service catalog
#[async_trait]
pub trait Catalog {
    async fn create_room(&self, room: NewRoom) -> Result<Room, Error>;
    async fn get_room(&self, id: RoomId) -> Result<Room, Error>;
    async fn list_rooms(
        &self,
        room_type: Option<RoomType>,
        status: Option<RoomStatus>,
    ) -> Result<Vec<Room>, Error>;
    async fn update_room(&self, id: RoomId, room: NewRoom) -> Result<Room, Error>;
    /// rooms that ever had a reservation are kept for the audit trail
    async fn delete_room(&self, id: RoomId) -> Result<(), Error>;
    async fn list_services(&self) -> Result<Vec<ServiceItem>, Error>;
    async fn create_service(&self, service: NewServiceItem) -> Result<ServiceItem, Error>;
}
