use std::collections::VecDeque;

use abi::{
    cancellation_allowed, check_amount, get_stay, nights_between, AvailabilityQuery,
    AvailableRoom, Booking, BookingPolicy, BookingRequest, Client, DbConfig, Error, GuestInfo,
    Identity, Invoice, NewBooking, Normalizer, Pager, Payment, Reservation,
    ReservationConfirmation, ReservationFilter, ReservationId, ReservationStatus, Room,
    ServiceLineItem, ToSql,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};
use tracing::{error, info, warn};

use crate::{ReservationManager, Rsvp};

const RESERVATION_COLUMNS: &str =
    "id, booked_at, start_date, end_date, status::text AS status, client_id, employee_id, room_id";

#[async_trait]
impl Rsvp for ReservationManager {
    async fn available_rooms(&self, query: AvailabilityQuery) -> Result<Vec<AvailableRoom>, Error> {
        let (start, end) = query.stay()?;
        let room_type = query.room_type_filter()?;
        let guests = query.min_capacity()?;

        // a room is free when no active reservation on it overlaps [start, end)
        let rooms: Vec<Room> = sqlx::query_as(
            r#"
            SELECT id, number, room_type::text AS room_type, price, status::text AS status,
                   capacity, amenities, description
            FROM hotel.rooms
            WHERE status = 'available'
              AND ($2::text IS NULL OR room_type::text = $2)
              AND ($3::int4 IS NULL OR capacity >= $3)
              AND id NOT IN (
                  SELECT room_id FROM hotel.reservations
                  WHERE (status = 'pending' OR status = 'confirmed') AND stay && $1
              )
            ORDER BY price, number
            "#,
        )
        .bind(get_stay(start, end))
        .bind(room_type.map(|t| t.to_string()))
        .bind(guests)
        .fetch_all(&self.pool)
        .await?;

        let nights = nights_between(start, end);
        Ok(rooms
            .into_iter()
            .map(|room| AvailableRoom::new(room, nights))
            .collect())
    }

    async fn reserve(
        &self,
        caller: &Identity,
        request: BookingRequest,
        policy: &BookingPolicy,
    ) -> Result<Booking, Error> {
        let booking = request.validated()?;

        let mut tx = self.pool.begin().await?;
        match book(&mut tx, caller, &booking, policy).await {
            Ok(done) => {
                tx.commit().await.map_err(|e| transaction_failed(e.into()))?;
                info!(
                    reservation = done.reservation.id,
                    room = booking.room_id,
                    "reservation confirmed"
                );
                Ok(done)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    warn!("rollback failed: {}", rollback);
                }
                Err(transaction_failed(e))
            }
        }
    }

    async fn confirmation(&self, id: ReservationId) -> Result<ReservationConfirmation, Error> {
        sqlx::query_as(
            r#"
            SELECT r.id, r.booked_at, r.start_date, r.end_date, r.status::text AS status,
                   r.client_id, c.first_name, c.last_name, c.email, c.phone,
                   h.number AS room_number, h.room_type::text AS room_type, h.price AS room_price,
                   i.id AS invoice_id, p.method::text AS payment_method, p.amount AS payment_amount,
                   d.total_cost, d.special_requests
            FROM hotel.reservations r
            JOIN hotel.clients c ON c.id = r.client_id
            JOIN hotel.rooms h ON h.id = r.room_id
            LEFT JOIN hotel.reservation_details d ON d.reservation_id = r.id
            LEFT JOIN hotel.invoices i ON i.reservation_id = r.id
            LEFT JOIN hotel.payments p ON p.invoice_id = i.id
            WHERE r.id = $1
            ORDER BY p.id
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::ReservationNotFound(id))
    }

    async fn get(&self, id: ReservationId) -> Result<Reservation, Error> {
        let sql = format!(
            "SELECT {} FROM hotel.reservations WHERE id = $1",
            RESERVATION_COLUMNS
        );
        sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::ReservationNotFound(id))
    }

    async fn change_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> Result<Reservation, Error> {
        let mut tx = self.pool.begin().await?;
        let current = lock_reservation(&mut tx, id).await?;
        let next = current.status.transition(status)?;
        let rsvp = update_status(&mut tx, id, next).await?;
        tx.commit().await?;

        info!(reservation = id, from = %current.status, to = %next, "status changed");
        Ok(rsvp)
    }

    async fn cancel(
        &self,
        caller: &Identity,
        id: ReservationId,
        today: NaiveDate,
    ) -> Result<Reservation, Error> {
        let mut tx = self.pool.begin().await?;
        let current = lock_reservation(&mut tx, id).await?;
        if !caller.can_access(current.client_id) {
            return Err(Error::Forbidden);
        }
        let next = current.status.transition(ReservationStatus::Cancelled)?;
        if !caller.is_staff() && !cancellation_allowed(current.start_date, today) {
            return Err(Error::CancellationNotAllowed);
        }
        let rsvp = update_status(&mut tx, id, next).await?;
        tx.commit().await?;

        info!(reservation = id, user = caller.user_id, "reservation cancelled");
        Ok(rsvp)
    }

    async fn filter(
        &self,
        mut filter: ReservationFilter,
    ) -> Result<(Vec<Reservation>, Pager), Error> {
        filter.normalize()?;
        let sql = filter.to_sql();
        let rsvps: Vec<Reservation> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        let mut rsvps: VecDeque<_> = rsvps.into_iter().collect();
        let pager = filter.get_pager(&mut rsvps);
        Ok((rsvps.into_iter().collect(), pager))
    }

    async fn line_items(&self, id: ReservationId) -> Result<Vec<ServiceLineItem>, Error> {
        let items = sqlx::query_as(
            r#"
            SELECT id, reservation_id, service_id, quantity, total_price
            FROM hotel.reservation_services
            WHERE reservation_id = $1
            ORDER BY id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}

impl ReservationManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn from_config(config: &DbConfig) -> Result<Self, Error> {
        let pool = PgPoolOptions::default()
            .max_connections(config.max_connections)
            .connect(&config.url())
            .await?;
        Ok(Self::new(pool))
    }

    /// apply the bundled schema migrations
    pub async fn migrate(&self) -> Result<(), Error> {
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await
            .map_err(sqlx::Error::from)?;
        Ok(())
    }
}

/// the booking unit of work, the caller commits or rolls back
async fn book(
    tx: &mut Transaction<'_, Postgres>,
    caller: &Identity,
    booking: &NewBooking,
    policy: &BookingPolicy,
) -> Result<Booking, Error> {
    // row lock serializes bookings of the same room
    let room_price: Decimal =
        sqlx::query_scalar("SELECT price FROM hotel.rooms WHERE id = $1 FOR NO KEY UPDATE")
            .bind(booking.room_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(Error::RoomNotFound(booking.room_id))?;

    // the room lock keeps this set stable until commit
    let sql = format!(
        r#"
        SELECT {} FROM hotel.reservations
        WHERE room_id = $1 AND (status = 'pending' OR status = 'confirmed') AND end_date > $2
        "#,
        RESERVATION_COLUMNS
    );
    let upcoming: Vec<Reservation> = sqlx::query_as(&sql)
        .bind(booking.room_id)
        .bind(booking.start_date)
        .fetch_all(&mut *tx)
        .await?;
    if let Some(existing) = upcoming
        .iter()
        .find(|r| r.blocks(booking.start_date, booking.end_date))
    {
        info!(
            room = booking.room_id,
            conflict = existing.id,
            "room already reserved for the stay"
        );
        return Err(Error::RoomNotAvailable);
    }

    let client_id = match caller.client_id() {
        Some(id) => id,
        None => resolve_guest(tx, &booking.guest, policy).await?.id,
    };
    let employee_id = caller.employee_id().or(policy.default_employee_id);

    let sql = format!(
        r#"
        INSERT INTO hotel.reservations (start_date, end_date, client_id, employee_id, room_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {}
        "#,
        RESERVATION_COLUMNS
    );
    let reservation: Reservation = sqlx::query_as(&sql)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(client_id)
        .bind(employee_id)
        .bind(booking.room_id)
        .fetch_one(&mut *tx)
        .await?;

    let mut line_items = Vec::with_capacity(booking.services.len());
    let mut services_total = Decimal::ZERO;
    for selection in &booking.services {
        let unit_price: Decimal =
            sqlx::query_scalar("SELECT price FROM hotel.services WHERE id = $1")
                .bind(selection.id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(Error::ServiceNotFound(selection.id))?;

        let line_total = unit_price * Decimal::from(selection.quantity);
        check_amount("service total", line_total)?;

        let item: ServiceLineItem = sqlx::query_as(
            r#"
            INSERT INTO hotel.reservation_services (reservation_id, service_id, quantity, total_price)
            VALUES ($1, $2, $3, $4)
            RETURNING id, reservation_id, service_id, quantity, total_price
            "#,
        )
        .bind(reservation.id)
        .bind(selection.id)
        .bind(selection.quantity)
        .bind(line_total)
        .fetch_one(&mut *tx)
        .await?;

        services_total += item.total_price;
        line_items.push(item);
    }

    let expected = room_price * Decimal::from(reservation.nights()) + services_total;
    if expected != booking.total_amount {
        warn!(
            reservation = reservation.id,
            %expected,
            declared = %booking.total_amount,
            "declared total differs from catalog prices"
        );
    }

    sqlx::query(
        r#"
        INSERT INTO hotel.reservation_details (reservation_id, total_cost, special_requests)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(reservation.id)
    .bind(booking.total_amount)
    .bind(&booking.special_requests)
    .execute(&mut *tx)
    .await?;

    let invoice: Invoice = sqlx::query_as(
        r#"
        INSERT INTO hotel.invoices (reservation_id, total, status)
        VALUES ($1, $2, 'paid')
        RETURNING id, reservation_id, total, status::text AS status, created_at
        "#,
    )
    .bind(reservation.id)
    .bind(booking.total_amount)
    .fetch_one(&mut *tx)
    .await?;

    let payment: Payment = sqlx::query_as(
        r#"
        INSERT INTO hotel.payments (invoice_id, amount, method)
        VALUES ($1, $2, $3::hotel.payment_method)
        RETURNING id, invoice_id, amount, method::text AS method, paid_at
        "#,
    )
    .bind(invoice.id)
    .bind(booking.total_amount)
    .bind(booking.payment_method.to_string())
    .fetch_one(&mut *tx)
    .await?;

    let confirmed = reservation.status.transition(ReservationStatus::Confirmed)?;
    let reservation = update_status(tx, reservation.id, confirmed).await?;

    Ok(Booking {
        reservation,
        line_items,
        invoice,
        payment,
    })
}

/// callers without a client profile book for a guest: reuse the client with the guest's
/// email, or the default client when no email was given
async fn resolve_guest(
    tx: &mut Transaction<'_, Postgres>,
    guest: &GuestInfo,
    policy: &BookingPolicy,
) -> Result<Client, Error> {
    let email = match guest.email.trim() {
        "" => policy.default_client_email.as_str(),
        email => email,
    };
    let first_name = match guest.first_name.trim() {
        "" => "Guest",
        name => name,
    };

    let client: Client = sqlx::query_as(
        r#"
        INSERT INTO hotel.clients (first_name, last_name, email, phone)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
        RETURNING id, first_name, last_name, email, phone
        "#,
    )
    .bind(first_name)
    .bind(guest.last_name.trim())
    .bind(email)
    .bind(guest.phone.trim())
    .fetch_one(&mut *tx)
    .await?;

    info!(client = client.id, name = %client.full_name(), "booking for guest");
    Ok(client)
}

async fn lock_reservation(
    tx: &mut Transaction<'_, Postgres>,
    id: ReservationId,
) -> Result<Reservation, Error> {
    let sql = format!(
        "SELECT {} FROM hotel.reservations WHERE id = $1 FOR UPDATE",
        RESERVATION_COLUMNS
    );
    sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(Error::ReservationNotFound(id))
}

async fn update_status(
    tx: &mut Transaction<'_, Postgres>,
    id: ReservationId,
    status: ReservationStatus,
) -> Result<Reservation, Error> {
    let sql = format!(
        "UPDATE hotel.reservations SET status = $2::hotel.reservation_status WHERE id = $1 RETURNING {}",
        RESERVATION_COLUMNS
    );
    let rsvp = sqlx::query_as(&sql)
        .bind(id)
        .bind(status.to_string())
        .fetch_one(&mut *tx)
        .await?;
    Ok(rsvp)
}

/// unexpected database failures surface as a generic booking failure
fn transaction_failed(e: Error) -> Error {
    match e {
        Error::DbError(e) => {
            error!("booking transaction failed: {}", e);
            Error::TransactionFailed
        }
        e => e,
    }
}
