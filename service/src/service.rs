use abi::{
    nights_between, AvailabilityQuery, BookingRequest, Error, NewRoom, NewServiceItem,
    ReservationFilter, ReservationId, ReservationStatus, RoomId, RoomStatus, RoomType,
};
use actix_web::{web, HttpResponse};
use chrono::Utc;
use reservation::{Catalog, Rsvp};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::{
    identity::{Caller, Staff},
    notify::{deliver, Notification},
    RsvpService,
};

type Service = web::Data<RsvpService>;

#[derive(Debug, Default, Deserialize)]
pub struct RoomListQuery {
    #[serde(rename = "type")]
    pub room_type: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: Option<String>,
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn list_rooms(
    svc: Service,
    query: web::Query<RoomListQuery>,
) -> Result<HttpResponse, Error> {
    let room_type: Option<RoomType> = parse_filter(query.room_type.as_deref())?;
    let status: Option<RoomStatus> = parse_filter(query.status.as_deref())?;
    let rooms = svc.manager.list_rooms(room_type, status).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "rooms": rooms })))
}

pub async fn get_room(svc: Service, id: web::Path<RoomId>) -> Result<HttpResponse, Error> {
    let room = svc.manager.get_room(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "room": room })))
}

pub async fn create_room(
    svc: Service,
    _staff: Staff,
    room: web::Json<NewRoom>,
) -> Result<HttpResponse, Error> {
    let room = svc.manager.create_room(room.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({ "success": true, "room": room })))
}

pub async fn update_room(
    svc: Service,
    _staff: Staff,
    id: web::Path<RoomId>,
    room: web::Json<NewRoom>,
) -> Result<HttpResponse, Error> {
    let room = svc
        .manager
        .update_room(id.into_inner(), room.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "room": room })))
}

pub async fn delete_room(
    svc: Service,
    _staff: Staff,
    id: web::Path<RoomId>,
) -> Result<HttpResponse, Error> {
    svc.manager.delete_room(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "message": "Room deleted" })))
}

pub async fn list_services(svc: Service) -> Result<HttpResponse, Error> {
    let services = svc.manager.list_services().await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "services": services })))
}

pub async fn create_service(
    svc: Service,
    _staff: Staff,
    service: web::Json<NewServiceItem>,
) -> Result<HttpResponse, Error> {
    let service = svc.manager.create_service(service.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({ "success": true, "service": service })))
}

pub async fn availability(
    svc: Service,
    query: web::Query<AvailabilityQuery>,
) -> Result<HttpResponse, Error> {
    let query = query.into_inner();
    let (start, end) = query.stay()?;
    let rooms = svc.manager.available_rooms(query).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "rooms": rooms,
        "count": rooms.len(),
        "search": {
            "start_date": start,
            "end_date": end,
            "nights": nights_between(start, end),
        },
    })))
}

pub async fn create_with_payment(
    svc: Service,
    Caller(caller): Caller,
    request: web::Json<BookingRequest>,
) -> Result<HttpResponse, Error> {
    let booking = svc
        .manager
        .reserve(&caller, request.into_inner(), &svc.config.booking)
        .await?;
    let id = booking.reservation.id;

    // the booking is committed, nothing below may turn it into an error
    let body = match svc.manager.confirmation(id).await {
        Ok(view) => {
            let sent = deliver(&svc.config.notify, svc.notifier.booking_confirmed(&view)).await;
            json!({
                "success": true,
                "message": "Reservation created and paid",
                "reservation": view,
                "notification": Notification::new(sent, id),
            })
        }
        Err(e) => {
            warn!(reservation = id, "confirmation view unavailable: {}", e);
            json!({
                "success": true,
                "message": "Reservation created and paid",
                "reservation": booking,
                "notification": Notification::new(false, id),
            })
        }
    };
    Ok(HttpResponse::Created().json(body))
}

pub async fn list_reservations(
    svc: Service,
    Caller(caller): Caller,
    filter: web::Query<ReservationFilter>,
) -> Result<HttpResponse, Error> {
    let mut filter = filter.into_inner();
    if let Some(client_id) = caller.client_id() {
        filter = filter.restricted_to(client_id);
    }
    let (reservations, pager) = svc.manager.filter(filter).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "reservations": reservations,
        "pager": pager,
    })))
}

pub async fn get_reservation(
    svc: Service,
    Caller(caller): Caller,
    id: web::Path<ReservationId>,
) -> Result<HttpResponse, Error> {
    let id = id.into_inner();
    let view = svc.manager.confirmation(id).await?;
    if !caller.can_access(view.client_id) {
        return Err(Error::Forbidden);
    }
    let services = svc.manager.line_items(id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "reservation": view,
        "services": services,
    })))
}

pub async fn update_status(
    svc: Service,
    _staff: Staff,
    id: web::Path<ReservationId>,
    update: web::Json<StatusUpdate>,
) -> Result<HttpResponse, Error> {
    let status: ReservationStatus = update
        .status
        .as_deref()
        .ok_or(Error::MissingRequiredFields(vec!["status"]))?
        .parse()?;
    let rsvp = svc.manager.change_status(id.into_inner(), status).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "reservation": rsvp })))
}

pub async fn cancel_reservation(
    svc: Service,
    Caller(caller): Caller,
    id: web::Path<ReservationId>,
) -> Result<HttpResponse, Error> {
    let id = id.into_inner();
    let today = Utc::now().date_naive();
    let rsvp = svc.manager.cancel(&caller, id, today).await?;

    match svc.manager.confirmation(id).await {
        Ok(view) => {
            deliver(&svc.config.notify, svc.notifier.reservation_cancelled(&view)).await;
        }
        Err(e) => warn!(reservation = id, "cancellation notice skipped: {}", e),
    }
    Ok(HttpResponse::Ok().json(json!({ "success": true, "reservation": rsvp })))
}

/// `all` or an empty value means no filter
fn parse_filter<T>(raw: Option<&str>) -> Result<Option<T>, Error>
where
    T: std::str::FromStr<Err = Error>,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.eq_ignore_ascii_case("all") => Ok(None),
        Some(v) => v.parse().map(Some),
    }
}
