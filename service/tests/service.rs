#[path = "../src/test_utils.rs"]
mod test_utils;

use actix_web::{http::StatusCode, test, web, App};
use hotel_service::{configure, RsvpService, PROFILE_ID_HEADER, USER_ID_HEADER, USER_ROLE_HEADER};
use serde_json::{json, Value};
use sqlx::PgPool;
use test_utils::TestConfig;

macro_rules! send {
    ($app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

fn as_client(req: test::TestRequest, client_id: i64) -> test::TestRequest {
    req.insert_header((USER_ID_HEADER, "10"))
        .insert_header((USER_ROLE_HEADER, "client"))
        .insert_header((PROFILE_ID_HEADER, client_id.to_string()))
}

fn as_staff(req: test::TestRequest) -> test::TestRequest {
    req.insert_header((USER_ID_HEADER, "1"))
        .insert_header((USER_ROLE_HEADER, "admin"))
        .insert_header((PROFILE_ID_HEADER, "1"))
}

/// the fixture attributes client bookings to employee 1
async fn seed_people(pool: &PgPool) -> (i64, i64) {
    sqlx::query(
        "INSERT INTO hotel.employees (first_name, last_name, email) VALUES ('Eva', 'Ruiz', 'eva@hotel.local')",
    )
    .execute(pool)
    .await
    .unwrap();
    let mut ids = vec![];
    for email in ["ana@example.com", "bob@example.com"] {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO hotel.clients (first_name, last_name, email) VALUES ('Ana', 'Diaz', $1) RETURNING id",
        )
        .bind(email)
        .fetch_one(pool)
        .await
        .unwrap();
        ids.push(id);
    }
    (ids[0], ids[1])
}

fn booking_body(room_id: &Value, service_id: &Value) -> Value {
    json!({
        "room_id": room_id,
        "start_date": "2030-07-01",
        "end_date": "2030-07-03",
        "services": [{ "id": service_id, "quantity": 2, "total_price": 40 }],
        "guest_info": {
            "first_name": "Ana",
            "last_name": "Diaz",
            "email": "ana@example.com",
            "phone": "555-0101"
        },
        "payment_method": "card",
        "total_amount": 240,
        "special_requests": "late arrival"
    })
}

#[actix_web::test]
async fn booking_flow_should_work() {
    let tconfig = TestConfig::default();
    let (ana, bob) = seed_people(&tconfig.pool().await).await;
    let svc = RsvpService::from_config(&tconfig).await.unwrap();
    let app = test::init_service(App::new().app_data(web::Data::new(svc)).configure(configure)).await;

    let (status, body) = send!(
        app,
        as_staff(test::TestRequest::post())
            .uri("/api/rooms")
            .set_json(json!({ "number": "101", "type": "double", "price": 100, "amenities": ["WiFi"] }))
    );
    assert_eq!(status, StatusCode::CREATED);
    let room_id = body["room"]["id"].clone();

    let (status, body) = send!(
        app,
        as_staff(test::TestRequest::post())
            .uri("/api/services")
            .set_json(json!({ "name": "Breakfast", "price": 20 }))
    );
    assert_eq!(status, StatusCode::CREATED);
    let service_id = body["service"]["id"].clone();

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/reservations/availability?start_date=2030-07-01&end_date=2030-07-03&type=all")
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["rooms"][0]["total_nights_cost"], 200.0);
    assert_eq!(body["search"]["nights"], 2);

    let (status, body) = send!(
        app,
        as_client(test::TestRequest::post(), ana)
            .uri("/api/reservations/create-with-payment")
            .set_json(booking_body(&room_id, &service_id))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let reservation = &body["reservation"];
    assert_eq!(reservation["status"], "Confirmed");
    assert_eq!(reservation["client"]["name"], "Ana Diaz");
    assert_eq!(reservation["room"]["number"], "101");
    assert_eq!(reservation["payment"]["amount"], 240.0);
    assert_eq!(reservation["details"]["special_requests"], "late arrival");
    assert_eq!(body["notification"]["sent"], true);
    let id = reservation["id"].as_i64().unwrap();

    let (status, body) = send!(
        app,
        as_client(test::TestRequest::post(), bob)
            .uri("/api/reservations/create-with-payment")
            .set_json(booking_body(&room_id, &service_id))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "ROOM_NOT_AVAILABLE");

    let (status, body) = send!(
        app,
        as_client(test::TestRequest::get(), ana).uri(&format!("/api/reservations/{}", id))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["services"][0]["total_price"], 40.0);

    let (status, _) = send!(
        app,
        as_client(test::TestRequest::get(), bob).uri(&format!("/api/reservations/{}", id))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = send!(
        app,
        as_client(test::TestRequest::get(), bob).uri("/api/reservations")
    );
    assert_eq!(body["reservations"].as_array().unwrap().len(), 0);
    let (_, body) = send!(app, as_staff(test::TestRequest::get()).uri("/api/reservations"));
    assert_eq!(body["reservations"].as_array().unwrap().len(), 1);

    let (status, body) = send!(
        app,
        as_staff(test::TestRequest::delete()).uri(&format!("/api/rooms/{}", room_id))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "ROOM_HAS_ACTIVE_RESERVATIONS");

    let (status, body) = send!(
        app,
        as_staff(test::TestRequest::put())
            .uri(&format!("/api/reservations/{}/status", id))
            .set_json(json!({ "status": "completed" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reservation"]["status"], "Completed");

    let (status, body) = send!(
        app,
        as_client(test::TestRequest::put(), ana).uri(&format!("/api/reservations/{}/cancel", id))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_STATUS_TRANSITION");
}

#[actix_web::test]
async fn client_should_cancel_future_reservation() {
    let tconfig = TestConfig::default();
    let (ana, _) = seed_people(&tconfig.pool().await).await;
    let svc = RsvpService::from_config(&tconfig).await.unwrap();
    let app = test::init_service(App::new().app_data(web::Data::new(svc)).configure(configure)).await;

    let (_, body) = send!(
        app,
        as_staff(test::TestRequest::post())
            .uri("/api/rooms")
            .set_json(json!({ "number": "202", "type": "suite", "price": 100 }))
    );
    let room_id = body["room"]["id"].clone();
    let (_, body) = send!(
        app,
        as_staff(test::TestRequest::post())
            .uri("/api/services")
            .set_json(json!({ "name": "Spa", "price": 20 }))
    );
    let service_id = body["service"]["id"].clone();

    let (status, body) = send!(
        app,
        as_client(test::TestRequest::post(), ana)
            .uri("/api/reservations/create-with-payment")
            .set_json(booking_body(&room_id, &service_id))
    );
    assert_eq!(status, StatusCode::CREATED);
    let id = body["reservation"]["id"].as_i64().unwrap();

    let (status, body) = send!(
        app,
        as_client(test::TestRequest::put(), ana).uri(&format!("/api/reservations/{}/cancel", id))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reservation"]["status"], "Cancelled");

    let (_, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/reservations/availability?start_date=2030-07-02&end_date=2030-07-04")
    );
    assert_eq!(body["count"], 1);

    let (status, body) = send!(
        app,
        as_staff(test::TestRequest::delete()).uri(&format!("/api/rooms/{}", room_id))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "ROOM_HAS_RESERVATIONS");
}
