use std::sync::Arc;

use abi::Config;
use actix_web::{middleware, web, App, HttpServer};
use reservation::ReservationManager;
use tracing::info;

mod identity;
mod notify;
mod service;
#[cfg(test)]
pub mod test_utils;

pub use identity::{Caller, Staff, PROFILE_ID_HEADER, USER_ID_HEADER, USER_ROLE_HEADER};
pub use notify::{deliver, LogNotifier, Notification, Notifier};

pub struct RsvpService {
    manager: ReservationManager,
    notifier: Arc<dyn Notifier>,
    config: Config,
}

impl RsvpService {
    pub fn new(manager: ReservationManager, notifier: Arc<dyn Notifier>, config: Config) -> Self {
        Self {
            manager,
            notifier,
            config,
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self, anyhow::Error> {
        let manager = ReservationManager::from_config(&config.db).await?;
        let notifier = Arc::new(LogNotifier::new(&config.notify.from));
        Ok(Self::new(manager, notifier, config.clone()))
    }
}

/// mount every route under `/api`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| abi::Error::InvalidInput(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| abi::Error::InvalidInput(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _| abi::Error::InvalidInput(err.to_string()).into()),
    )
    .service(
        web::scope("/api")
            .route("/health", web::get().to(service::health))
            .service(
                web::scope("/rooms")
                    .route("", web::get().to(service::list_rooms))
                    .route("", web::post().to(service::create_room))
                    .route("/{id}", web::get().to(service::get_room))
                    .route("/{id}", web::put().to(service::update_room))
                    .route("/{id}", web::delete().to(service::delete_room)),
            )
            .service(
                web::scope("/services")
                    .route("", web::get().to(service::list_services))
                    .route("", web::post().to(service::create_service)),
            )
            .service(
                web::scope("/reservations")
                    .route("", web::get().to(service::list_reservations))
                    .route("/availability", web::get().to(service::availability))
                    .route("/services", web::get().to(service::list_services))
                    .route(
                        "/create-with-payment",
                        web::post().to(service::create_with_payment),
                    )
                    .route("/{id}", web::get().to(service::get_reservation))
                    .route("/{id}/status", web::put().to(service::update_status))
                    .route("/{id}/status", web::patch().to(service::update_status))
                    .route("/{id}/cancel", web::put().to(service::cancel_reservation)),
            ),
    );
}

pub async fn start_server(config: &Config) -> Result<(), anyhow::Error> {
    let svc = RsvpService::from_config(config).await?;
    if config.server.migrate {
        info!("applying migrations");
        svc.manager.migrate().await?;
    }

    let svc = web::Data::new(svc);
    info!("Starting server at {}", config.server.url(false));
    HttpServer::new(move || {
        App::new()
            .app_data(svc.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
