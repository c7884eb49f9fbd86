use actix_web::{web, HttpRequest};

use crate::error::ApiError;
use crate::handlers;

fn json_error(err: actix_web::error::JsonPayloadError, _: &HttpRequest) -> actix_web::Error {
    ApiError::bad_request(format!("Invalid JSON body: {err}")).into()
}

fn query_error(err: actix_web::error::QueryPayloadError, _: &HttpRequest) -> actix_web::Error {
    ApiError::bad_request(format!("Invalid query string: {err}")).into()
}

fn path_error(err: actix_web::error::PathError, _: &HttpRequest) -> actix_web::Error {
    ApiError::bad_request(format!("Invalid path: {err}")).into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .route("/health", web::get().to(handlers::health::health))
        .service(
            web::scope("/auth")
                .route("/register", web::post().to(handlers::auth::register))
                .route("/login", web::post().to(handlers::auth::login)),
        )
        .service(
            web::scope("/properties")
                .route("", web::get().to(handlers::properties::list_properties))
                .route("", web::post().to(handlers::properties::create_property))
                .route("/{id}", web::get().to(handlers::properties::get_property))
                .route("/{id}", web::put().to(handlers::properties::update_property))
                .route("/{id}", web::delete().to(handlers::properties::delete_property)),
        )
        .service(
            web::scope("/rooms")
                .route("", web::post().to(handlers::rooms::create_room_type))
                .route("/{id}", web::get().to(handlers::rooms::get_room_type))
                .route("/{id}", web::put().to(handlers::rooms::update_room_type))
                .route("/{id}", web::delete().to(handlers::rooms::delete_room_type))
                .route(
                    "/{id}/availability",
                    web::get().to(handlers::rooms::room_availability),
                ),
        )
        .service(
            web::scope("/price-seasons")
                .route("", web::post().to(handlers::price_seasons::create_price_season))
                .route(
                    "/room/{room_type_id}",
                    web::get().to(handlers::price_seasons::list_price_seasons),
                )
                .route(
                    "/{id}",
                    web::delete().to(handlers::price_seasons::delete_price_season),
                ),
        )
        .service(
            web::scope("/bookings")
                .route("", web::post().to(handlers::bookings::create_booking))
                .route("", web::get().to(handlers::bookings::list_my_bookings))
                .route(
                    "/property/{id}",
                    web::get().to(handlers::bookings::list_property_bookings),
                )
                .route("/{id}", web::get().to(handlers::bookings::get_booking))
                .route("/{id}", web::delete().to(handlers::bookings::cancel_booking)),
        );
}
