#![allow(dead_code)]

use actix_web::http::header;
use actix_web::test::TestRequest;
use chrono::{Duration, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use rental_api::auth::{hash_password, Role, TokenSigner};
use rental_api::dates;

pub const SECRET: &str = "integration-secret";

/// In-memory databases are per connection, so the pool holds exactly one.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("open sqlite");
    rental_api::db::run_migrations(&pool)
        .await
        .expect("migrations");
    pool
}

pub fn signer() -> TokenSigner {
    TokenSigner::new(SECRET, 24)
}

macro_rules! test_app {
    ($pool:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($pool.clone()))
                .app_data(actix_web::web::Data::new(support::signer()))
                .configure(rental_api::routes::configure),
        )
        .await
    };
}

/// Inserts a user directly and returns its id and a bearer token.
pub async fn seed_user(pool: &SqlitePool, email: &str, role: Role) -> (i64, String) {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO users (name, email, password_hash, role) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(email.split('@').next().unwrap_or(email))
    .bind(email)
    .bind(hash_password("password123").expect("hash password"))
    .bind(role)
    .fetch_one(pool)
    .await
    .expect("insert user");

    let token = signer().issue(id, role, Utc::now()).expect("issue token");
    (id, token)
}

pub async fn seed_property(pool: &SqlitePool, tenant_id: i64, city: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO properties (tenant_id, name, city) VALUES (?, ?, ?) RETURNING id")
        .bind(tenant_id)
        .bind(format!("Stay in {city}"))
        .bind(city)
        .fetch_one(pool)
        .await
        .expect("insert property")
}

/// Room type with `quantity` room numbers.
pub async fn seed_room_type(pool: &SqlitePool, property_id: i64, price: f64, quantity: i64) -> i64 {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO room_types (property_id, name, price, quantity_room) VALUES (?, 'Deluxe', ?, ?) RETURNING id",
    )
    .bind(property_id)
    .bind(price)
    .bind(quantity)
    .fetch_one(pool)
    .await
    .expect("insert room type");

    for n in 1..=quantity {
        sqlx::query("INSERT INTO room_numbers (room_type_id, number) VALUES (?, ?)")
            .bind(id)
            .bind(n.to_string())
            .execute(pool)
            .await
            .expect("insert room number");
    }
    id
}

/// `DD-MM-YYYY` for today plus `days`.
pub fn day(days: i64) -> String {
    (dates::today() + Duration::days(days))
        .format(dates::DATE_FORMAT)
        .to_string()
}

pub fn get(uri: &str, token: Option<&str>) -> TestRequest {
    with_token(TestRequest::get().uri(uri), token)
}

pub fn post(uri: &str, token: Option<&str>) -> TestRequest {
    with_token(TestRequest::post().uri(uri), token)
}

pub fn put(uri: &str, token: Option<&str>) -> TestRequest {
    with_token(TestRequest::put().uri(uri), token)
}

pub fn delete(uri: &str, token: Option<&str>) -> TestRequest {
    with_token(TestRequest::delete().uri(uri), token)
}

fn with_token(req: TestRequest, token: Option<&str>) -> TestRequest {
    match token {
        Some(t) => req.insert_header((header::AUTHORIZATION, format!("Bearer {t}"))),
        None => req,
    }
}
