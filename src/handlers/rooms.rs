use actix_web::{web, HttpResponse};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use validator::Validate;

use crate::auth::AuthUser;
use crate::availability::{self, AvailabilityStatus};
use crate::dates::{self, StayWindow};
use crate::db::normalize_facilities;
use crate::error::{ApiError, ApiResult};
use crate::handlers::properties::{load_owned_property, room_facilities};
use crate::models::room::{
    AvailabilityQuery, CreateRoomType, RoomAvailability, RoomNumber, RoomType, UpdateRoomType,
};
use crate::pricing;

pub(crate) async fn load_room_type(pool: &SqlitePool, id: i64) -> ApiResult<RoomType> {
    sqlx::query_as::<_, RoomType>("SELECT * FROM room_types WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::NotFound("Room type"))
}

/// Inserts room numbers `from + 1 ..= to` for a room type.
async fn add_room_numbers(
    conn: &mut SqliteConnection,
    room_type_id: i64,
    from: i64,
    to: i64,
) -> ApiResult<()> {
    for n in (from + 1)..=to {
        sqlx::query("INSERT INTO room_numbers (room_type_id, number) VALUES (?, ?)")
            .bind(room_type_id)
            .bind(n.to_string())
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub async fn create_room_type(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    body: web::Json<CreateRoomType>,
) -> ApiResult<HttpResponse> {
    body.validate()?;
    let property = load_owned_property(pool.get_ref(), body.property_id, &user).await?;

    let room_type = sqlx::query_as::<_, RoomType>(
        r#"
        INSERT INTO room_types (property_id, name, price, quantity_room, guest_capacity)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(property.id)
    .bind(body.name.trim())
    .bind(body.price)
    .bind(body.quantity_room)
    .bind(body.guest_capacity)
    .fetch_one(pool.get_ref())
    .await?;

    let mut conn = pool.acquire().await?;
    add_room_numbers(&mut conn, room_type.id, 0, body.quantity_room).await?;

    let facilities = normalize_facilities(&body.facilities);
    for name in &facilities {
        sqlx::query("INSERT INTO room_facilities (room_type_id, name) VALUES (?, ?)")
            .bind(room_type.id)
            .bind(name)
            .execute(&mut *conn)
            .await?;
    }

    log::info!(
        "tenant {} created room type {} ({} rooms) in property {}",
        user.id,
        room_type.id,
        room_type.quantity_room,
        property.id
    );

    Ok(HttpResponse::Created().json(serde_json::json!({
        "room_type": room_type,
        "facilities": facilities,
    })))
}

async fn resize_room_numbers(
    tx: &mut Transaction<'_, Sqlite>,
    room_type_id: i64,
    quantity: i64,
) -> ApiResult<()> {
    let current: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM room_numbers WHERE room_type_id = ?")
        .bind(room_type_id)
        .fetch_one(&mut **tx)
        .await?;

    if current < quantity {
        let next: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(CAST(number AS INTEGER)), 0) FROM room_numbers WHERE room_type_id = ?",
        )
        .bind(room_type_id)
        .fetch_one(&mut **tx)
        .await?;
        add_room_numbers(&mut **tx, room_type_id, next, next + quantity - current).await?;
    } else if current > quantity {
        // Newest units go first; their price history cascades with them.
        sqlx::query(
            r#"
            DELETE FROM room_numbers WHERE id IN (
                SELECT id FROM room_numbers WHERE room_type_id = ?
                ORDER BY id DESC LIMIT ?
            )
            "#,
        )
        .bind(room_type_id)
        .bind(current - quantity)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub async fn update_room_type(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    path: web::Path<i64>,
    body: web::Json<UpdateRoomType>,
) -> ApiResult<HttpResponse> {
    body.validate()?;
    let room_type = load_room_type(pool.get_ref(), path.into_inner()).await?;
    load_owned_property(pool.get_ref(), room_type.property_id, &user).await?;

    let facilities = normalize_facilities(&body.facilities);

    // Room type, room numbers and facilities change together or not at all.
    let mut tx = pool.begin().await?;

    let updated = sqlx::query_as::<_, RoomType>(
        r#"
        UPDATE room_types SET name = ?, price = ?, quantity_room = ?, guest_capacity = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(body.name.trim())
    .bind(body.price)
    .bind(body.quantity_room)
    .bind(body.guest_capacity)
    .bind(room_type.id)
    .fetch_one(&mut *tx)
    .await?;

    resize_room_numbers(&mut tx, room_type.id, body.quantity_room).await?;

    sqlx::query("DELETE FROM room_facilities WHERE room_type_id = ?")
        .bind(room_type.id)
        .execute(&mut *tx)
        .await?;
    for name in &facilities {
        sqlx::query("INSERT INTO room_facilities (room_type_id, name) VALUES (?, ?)")
            .bind(room_type.id)
            .bind(name)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    log::info!("tenant {} updated room type {}", user.id, room_type.id);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "room_type": updated,
        "facilities": facilities,
    })))
}

pub async fn delete_room_type(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let room_type = load_room_type(pool.get_ref(), path.into_inner()).await?;
    load_owned_property(pool.get_ref(), room_type.property_id, &user).await?;

    let mut tx = pool.begin().await?;

    let bookings: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM property_bookings WHERE room_type_id = ?")
            .bind(room_type.id)
            .fetch_one(&mut *tx)
            .await?;

    if bookings > 0 {
        return Err(ApiError::Conflict(format!(
            "Room type has {bookings} bookings on record"
        )));
    }

    sqlx::query("DELETE FROM room_facilities WHERE room_type_id = ?")
        .bind(room_type.id)
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        r#"
        DELETE FROM property_price_history WHERE room_numbers_id IN (
            SELECT id FROM room_numbers WHERE room_type_id = ?
        )
        "#,
    )
    .bind(room_type.id)
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM room_numbers WHERE room_type_id = ?")
        .bind(room_type.id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM room_types WHERE id = ?")
        .bind(room_type.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    log::info!("tenant {} deleted room type {}", user.id, room_type.id);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Room type deleted",
        "id": room_type.id,
    })))
}

pub async fn room_availability(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    params: web::Query<AvailabilityQuery>,
) -> ApiResult<HttpResponse> {
    let room_type = load_room_type(pool.get_ref(), path.into_inner()).await?;
    let today = dates::today();
    let window =
        StayWindow::from_optional(params.check_in.as_deref(), params.check_out.as_deref(), today)?;

    let occupancy = availability::load_occupancy(pool.get_ref(), room_type.id, &window).await?;
    let status = occupancy.status();
    let lowest_price = match status {
        AvailabilityStatus::Unavailable => None,
        _ => Some(
            pricing::room_type_lowest_price(
                pool.get_ref(),
                room_type.id,
                room_type.price,
                &window,
                today,
            )
            .await?,
        ),
    };

    Ok(HttpResponse::Ok().json(RoomAvailability {
        room_type_id: room_type.id,
        check_in: window.check_in,
        check_out: window.check_out,
        status,
        total_units: occupancy.total,
        free_units: occupancy.free_units(),
        lowest_price,
    }))
}

pub async fn get_room_type(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let room_type = load_room_type(pool.get_ref(), path.into_inner()).await?;
    let facilities = room_facilities(pool.get_ref(), room_type.id).await?;
    let room_numbers = sqlx::query_as::<_, RoomNumber>(
        "SELECT * FROM room_numbers WHERE room_type_id = ? ORDER BY id",
    )
    .bind(room_type.id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "room_type": room_type,
        "facilities": facilities,
        "room_numbers": room_numbers,
    })))
}
