use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;
use validator::Validate;

use crate::auth::{AuthUser, Role};
use crate::availability::{self, AvailabilityStatus};
use crate::dates::{self, StayWindow};
use crate::error::{ApiError, ApiResult};
use crate::handlers::properties::load_owned_property;
use crate::models::booking::{BookingStatus, CreateBooking, PropertyBooking};
use crate::models::room::RoomType;
use crate::pricing;

const PRICE_TOLERANCE: f64 = 0.01;

pub async fn create_booking(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    body: web::Json<CreateBooking>,
) -> ApiResult<HttpResponse> {
    user.require(Role::Customer)?;

    // 1. Validate inputs
    body.validate()?;
    let window = StayWindow::parse(&body.check_in, &body.check_out)?;
    let today = dates::today();
    if window.check_in < today {
        return Err(ApiError::bad_request("check_in must not be in the past"));
    }

    // 2. The room type must belong to the property
    let room_type = sqlx::query_as::<_, RoomType>(
        "SELECT * FROM room_types WHERE id = ? AND property_id = ?",
    )
    .bind(body.room_type_id)
    .bind(body.property_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or(ApiError::NotFound("Room type"))?;

    // 3. Capacity check. Nothing is locked between here and the insert, so
    // two requests racing for the last unit can both pass.
    let occupancy = availability::load_occupancy(pool.get_ref(), room_type.id, &window).await?;
    match occupancy.status() {
        AvailabilityStatus::Available => {}
        AvailabilityStatus::Fullbooked => {
            return Err(ApiError::Conflict(format!(
                "Room type is fully booked: {} of {} units taken",
                occupancy.booked, occupancy.total
            )))
        }
        AvailabilityStatus::Unavailable => {
            return Err(ApiError::Conflict("Room type has no bookable units".to_string()))
        }
    }

    // 4. Quote. The client's total is what gets stored.
    let nightly = pricing::room_type_lowest_price(
        pool.get_ref(),
        room_type.id,
        room_type.price,
        &window,
        today,
    )
    .await?;
    let quoted_price = nightly * window.nights() as f64;
    if (body.total_price - quoted_price).abs() > PRICE_TOLERANCE {
        log::warn!(
            "booking total {} differs from quote {} for room type {}",
            body.total_price,
            quoted_price,
            room_type.id
        );
    }

    // 5. Insert booking
    let booking = sqlx::query_as::<_, PropertyBooking>(
        r#"
        INSERT INTO property_bookings
            (user_id, property_id, room_type_id, full_name, phone_number,
             check_in_date, check_out_date, total_price, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'confirmed')
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(room_type.property_id)
    .bind(room_type.id)
    .bind(body.full_name.trim())
    .bind(body.phone_number.trim())
    .bind(window.check_in)
    .bind(window.check_out)
    .bind(body.total_price)
    .fetch_one(pool.get_ref())
    .await?;

    // 6. Bump the counter, separately from the insert
    sqlx::query("UPDATE room_types SET total_booked = total_booked + 1 WHERE id = ?")
        .bind(room_type.id)
        .execute(pool.get_ref())
        .await?;

    log::info!(
        "user {} booked room type {} from {} to {} (booking {})",
        user.id,
        room_type.id,
        window.check_in,
        window.check_out,
        booking.id
    );

    Ok(HttpResponse::Created().json(serde_json::json!({
        "id": booking.id,
        "status": booking.status,
        "total_price": booking.total_price,
        "quoted_price": quoted_price,
        "message": "Booking successful"
    })))
}

async fn load_booking(pool: &SqlitePool, id: i64) -> ApiResult<PropertyBooking> {
    sqlx::query_as::<_, PropertyBooking>("SELECT * FROM property_bookings WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::NotFound("Booking"))
}

pub async fn get_booking(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let booking = load_booking(pool.get_ref(), path.into_inner()).await?;

    // The guest and the tenant owning the property may both look.
    if booking.user_id != user.id {
        load_owned_property(pool.get_ref(), booking.property_id, &user)
            .await
            .map_err(|e| match e {
                ApiError::NotFound(_) => ApiError::Forbidden("Booking belongs to another user"),
                other => other,
            })?;
    }

    Ok(HttpResponse::Ok().json(booking))
}

pub async fn list_my_bookings(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
) -> ApiResult<HttpResponse> {
    let bookings = sqlx::query_as::<_, PropertyBooking>(
        "SELECT * FROM property_bookings WHERE user_id = ? ORDER BY check_in_date DESC, id DESC",
    )
    .bind(user.id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(bookings))
}

pub async fn list_property_bookings(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let property = load_owned_property(pool.get_ref(), path.into_inner(), &user).await?;

    let bookings = sqlx::query_as::<_, PropertyBooking>(
        "SELECT * FROM property_bookings WHERE property_id = ? ORDER BY check_in_date, id",
    )
    .bind(property.id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(bookings))
}

pub async fn cancel_booking(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let booking = load_booking(pool.get_ref(), path.into_inner()).await?;

    if booking.user_id != user.id {
        return Err(ApiError::Forbidden("Booking belongs to another user"));
    }
    if booking.status == BookingStatus::Cancelled {
        return Err(ApiError::Conflict("Booking is already cancelled".to_string()));
    }
    if booking.check_in_date <= dates::today() {
        return Err(ApiError::bad_request(
            "Cannot cancel booking after or on check-in date",
        ));
    }

    sqlx::query("UPDATE property_bookings SET status = 'cancelled' WHERE id = ?")
        .bind(booking.id)
        .execute(pool.get_ref())
        .await?;
    sqlx::query("UPDATE room_types SET total_booked = MAX(total_booked - 1, 0) WHERE id = ?")
        .bind(booking.room_type_id)
        .execute(pool.get_ref())
        .await?;

    log::info!("user {} cancelled booking {}", user.id, booking.id);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Booking cancelled successfully",
        "id": booking.id,
        "refund_amount": booking.total_price
    })))
}
