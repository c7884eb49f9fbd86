use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;
use validator::Validate;

use crate::auth::AuthUser;
use crate::dates::parse_dmy;
use crate::error::{ApiError, ApiResult};
use crate::handlers::properties::load_owned_property;
use crate::handlers::rooms::load_room_type;
use crate::models::price_season::{CreatePriceSeason, PriceSeasonRow, PropertyPriceHistory};

pub async fn create_price_season(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    body: web::Json<CreatePriceSeason>,
) -> ApiResult<HttpResponse> {
    body.validate()?;

    let start_date = parse_dmy("start_date", &body.start_date)?;
    let end_date = parse_dmy("end_date", &body.end_date)?;
    if end_date < start_date {
        return Err(ApiError::bad_request("end_date must not be before start_date"));
    }

    let room_type = load_room_type(pool.get_ref(), body.room_type_id).await?;
    load_owned_property(pool.get_ref(), room_type.property_id, &user).await?;

    let room_numbers: Vec<i64> =
        sqlx::query_scalar("SELECT id FROM room_numbers WHERE room_type_id = ? ORDER BY id")
            .bind(room_type.id)
            .fetch_all(pool.get_ref())
            .await?;

    if room_numbers.is_empty() {
        return Err(ApiError::bad_request("Room type has no room numbers to price"));
    }

    // One row per unit, written without a transaction: a failure part way
    // leaves the earlier units priced.
    let mut created = Vec::with_capacity(room_numbers.len());
    for room_numbers_id in room_numbers {
        let row = sqlx::query_as::<_, PropertyPriceHistory>(
            r#"
            INSERT INTO property_price_history (room_numbers_id, start_date, end_date, final_price)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(room_numbers_id)
        .bind(start_date)
        .bind(end_date)
        .bind(body.final_price)
        .fetch_one(pool.get_ref())
        .await?;
        created.push(row);
    }

    log::info!(
        "tenant {} priced room type {} at {} from {} to {} ({} units)",
        user.id,
        room_type.id,
        body.final_price,
        start_date,
        end_date,
        created.len()
    );

    Ok(HttpResponse::Created().json(serde_json::json!({
        "room_type_id": room_type.id,
        "start_date": start_date,
        "end_date": end_date,
        "final_price": body.final_price,
        "base_price": room_type.price,
        "history": created,
    })))
}

pub async fn list_price_seasons(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let room_type = load_room_type(pool.get_ref(), path.into_inner()).await?;

    let rows = sqlx::query_as::<_, PriceSeasonRow>(
        r#"
        SELECT h.id, h.room_numbers_id, rn.number AS room_number,
               h.start_date, h.end_date, h.final_price
        FROM property_price_history h
        JOIN room_numbers rn ON rn.id = h.room_numbers_id
        WHERE rn.room_type_id = ?
        ORDER BY h.start_date, rn.id
        "#,
    )
    .bind(room_type.id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(rows))
}

pub async fn delete_price_season(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();

    let room_type_id: i64 = sqlx::query_scalar(
        r#"
        SELECT rn.room_type_id FROM property_price_history h
        JOIN room_numbers rn ON rn.id = h.room_numbers_id
        WHERE h.id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or(ApiError::NotFound("Price season"))?;

    let room_type = load_room_type(pool.get_ref(), room_type_id).await?;
    load_owned_property(pool.get_ref(), room_type.property_id, &user).await?;

    sqlx::query("DELETE FROM property_price_history WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await?;
    log::info!("tenant {} removed price season {}", user.id, id);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Price season deleted",
        "id": id,
    })))
}
