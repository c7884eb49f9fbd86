use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use sqlx::SqlitePool;
use validator::Validate;

use crate::auth::{AuthUser, Role};
use crate::availability::{self, AvailabilityStatus, RoomOccupancy};
use crate::dates::{self, StayWindow};
use crate::db::normalize_facilities;
use crate::error::{ApiError, ApiResult};
use crate::models::property::{Property, PropertyDetail, PropertyInput, PropertySearch, PropertySummary};
use crate::models::room::{RoomType, RoomTypeView};
use crate::pricing;

/// Loads a property and checks that the caller is the tenant who owns it.
pub(crate) async fn load_owned_property(
    pool: &SqlitePool,
    property_id: i64,
    user: &AuthUser,
) -> ApiResult<Property> {
    user.require(Role::Tenant)?;

    let property = sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = ?")
        .bind(property_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::NotFound("Property"))?;

    if property.tenant_id != user.id {
        return Err(ApiError::Forbidden("Property belongs to another tenant"));
    }
    Ok(property)
}

async fn property_facilities(pool: &SqlitePool, property_id: i64) -> ApiResult<Vec<String>> {
    Ok(sqlx::query_scalar::<_, String>(
        "SELECT name FROM property_facilities WHERE property_id = ? ORDER BY name",
    )
    .bind(property_id)
    .fetch_all(pool)
    .await?)
}

pub(crate) async fn room_facilities(pool: &SqlitePool, room_type_id: i64) -> ApiResult<Vec<String>> {
    Ok(
        sqlx::query_scalar::<_, String>("SELECT name FROM room_facilities WHERE room_type_id = ? ORDER BY name")
            .bind(room_type_id)
            .fetch_all(pool)
            .await?,
    )
}

async fn replace_property_facilities(
    pool: &SqlitePool,
    property_id: i64,
    facilities: &[String],
) -> ApiResult<()> {
    sqlx::query("DELETE FROM property_facilities WHERE property_id = ?")
        .bind(property_id)
        .execute(pool)
        .await?;

    for name in normalize_facilities(facilities) {
        sqlx::query("INSERT INTO property_facilities (property_id, name) VALUES (?, ?)")
            .bind(property_id)
            .bind(name)
            .execute(pool)
            .await?;
    }
    Ok(())
}

/// Resolves status and price for every room type, then for the property.
async fn resolve_property(
    pool: &SqlitePool,
    property: Property,
    window: &StayWindow,
    today: NaiveDate,
) -> ApiResult<PropertyDetail> {
    let room_types =
        sqlx::query_as::<_, RoomType>("SELECT * FROM room_types WHERE property_id = ? ORDER BY id")
            .bind(property.id)
            .fetch_all(pool)
            .await?;

    let occupancy: HashMap<i64, RoomOccupancy> =
        availability::load_property_occupancy(pool, property.id, window)
            .await?
            .into_iter()
            .collect();

    let mut priced = Vec::with_capacity(room_types.len());
    let mut views = Vec::with_capacity(room_types.len());
    for room_type in room_types {
        let occ = occupancy
            .get(&room_type.id)
            .copied()
            .unwrap_or_else(|| RoomOccupancy::new(room_type.quantity_room, 0, 0));
        let price =
            pricing::room_type_lowest_price(pool, room_type.id, room_type.price, window, today).await?;
        let status = occ.status();

        priced.push((occ, price));
        views.push(RoomTypeView {
            facilities: room_facilities(pool, room_type.id).await?,
            status,
            free_units: occ.free_units(),
            lowest_price: (status != AvailabilityStatus::Unavailable).then_some(price),
            room_type,
        });
    }

    let occupancies: Vec<RoomOccupancy> = priced.iter().map(|(occ, _)| *occ).collect();
    let status = availability::property_status(&occupancies);
    let lowest_price = pricing::property_lowest_price(status, priced);

    Ok(PropertyDetail {
        summary: PropertySummary {
            facilities: property_facilities(pool, property.id).await?,
            property,
            status,
            lowest_price,
        },
        room_types: views,
    })
}

pub async fn list_properties(
    pool: web::Data<SqlitePool>,
    params: web::Query<PropertySearch>,
) -> ApiResult<HttpResponse> {
    let today = dates::today();
    let window =
        StayWindow::from_optional(params.check_in.as_deref(), params.check_out.as_deref(), today)?;

    let city = params
        .city
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| format!("%{c}%"));

    let properties = sqlx::query_as::<_, Property>(
        "SELECT * FROM properties WHERE (?1 IS NULL OR city LIKE ?1) ORDER BY id",
    )
    .bind(city)
    .fetch_all(pool.get_ref())
    .await?;

    let mut summaries = Vec::with_capacity(properties.len());
    for property in properties {
        let detail = resolve_property(pool.get_ref(), property, &window, today).await?;
        summaries.push(detail.summary);
    }

    Ok(HttpResponse::Ok().json(summaries))
}

pub async fn get_property(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    params: web::Query<PropertySearch>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    let today = dates::today();
    let window =
        StayWindow::from_optional(params.check_in.as_deref(), params.check_out.as_deref(), today)?;

    let property = sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = ?")
        .bind(id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("Property"))?;

    let detail = resolve_property(pool.get_ref(), property, &window, today).await?;
    Ok(HttpResponse::Ok().json(detail))
}

pub async fn create_property(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    body: web::Json<PropertyInput>,
) -> ApiResult<HttpResponse> {
    user.require(Role::Tenant)?;
    body.validate()?;

    let property = sqlx::query_as::<_, Property>(
        r#"
        INSERT INTO properties (tenant_id, name, city, address, description)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(body.name.trim())
    .bind(body.city.trim())
    .bind(body.address.trim())
    .bind(&body.description)
    .fetch_one(pool.get_ref())
    .await?;

    replace_property_facilities(pool.get_ref(), property.id, &body.facilities).await?;
    log::info!("tenant {} created property {}", user.id, property.id);

    Ok(HttpResponse::Created().json(serde_json::json!({
        "property": property,
        "facilities": normalize_facilities(&body.facilities),
    })))
}

pub async fn update_property(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    path: web::Path<i64>,
    body: web::Json<PropertyInput>,
) -> ApiResult<HttpResponse> {
    body.validate()?;
    let property = load_owned_property(pool.get_ref(), path.into_inner(), &user).await?;

    let updated = sqlx::query_as::<_, Property>(
        r#"
        UPDATE properties SET name = ?, city = ?, address = ?, description = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(body.name.trim())
    .bind(body.city.trim())
    .bind(body.address.trim())
    .bind(&body.description)
    .bind(property.id)
    .fetch_one(pool.get_ref())
    .await?;

    replace_property_facilities(pool.get_ref(), property.id, &body.facilities).await?;
    log::info!("tenant {} updated property {}", user.id, property.id);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "property": updated,
        "facilities": normalize_facilities(&body.facilities),
    })))
}

pub async fn delete_property(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let property = load_owned_property(pool.get_ref(), path.into_inner(), &user).await?;

    // Guests keep their booking history, past and cancelled stays included.
    let bookings: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM property_bookings WHERE property_id = ?")
            .bind(property.id)
            .fetch_one(pool.get_ref())
            .await?;

    if bookings > 0 {
        return Err(ApiError::Conflict(format!(
            "Property has {bookings} bookings on record"
        )));
    }

    sqlx::query("DELETE FROM properties WHERE id = ?")
        .bind(property.id)
        .execute(pool.get_ref())
        .await?;
    log::info!("tenant {} deleted property {}", user.id, property.id);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Property deleted",
        "id": property.id,
    })))
}
