use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;

use crate::error::ApiResult;

pub async fn health(pool: web::Data<SqlitePool>) -> ApiResult<HttpResponse> {
    sqlx::query("SELECT 1").execute(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "ok" })))
}
