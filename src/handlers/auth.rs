use actix_web::{web, HttpResponse};
use chrono::Utc;
use sqlx::SqlitePool;
use validator::Validate;

use crate::auth::{hash_password, verify_password, TokenSigner};
use crate::error::{ApiError, ApiResult};
use crate::models::user::{LoginRequest, RegisterUser, TokenResponse, User};

pub async fn register(
    pool: web::Data<SqlitePool>,
    body: web::Json<RegisterUser>,
) -> ApiResult<HttpResponse> {
    body.validate()?;

    let email = body.email.trim().to_lowercase();
    let password_hash = hash_password(&body.password)?;
    let inserted = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, email, password_hash, role)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(body.name.trim())
    .bind(&email)
    .bind(password_hash)
    .bind(body.role)
    .fetch_one(pool.get_ref())
    .await;

    match inserted {
        Ok(user) => {
            log::info!("registered user {} as {:?}", user.id, user.role);
            Ok(HttpResponse::Created().json(user))
        }
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(ApiError::Conflict("Email is already registered".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn login(
    pool: web::Data<SqlitePool>,
    signer: web::Data<TokenSigner>,
    body: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    body.validate()?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(body.email.trim().to_lowercase())
        .fetch_optional(pool.get_ref())
        .await?;

    let user = match user {
        Some(u) if verify_password(&body.password, &u.password_hash) => u,
        _ => {
            log::warn!("failed login attempt");
            return Err(ApiError::Unauthorized("Invalid email or password"));
        }
    };

    let token = signer.issue(user.id, user.role, Utc::now())?;

    Ok(HttpResponse::Ok().json(TokenResponse {
        token,
        role: user.role,
        user_id: user.id,
    }))
}
