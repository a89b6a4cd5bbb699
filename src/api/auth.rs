// src/api/auth.rs

use actix_web::dev::Payload;
use actix_web::{post, web, FromRequest, HttpRequest, HttpResponse};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use futures_util::future::{ready, Ready};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::Row;
use utoipa::ToSchema;

use crate::db::is_unique_violation;
use crate::error::ApiError;
use crate::models::is_valid_email;
use crate::AppState;

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: i32,
    role: String,
    exp: usize,
}

/// The authenticated principal, extracted from the Bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i32,
    pub role: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user_id: i32,
    pub role: String,
}

#[utoipa::path(tag = "auth", responses((status = 201, description = "Account created", body = AuthResponse)))]
#[post("/api/auth/register")]
pub async fn register(
    state: web::Data<AppState>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let email = payload.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ApiError::validation("Please provide a valid email"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let password_hash = hash(&payload.password, DEFAULT_COST)
        .map_err(|e| ApiError::Internal(format!("password hash error: {e}")))?;

    let row = sqlx::query(
        r#"INSERT INTO users (username, email, password_hash, role)
           VALUES ($1, $2, $3, $4)
           RETURNING id, role"#,
    )
    .bind(payload.username.as_deref())
    .bind(&email)
    .bind(password_hash)
    .bind(ROLE_USER)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::validation("A user with this email already exists")
        } else {
            ApiError::Store(e)
        }
    })?;

    let user_id: i32 = row.get("id");
    let role: String = row.get("role");
    let token = generate_jwt(&state.jwt_secret, user_id, &role)?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "data": AuthResponse { token, user_id, role },
    })))
}

#[utoipa::path(tag = "auth", responses((status = 200, description = "Logged in", body = AuthResponse)))]
#[post("/api/auth/login")]
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let email = payload.email.trim().to_lowercase();

    let row = sqlx::query("SELECT id, password_hash, role FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.pool)
        .await?;

    let Some(row) = row else {
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    };

    let user_id: i32 = row.get("id");
    let password_hash: String = row.get("password_hash");
    let role: String = row.get("role");

    match verify(&payload.password, &password_hash) {
        Ok(true) => {}
        Ok(false) => return Err(ApiError::Unauthorized("Invalid credentials".into())),
        Err(e) => return Err(ApiError::Internal(format!("password verify error: {e}"))),
    }

    let token = generate_jwt(&state.jwt_secret, user_id, &role)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": AuthResponse { token, user_id, role },
    })))
}

fn generate_jwt(secret: &str, user_id: i32, role: &str) -> Result<String, ApiError> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::days(30))
        .ok_or_else(|| ApiError::Internal("token expiry out of range".into()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| ApiError::Internal(format!("jwt encode error: {e}")))
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, ApiError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ApiError::Internal("application state missing".into()))?;

    let auth_header = req
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return Err(ApiError::Unauthorized(
            "Missing or invalid Authorization header".into(),
        ));
    };

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthorized("Invalid token".into()))?;

    Ok(AuthUser {
        id: token_data.claims.sub,
        role: token_data.claims.role,
    })
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

/// Route-level role check, the counterpart of a per-route admin guard.
pub fn require_admin(user: &AuthUser) -> Result<(), ApiError> {
    if user.role == ROLE_ADMIN {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Admin role required".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jwt_round_trip_carries_role() {
        let token = generate_jwt("test-secret", 7, ROLE_ADMIN).unwrap();
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(data.claims.sub, 7);
        assert_eq!(data.claims.role, ROLE_ADMIN);
    }

    #[test]
    fn jwt_rejects_wrong_secret() {
        let token = generate_jwt("test-secret", 7, ROLE_USER).unwrap();
        assert!(decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"other-secret"),
            &Validation::default(),
        )
        .is_err());
    }

    #[test]
    fn require_admin_check() {
        let admin = AuthUser {
            id: 1,
            role: ROLE_ADMIN.to_string(),
        };
        let user = AuthUser {
            id: 2,
            role: ROLE_USER.to_string(),
        };
        assert!(require_admin(&admin).is_ok());
        assert!(require_admin(&user).is_err());
    }
}
