use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{generate_tokens, verify_token, AuthAccount};
use crate::models::account::*;
use crate::services::reset_tokens;
use crate::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<Json<Value>> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".into()));
    }
    if !body.email.contains('@') || body.password.len() < 6 {
        return Err(AppError::BadRequest(
            "Valid email required and password must be at least 6 characters".into(),
        ));
    }

    let role = match body.role.as_deref() {
        None => Role::Player,
        Some(s) => match Role::parse(s) {
            Some(Role::Admin) => {
                return Err(AppError::BadRequest(
                    "Admin accounts cannot be self-registered".into(),
                ))
            }
            Some(role) => role,
            None => {
                return Err(AppError::BadRequest(
                    "Role must be Player or VenueOwner".into(),
                ))
            }
        },
    };

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)")
            .bind(&body.email)
            .fetch_one(&state.db)
            .await?;
    if exists {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let password_hash =
        bcrypt::hash(&body.password, 12).map_err(|e| AppError::Internal(e.to_string()))?;

    let account: Account = sqlx::query_as(
        r#"INSERT INTO accounts (id, name, email, password_hash, role, phone)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(body.name.trim())
    .bind(&body.email)
    .bind(&password_hash)
    .bind(role)
    .bind(&body.phone)
    .fetch_one(&state.db)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "Email already registered"))?;

    let (token, refresh_token) = generate_tokens(
        account.id,
        Some(account.role.as_str()),
        &state.config.jwt.secret,
        state.config.jwt.access_expiry_secs,
        state.config.jwt.refresh_expiry_secs,
    )?;

    tracing::info!(account = %account.id, role = account.role.as_str(), "account registered");

    Ok(Json(json!({
        "token": token,
        "refreshToken": refresh_token,
        "account": AccountPublic::from(&account),
    })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<Value>> {
    let account: Account = sqlx::query_as("SELECT * FROM accounts WHERE email = $1")
        .bind(&body.email)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".into()))?;

    let valid = bcrypt::verify(&body.password, &account.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if !valid {
        return Err(AppError::Unauthorized("Invalid email or password".into()));
    }

    sqlx::query("UPDATE accounts SET last_login_at = NOW() WHERE id = $1")
        .bind(account.id)
        .execute(&state.db)
        .await?;

    let (token, refresh_token) = generate_tokens(
        account.id,
        Some(account.role.as_str()),
        &state.config.jwt.secret,
        state.config.jwt.access_expiry_secs,
        state.config.jwt.refresh_expiry_secs,
    )?;

    Ok(Json(json!({
        "token": token,
        "refreshToken": refresh_token,
        "account": AccountPublic::from(&account),
    })))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> AppResult<Json<Value>> {
    let token = body["refreshToken"]
        .as_str()
        .ok_or_else(|| AppError::BadRequest("refreshToken required".into()))?;

    let claims = verify_token(token, &state.config.jwt.secret)?;
    if claims.token_type.as_deref() != Some("refresh") {
        return Err(AppError::Unauthorized("Refresh token required".into()));
    }

    let account_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid token".into()))?;

    let (new_token, new_refresh) = generate_tokens(
        account_id,
        claims.role.as_deref(),
        &state.config.jwt.secret,
        state.config.jwt.access_expiry_secs,
        state.config.jwt.refresh_expiry_secs,
    )?;

    Ok(Json(json!({
        "token": new_token,
        "refreshToken": new_refresh,
    })))
}

/// Issues a reset token when the email is known. The response is the same
/// either way, so the endpoint cannot be used to probe registered emails;
/// delivery of the raw token is the mailer's job, only the digest is stored.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> AppResult<Json<Value>> {
    let account: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM accounts WHERE email = $1")
            .bind(&body.email)
            .fetch_optional(&state.db)
            .await?;

    if let Some((account_id,)) = account {
        let token = reset_tokens::generate();
        let expires_at = Utc::now() + Duration::seconds(state.config.reset.token_ttl_secs);

        sqlx::query(
            "UPDATE accounts SET reset_token_hash = $1, reset_token_expires_at = $2 WHERE id = $3",
        )
        .bind(reset_tokens::digest(&token))
        .bind(expires_at)
        .bind(account_id)
        .execute(&state.db)
        .await?;

        tracing::info!(account = %account_id, "password reset token issued");
    }

    Ok(Json(json!({
        "message": "If that email is registered, a reset link has been sent"
    })))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(body): Json<ResetPasswordRequest>,
) -> AppResult<Json<Value>> {
    if body.password.len() < 6 {
        return Err(AppError::BadRequest(
            "Password must be at least 6 characters".into(),
        ));
    }

    let account: Option<(Uuid,)> = sqlx::query_as(
        "SELECT id FROM accounts WHERE reset_token_hash = $1 AND reset_token_expires_at > NOW()",
    )
    .bind(reset_tokens::digest(&token))
    .fetch_optional(&state.db)
    .await?;

    let (account_id,) = account
        .ok_or_else(|| AppError::BadRequest("Reset token is invalid or expired".into()))?;

    let password_hash =
        bcrypt::hash(&body.password, 12).map_err(|e| AppError::Internal(e.to_string()))?;

    sqlx::query(
        r#"UPDATE accounts
        SET password_hash = $1, reset_token_hash = NULL, reset_token_expires_at = NULL
        WHERE id = $2"#,
    )
    .bind(&password_hash)
    .bind(account_id)
    .execute(&state.db)
    .await?;

    tracing::info!(account = %account_id, "password reset completed");

    Ok(Json(json!({ "message": "Password updated" })))
}

pub async fn me(
    State(state): State<AppState>,
    account: axum::Extension<AuthAccount>,
) -> AppResult<Json<Value>> {
    let row: Account = sqlx::query_as("SELECT * FROM accounts WHERE id = $1")
        .bind(account.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".into()))?;

    Ok(Json(json!({ "account": AccountPublic::from(&row) })))
}

pub async fn update_profile(
    State(state): State<AppState>,
    account: axum::Extension<AuthAccount>,
    Json(body): Json<ProfileUpdateRequest>,
) -> AppResult<Json<Value>> {
    if body.name.is_none() && body.phone.is_none() {
        return Ok(Json(json!({ "message": "No fields to update" })));
    }
    if matches!(&body.name, Some(name) if name.trim().is_empty()) {
        return Err(AppError::BadRequest("Name cannot be empty".into()));
    }

    let row: Account = sqlx::query_as(
        r#"UPDATE accounts
        SET name = COALESCE($2, name), phone = COALESCE($3, phone)
        WHERE id = $1
        RETURNING *"#,
    )
    .bind(account.id)
    .bind(&body.name)
    .bind(&body.phone)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Account not found".into()))?;

    Ok(Json(json!({
        "message": "Profile updated",
        "account": AccountPublic::from(&row),
    })))
}
