use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthAccount;
use crate::middleware::roles::account_role;
use crate::models::account::Role;
use crate::models::venue::*;
use crate::AppState;

// Public endpoints

/// Discovery listing: approved venues only. Pending and rejected listings
/// stay invisible until the admin review passes.
pub async fn list_venues(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let venues: Vec<Venue> = sqlx::query_as(
        "SELECT * FROM venues WHERE status = $1 ORDER BY created_at DESC",
    )
    .bind(VenueStatus::Approved)
    .fetch_all(&state.db)
    .await?;

    let placeholder = &state.config.media.placeholder_image_url;
    let venues: Vec<VenuePublic> = venues.iter().map(|v| v.public(placeholder)).collect();

    Ok(Json(json!({ "venues": venues })))
}

pub async fn get_venue(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let venue: Venue = sqlx::query_as("SELECT * FROM venues WHERE id = $1 AND status = $2")
        .bind(id)
        .bind(VenueStatus::Approved)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Venue not found".into()))?;

    Ok(Json(json!({
        "venue": venue.public(&state.config.media.placeholder_image_url)
    })))
}

// Owner endpoints

pub async fn create_venue(
    State(state): State<AppState>,
    account: axum::Extension<AuthAccount>,
    Json(body): Json<CreateVenueRequest>,
) -> AppResult<Json<Value>> {
    if body.name.trim().is_empty() || body.location.trim().is_empty() {
        return Err(AppError::BadRequest("Name and location are required".into()));
    }
    if body.contact.trim().is_empty() {
        return Err(AppError::BadRequest("Contact number is required".into()));
    }
    if body.price_per_hour <= 0 {
        return Err(AppError::BadRequest(
            "Hourly price must be greater than zero".into(),
        ));
    }

    let already_owns: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM venues WHERE owner_id = $1)")
            .bind(account.id)
            .fetch_one(&state.db)
            .await?;
    if already_owns {
        return Err(AppError::Conflict(
            "Owner already has a registered venue".into(),
        ));
    }

    // The unique index on owner_id closes the check-then-insert race.
    let venue: Venue = sqlx::query_as(
        r#"INSERT INTO venues
            (id, name, location, opening_time, closing_time, contact, price_per_hour, status, image_url, owner_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(body.name.trim())
    .bind(body.location.trim())
    .bind(&body.opening_time)
    .bind(&body.closing_time)
    .bind(body.contact.trim())
    .bind(body.price_per_hour)
    .bind(VenueStatus::Pending)
    .bind(&body.image_url)
    .bind(account.id)
    .fetch_one(&state.db)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "Owner already has a registered venue"))?;

    tracing::info!(venue = %venue.id, owner = %account.id, "venue submitted for review");

    Ok(Json(json!({
        "venue": venue.public(&state.config.media.placeholder_image_url)
    })))
}

pub async fn my_venue(
    State(state): State<AppState>,
    account: axum::Extension<AuthAccount>,
) -> AppResult<Json<Value>> {
    let venue: Venue = sqlx::query_as("SELECT * FROM venues WHERE owner_id = $1")
        .bind(account.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No venue registered yet".into()))?;

    Ok(Json(json!({
        "venue": venue.public(&state.config.media.placeholder_image_url)
    })))
}

/// Owner edit. Any change to an Approved listing sends it back through
/// review (status resets to Pending); Pending/Rejected listings keep their
/// status until the admin acts.
pub async fn update_venue(
    State(state): State<AppState>,
    account: axum::Extension<AuthAccount>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateVenueRequest>,
) -> AppResult<Json<Value>> {
    let venue: Venue = sqlx::query_as("SELECT * FROM venues WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Venue not found".into()))?;

    if venue.owner_id != account.id {
        return Err(AppError::Forbidden("Not your venue".into()));
    }

    if body.is_empty() {
        return Ok(Json(json!({
            "venue": venue.public(&state.config.media.placeholder_image_url)
        })));
    }

    if matches!(body.price_per_hour, Some(p) if p <= 0) {
        return Err(AppError::BadRequest(
            "Hourly price must be greater than zero".into(),
        ));
    }

    let next_status = venue.status.after_owner_edit();

    let updated: Venue = sqlx::query_as(
        r#"UPDATE venues SET
            name = COALESCE($2, name),
            location = COALESCE($3, location),
            opening_time = COALESCE($4, opening_time),
            closing_time = COALESCE($5, closing_time),
            contact = COALESCE($6, contact),
            price_per_hour = COALESCE($7, price_per_hour),
            image_url = COALESCE($8, image_url),
            status = $9,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *"#,
    )
    .bind(venue.id)
    .bind(&body.name)
    .bind(&body.location)
    .bind(&body.opening_time)
    .bind(&body.closing_time)
    .bind(&body.contact)
    .bind(body.price_per_hour)
    .bind(&body.image_url)
    .bind(next_status)
    .fetch_one(&state.db)
    .await?;

    if venue.status == VenueStatus::Approved {
        tracing::info!(venue = %venue.id, "approved venue edited, back to review");
    }

    Ok(Json(json!({
        "venue": updated.public(&state.config.media.placeholder_image_url)
    })))
}

pub async fn delete_venue(
    State(state): State<AppState>,
    account: axum::Extension<AuthAccount>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let venue: Venue = sqlx::query_as("SELECT * FROM venues WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Venue not found".into()))?;

    if venue.owner_id != account.id {
        let role = account_role(&state.db, account.id).await?;
        if role != Role::Admin {
            return Err(AppError::Forbidden("Not your venue".into()));
        }
    }

    // Bookings cascade with the venue.
    sqlx::query("DELETE FROM venues WHERE id = $1")
        .bind(venue.id)
        .execute(&state.db)
        .await?;

    tracing::info!(venue = %venue.id, "venue deleted");

    Ok(Json(json!({ "success": true })))
}
