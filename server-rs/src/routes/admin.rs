use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::booking::{BookingStatus, TimeSlot};
use crate::models::venue::{Venue, VenueStatus, VenueStatusRequest};
use crate::AppState;

/// Review queue: every venue in every status, with owner contact details.
pub async fn list_venues(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let rows: Vec<(
        Uuid,
        String,
        String,
        String,
        i32,
        VenueStatus,
        Option<String>,
        DateTime<Utc>,
        String,
        String,
    )> = sqlx::query_as(
        r#"SELECT v.id, v.name, v.location, v.contact, v.price_per_hour, v.status,
            v.image_url, v.created_at, a.name, a.email
        FROM venues v
        JOIN accounts a ON a.id = v.owner_id
        ORDER BY v.created_at DESC"#,
    )
    .fetch_all(&state.db)
    .await?;

    let placeholder = &state.config.media.placeholder_image_url;
    let venues: Vec<Value> = rows
        .iter()
        .map(
            |(id, name, location, contact, price, status, image, created, oname, oemail)| {
                json!({
                    "id": id,
                    "name": name,
                    "location": location,
                    "contact": contact,
                    "pricePerHour": price,
                    "status": status,
                    "imageUrl": image.clone().unwrap_or_else(|| placeholder.clone()),
                    "createdAt": created,
                    "owner": { "name": oname, "email": oemail },
                })
            },
        )
        .collect();

    Ok(Json(json!({ "venues": venues })))
}

/// Verification decision. Only a Pending venue can be approved or rejected;
/// a decided venue re-enters the queue when its owner edits it.
pub async fn set_venue_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<VenueStatusRequest>,
) -> AppResult<Json<Value>> {
    let next = VenueStatus::parse(&body.status)
        .filter(|s| *s != VenueStatus::Pending)
        .ok_or_else(|| {
            AppError::BadRequest("Status must be Approved or Rejected".into())
        })?;

    let venue: Venue = sqlx::query_as("SELECT * FROM venues WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Venue not found".into()))?;

    if !venue.status.can_transition_to(next) {
        return Err(AppError::Conflict("Venue already reviewed".into()));
    }

    let updated: Venue = sqlx::query_as(
        "UPDATE venues SET status = $1, updated_at = NOW() WHERE id = $2 AND status = $3 RETURNING *",
    )
    .bind(next)
    .bind(venue.id)
    .bind(VenueStatus::Pending)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::Conflict("Venue already reviewed".into()))?;

    tracing::info!(venue = %updated.id, status = next.as_str(), "venue reviewed");

    Ok(Json(json!({
        "message": format!("Venue {}", next.as_str()),
        "venue": updated.public(&state.config.media.placeholder_image_url),
    })))
}

/// Global booking ledger: newest requests first, joined with venue and
/// requester summaries so the admin sees who booked which court.
pub async fn list_bookings(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let rows: Vec<(
        Uuid,
        NaiveDate,
        TimeSlot,
        BookingStatus,
        String,
        DateTime<Utc>,
        String,
        String,
        String,
        Option<String>,
        String,
    )> = sqlx::query_as(
        r#"SELECT b.id, b.date, b.time_slot, b.status, b.phone, b.created_at,
            v.name, v.location, a.name, a.phone, a.email
        FROM bookings b
        JOIN venues v ON v.id = b.venue_id
        JOIN accounts a ON a.id = b.account_id
        ORDER BY b.created_at DESC"#,
    )
    .fetch_all(&state.db)
    .await?;

    let bookings: Vec<Value> = rows
        .iter()
        .map(
            |(id, date, slot, status, phone, created, vname, vloc, aname, aphone, aemail)| {
                json!({
                    "id": id,
                    "date": date,
                    "timeSlot": slot,
                    "status": status,
                    "phone": phone,
                    "createdAt": created,
                    "venue": { "name": vname, "location": vloc },
                    "requester": { "name": aname, "phone": aphone, "email": aemail },
                })
            },
        )
        .collect();

    Ok(Json(json!({ "bookings": bookings })))
}
