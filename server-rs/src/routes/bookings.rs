use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthAccount;
use crate::middleware::roles::account_role;
use crate::models::booking::*;
use crate::models::venue::{Venue, VenueStatus};
use crate::services::availability;
use crate::AppState;

pub async fn create_booking(
    State(state): State<AppState>,
    account: axum::Extension<AuthAccount>,
    Json(body): Json<CreateBookingRequest>,
) -> AppResult<Json<Value>> {
    let date = NaiveDate::parse_from_str(&body.date, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest("Date must be formatted YYYY-MM-DD".into()))?;
    let slot = TimeSlot::parse(&body.time_slot).ok_or_else(|| {
        AppError::BadRequest("Time slot must be one of the published hourly ranges".into())
    })?;
    if body.phone.trim().is_empty() {
        return Err(AppError::BadRequest("Contact phone is required".into()));
    }

    // Unapproved venues are not publicly visible, so their existence is not
    // acknowledged here either.
    let venue: Venue = sqlx::query_as("SELECT * FROM venues WHERE id = $1 AND status = $2")
        .bind(body.venue_id)
        .bind(VenueStatus::Approved)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Venue not found".into()))?;

    if availability::confirmed_slot_exists(&state.db, venue.id, date, slot).await? {
        return Err(AppError::Conflict(
            "Slot already confirmed for that date and time".into(),
        ));
    }

    let booking: Booking = sqlx::query_as(
        r#"INSERT INTO bookings (id, venue_id, account_id, date, time_slot, phone, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(venue.id)
    .bind(account.id)
    .bind(date)
    .bind(slot)
    .bind(body.phone.trim())
    .bind(BookingStatus::Pending)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(
        booking = %booking.id,
        venue = %venue.id,
        slot = %slot,
        "booking requested"
    );

    Ok(Json(json!({ "booking": booking })))
}

/// Player view: the caller's own requests, newest match day first, with
/// enough venue detail to act without a second lookup.
pub async fn my_bookings(
    State(state): State<AppState>,
    account: axum::Extension<AuthAccount>,
) -> AppResult<Json<Value>> {
    let rows: Vec<(
        Uuid,
        NaiveDate,
        TimeSlot,
        BookingStatus,
        String,
        DateTime<Utc>,
        Uuid,
        String,
        String,
        String,
        i32,
    )> = sqlx::query_as(
        r#"SELECT b.id, b.date, b.time_slot, b.status, b.phone, b.created_at,
            v.id, v.name, v.location, v.contact, v.price_per_hour
        FROM bookings b
        JOIN venues v ON v.id = b.venue_id
        WHERE b.account_id = $1
        ORDER BY b.date DESC, b.created_at DESC"#,
    )
    .bind(account.id)
    .fetch_all(&state.db)
    .await?;

    let bookings: Vec<Value> = rows
        .iter()
        .map(
            |(id, date, slot, status, phone, created, vid, vname, vloc, vcontact, price)| {
                json!({
                    "id": id,
                    "date": date,
                    "timeSlot": slot,
                    "status": status,
                    "phone": phone,
                    "createdAt": created,
                    "venue": {
                        "id": vid,
                        "name": vname,
                        "location": vloc,
                        "contact": vcontact,
                        "pricePerHour": price,
                    },
                })
            },
        )
        .collect();

    Ok(Json(json!({ "bookings": bookings })))
}

/// Owner view: every request against the caller's venue, with requester
/// name and phone so the owner can call back.
pub async fn venue_bookings(
    State(state): State<AppState>,
    account: axum::Extension<AuthAccount>,
) -> AppResult<Json<Value>> {
    let rows: Vec<(
        Uuid,
        NaiveDate,
        TimeSlot,
        BookingStatus,
        String,
        DateTime<Utc>,
        Uuid,
        String,
        Option<String>,
    )> = sqlx::query_as(
        r#"SELECT b.id, b.date, b.time_slot, b.status, b.phone, b.created_at,
            a.id, a.name, a.phone
        FROM bookings b
        JOIN venues v ON v.id = b.venue_id
        JOIN accounts a ON a.id = b.account_id
        WHERE v.owner_id = $1
        ORDER BY b.date DESC, b.created_at DESC"#,
    )
    .bind(account.id)
    .fetch_all(&state.db)
    .await?;

    let bookings: Vec<Value> = rows
        .iter()
        .map(
            |(id, date, slot, status, phone, created, aid, aname, aphone)| {
                json!({
                    "id": id,
                    "date": date,
                    "timeSlot": slot,
                    "status": status,
                    "phone": phone,
                    "createdAt": created,
                    "requester": {
                        "id": aid,
                        "name": aname,
                        "phone": aphone,
                    },
                })
            },
        )
        .collect();

    Ok(Json(json!({ "bookings": bookings })))
}

/// Approve or reject a pending request. Allowed to the owner of the booked
/// venue and to admins. Siblings for the same slot stay Pending; operators
/// reject them individually.
pub async fn set_booking_status(
    State(state): State<AppState>,
    account: axum::Extension<AuthAccount>,
    Path(id): Path<Uuid>,
    Json(body): Json<BookingStatusRequest>,
) -> AppResult<Json<Value>> {
    let next = BookingStatus::parse(&body.status)
        .filter(|s| *s != BookingStatus::Pending)
        .ok_or_else(|| {
            AppError::BadRequest("Status must be Confirmed or Rejected".into())
        })?;

    let booking: Booking = sqlx::query_as("SELECT * FROM bookings WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".into()))?;

    let role = account_role(&state.db, account.id).await?;
    let owns_venue: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM venues WHERE id = $1 AND owner_id = $2)",
    )
    .bind(booking.venue_id)
    .bind(account.id)
    .fetch_one(&state.db)
    .await?;

    if !can_decide_booking(role, owns_venue) {
        return Err(AppError::Forbidden(
            "Only the venue owner or an admin can decide a booking".into(),
        ));
    }

    if !booking.status.can_transition_to(next) {
        return Err(AppError::Conflict("Booking already decided".into()));
    }

    // The status guard covers a concurrent decision; the partial unique
    // index covers a concurrent confirmation of a sibling for the same slot.
    let updated: Option<Booking> = sqlx::query_as(
        "UPDATE bookings SET status = $1 WHERE id = $2 AND status = $3 RETURNING *",
    )
    .bind(next)
    .bind(booking.id)
    .bind(BookingStatus::Pending)
    .fetch_optional(&state.db)
    .await
    .map_err(|e| {
        AppError::conflict_on_unique(e, "Slot already confirmed for that date and time")
    })?;

    let updated =
        updated.ok_or_else(|| AppError::Conflict("Booking already decided".into()))?;

    tracing::info!(
        booking = %updated.id,
        status = next.as_str(),
        decided_by = %account.id,
        "booking decided"
    );

    Ok(Json(json!({
        "message": format!("Booking {}", next.as_str()),
        "booking": updated,
    })))
}

pub async fn delete_booking(
    State(state): State<AppState>,
    account: axum::Extension<AuthAccount>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let booking: Booking = sqlx::query_as("SELECT * FROM bookings WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".into()))?;

    let role = account_role(&state.db, account.id).await?;
    let owns_venue: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM venues WHERE id = $1 AND owner_id = $2)",
    )
    .bind(booking.venue_id)
    .bind(account.id)
    .fetch_one(&state.db)
    .await?;

    let is_requester = booking.account_id == account.id;
    if !can_delete_booking(role, is_requester, owns_venue, booking.status) {
        if is_requester {
            return Err(AppError::Forbidden(
                "Only pending requests can be cancelled by the requester".into(),
            ));
        }
        return Err(AppError::Forbidden(
            "Not allowed to delete this booking".into(),
        ));
    }

    sqlx::query("DELETE FROM bookings WHERE id = $1")
        .bind(booking.id)
        .execute(&state.db)
        .await?;

    tracing::info!(booking = %booking.id, deleted_by = %account.id, "booking removed");

    Ok(Json(json!({ "message": "Booking cancelled" })))
}
