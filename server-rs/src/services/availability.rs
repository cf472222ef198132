use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::booking::{BookingStatus, TimeSlot};

/// Conflict check for a requested reservation: a slot is taken when any
/// booking for the same (venue, date, time slot) already holds Confirmed.
/// Pending siblings do not block a new request.
///
/// This runs at creation time only; approvals rely on the partial unique
/// index over Confirmed rows instead of re-running the check.
pub async fn confirmed_slot_exists(
    db: &sqlx::PgPool,
    venue_id: Uuid,
    date: NaiveDate,
    slot: TimeSlot,
) -> AppResult<bool> {
    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(
            SELECT 1 FROM bookings
            WHERE venue_id = $1 AND date = $2 AND time_slot = $3 AND status = $4
        )",
    )
    .bind(venue_id)
    .bind(date)
    .bind(slot)
    .bind(BookingStatus::Confirmed)
    .fetch_one(db)
    .await?;

    Ok(taken)
}
