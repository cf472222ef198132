use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::account::Role;

/// The bookable hour ranges. Requests referencing any other string are
/// rejected before they reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum TimeSlot {
    #[sqlx(rename = "06:00 AM - 07:00 AM")]
    #[serde(rename = "06:00 AM - 07:00 AM")]
    SixAm,
    #[sqlx(rename = "07:00 AM - 08:00 AM")]
    #[serde(rename = "07:00 AM - 08:00 AM")]
    SevenAm,
    #[sqlx(rename = "08:00 AM - 09:00 AM")]
    #[serde(rename = "08:00 AM - 09:00 AM")]
    EightAm,
    #[sqlx(rename = "04:00 PM - 05:00 PM")]
    #[serde(rename = "04:00 PM - 05:00 PM")]
    FourPm,
    #[sqlx(rename = "05:00 PM - 06:00 PM")]
    #[serde(rename = "05:00 PM - 06:00 PM")]
    FivePm,
    #[sqlx(rename = "06:00 PM - 07:00 PM")]
    #[serde(rename = "06:00 PM - 07:00 PM")]
    SixPm,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 6] = [
        TimeSlot::SixAm,
        TimeSlot::SevenAm,
        TimeSlot::EightAm,
        TimeSlot::FourPm,
        TimeSlot::FivePm,
        TimeSlot::SixPm,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeSlot::SixAm => "06:00 AM - 07:00 AM",
            TimeSlot::SevenAm => "07:00 AM - 08:00 AM",
            TimeSlot::EightAm => "08:00 AM - 09:00 AM",
            TimeSlot::FourPm => "04:00 PM - 05:00 PM",
            TimeSlot::FivePm => "05:00 PM - 06:00 PM",
            TimeSlot::SixPm => "06:00 PM - 07:00 PM",
        }
    }

    pub fn parse(s: &str) -> Option<TimeSlot> {
        TimeSlot::ALL.into_iter().find(|slot| slot.as_str() == s)
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Booking lifecycle. Confirmed and Rejected are terminal; the only way out
/// of them is deletion by the venue owner or an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Rejected => "Rejected",
        }
    }

    pub fn parse(s: &str) -> Option<BookingStatus> {
        match s {
            "Pending" => Some(BookingStatus::Pending),
            "Confirmed" => Some(BookingStatus::Confirmed),
            "Rejected" => Some(BookingStatus::Rejected),
            _ => None,
        }
    }

    /// Transition table. Re-deciding an already decided booking is refused,
    /// including Confirmed -> Confirmed.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Rejected)
        )
    }
}

/// Who may approve or reject a booking: the owner of the booked venue, or an
/// admin.
pub fn can_decide_booking(role: Role, owns_venue: bool) -> bool {
    match role {
        Role::Admin => true,
        Role::VenueOwner => owns_venue,
        Role::Player => false,
    }
}

/// Who may delete a booking. The requesting player may only withdraw a still
/// Pending request; the venue owner and admins may remove a booking in any
/// status.
pub fn can_delete_booking(
    role: Role,
    is_requester: bool,
    owns_venue: bool,
    status: BookingStatus,
) -> bool {
    match role {
        Role::Admin => true,
        Role::VenueOwner if owns_venue => true,
        _ => is_requester && status == BookingStatus::Pending,
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Booking {
    pub id: Uuid,
    #[serde(rename = "venueId")]
    pub venue_id: Uuid,
    #[serde(rename = "accountId")]
    pub account_id: Uuid,
    pub date: NaiveDate,
    #[serde(rename = "timeSlot")]
    pub time_slot: TimeSlot,
    pub phone: String,
    pub status: BookingStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    #[serde(rename = "venueId")]
    pub venue_id: Uuid,
    pub date: String,
    #[serde(rename = "timeSlot")]
    pub time_slot: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct BookingStatusRequest {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_bookings_can_be_decided() {
        use BookingStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Rejected));

        // Everything else is refused, including the idempotent-looking
        // Confirmed -> Confirmed.
        for from in [Confirmed, Rejected] {
            for to in [Pending, Confirmed, Rejected] {
                assert!(!from.can_transition_to(to), "{from:?} -> {to:?}");
            }
        }
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn requester_may_only_cancel_pending_requests() {
        use BookingStatus::*;
        assert!(can_delete_booking(Role::Player, true, false, Pending));
        assert!(!can_delete_booking(Role::Player, true, false, Confirmed));
        assert!(!can_delete_booking(Role::Player, true, false, Rejected));
        // A player cannot touch someone else's booking at all.
        assert!(!can_delete_booking(Role::Player, false, false, Pending));
    }

    #[test]
    fn owner_and_admin_may_delete_any_status() {
        use BookingStatus::*;
        for status in [Pending, Confirmed, Rejected] {
            assert!(can_delete_booking(Role::Admin, false, false, status));
            assert!(can_delete_booking(Role::VenueOwner, false, true, status));
        }
        // An owner of a different venue is not an owner here.
        assert!(!can_delete_booking(Role::VenueOwner, false, false, Confirmed));
    }

    #[test]
    fn decision_rights() {
        assert!(can_decide_booking(Role::Admin, false));
        assert!(can_decide_booking(Role::VenueOwner, true));
        assert!(!can_decide_booking(Role::VenueOwner, false));
        assert!(!can_decide_booking(Role::Player, true));
    }

    #[test]
    fn slot_set_is_closed() {
        for slot in TimeSlot::ALL {
            assert_eq!(TimeSlot::parse(slot.as_str()), Some(slot));
        }
        assert_eq!(TimeSlot::parse("09:00 AM - 10:00 AM"), None);
        assert_eq!(TimeSlot::parse("06:00 am - 07:00 am"), None);
        assert_eq!(TimeSlot::parse(""), None);
    }

    #[test]
    fn slot_serializes_as_its_display_string() {
        let json = serde_json::to_string(&TimeSlot::FourPm).unwrap();
        assert_eq!(json, "\"04:00 PM - 05:00 PM\"");
        let parsed: TimeSlot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, TimeSlot::FourPm);
    }
}
