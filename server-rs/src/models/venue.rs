use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Verification status of a listed court. Venues are created Pending and only
/// become publicly discoverable once an admin approves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum VenueStatus {
    Pending,
    Approved,
    Rejected,
}

impl VenueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VenueStatus::Pending => "Pending",
            VenueStatus::Approved => "Approved",
            VenueStatus::Rejected => "Rejected",
        }
    }

    pub fn parse(s: &str) -> Option<VenueStatus> {
        match s {
            "Pending" => Some(VenueStatus::Pending),
            "Approved" => Some(VenueStatus::Approved),
            "Rejected" => Some(VenueStatus::Rejected),
            _ => None,
        }
    }

    /// Admin review transition table: only a Pending venue can be decided.
    /// An Approved venue re-enters review via an owner edit, not an admin
    /// transition.
    pub fn can_transition_to(self, next: VenueStatus) -> bool {
        matches!(
            (self, next),
            (VenueStatus::Pending, VenueStatus::Approved)
                | (VenueStatus::Pending, VenueStatus::Rejected)
        )
    }

    /// Status after an owner edit: any change to an Approved listing must be
    /// re-reviewed; Pending/Rejected listings keep their status.
    pub fn after_owner_edit(self) -> VenueStatus {
        match self {
            VenueStatus::Approved => VenueStatus::Pending,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Venue {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub opening_time: String,
    pub closing_time: String,
    pub contact: String,
    pub price_per_hour: i32,
    pub status: VenueStatus,
    pub image_url: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Venue {
    /// Wire shape; missing images fall back to the configured placeholder.
    pub fn public(&self, placeholder_image_url: &str) -> VenuePublic {
        VenuePublic {
            id: self.id,
            name: self.name.clone(),
            location: self.location.clone(),
            opening_time: self.opening_time.clone(),
            closing_time: self.closing_time.clone(),
            contact: self.contact.clone(),
            price_per_hour: self.price_per_hour,
            status: self.status,
            image_url: self
                .image_url
                .clone()
                .unwrap_or_else(|| placeholder_image_url.to_string()),
            owner_id: self.owner_id,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VenuePublic {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    #[serde(rename = "openingTime")]
    pub opening_time: String,
    #[serde(rename = "closingTime")]
    pub closing_time: String,
    pub contact: String,
    #[serde(rename = "pricePerHour")]
    pub price_per_hour: i32,
    pub status: VenueStatus,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(rename = "ownerId")]
    pub owner_id: Uuid,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateVenueRequest {
    pub name: String,
    pub location: String,
    #[serde(rename = "openingTime")]
    pub opening_time: String,
    #[serde(rename = "closingTime")]
    pub closing_time: String,
    pub contact: String,
    #[serde(rename = "pricePerHour")]
    pub price_per_hour: i32,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVenueRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "openingTime")]
    pub opening_time: Option<String>,
    #[serde(rename = "closingTime")]
    pub closing_time: Option<String>,
    pub contact: Option<String>,
    #[serde(rename = "pricePerHour")]
    pub price_per_hour: Option<i32>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
}

impl UpdateVenueRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.location.is_none()
            && self.opening_time.is_none()
            && self.closing_time.is_none()
            && self.contact.is_none()
            && self.price_per_hour.is_none()
            && self.image_url.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub struct VenueStatusRequest {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_venues_are_decidable() {
        use VenueStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));

        for from in [Approved, Rejected] {
            for to in [Pending, Approved, Rejected] {
                assert!(!from.can_transition_to(to), "{from:?} -> {to:?}");
            }
        }
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn owner_edits_reset_only_approved_listings() {
        assert_eq!(VenueStatus::Approved.after_owner_edit(), VenueStatus::Pending);
        assert_eq!(VenueStatus::Pending.after_owner_edit(), VenueStatus::Pending);
        assert_eq!(VenueStatus::Rejected.after_owner_edit(), VenueStatus::Rejected);
    }

    #[test]
    fn missing_image_falls_back_to_placeholder() {
        let venue = Venue {
            id: Uuid::new_v4(),
            name: "Goal Arena".into(),
            location: "Lalitpur".into(),
            opening_time: "06:00 AM".into(),
            closing_time: "09:00 PM".into(),
            contact: "9800000000".into(),
            price_per_hour: 1500,
            status: VenueStatus::Approved,
            image_url: None,
            owner_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let public = venue.public("https://img.example/placeholder.png");
        assert_eq!(public.image_url, "https://img.example/placeholder.png");
    }
}
