use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account roles. `Admin` is never assignable through registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Role {
    Player,
    VenueOwner,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Player => "Player",
            Role::VenueOwner => "VenueOwner",
            Role::Admin => "Admin",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "Player" => Some(Role::Player),
            "VenueOwner" => Some(Role::VenueOwner),
            "Admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_hash: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AccountPublic {
    #[serde(rename = "accountId")]
    pub account_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountPublic {
    fn from(a: &Account) -> Self {
        Self {
            account_id: a.id,
            name: a.name.clone(),
            email: a.email.clone(),
            role: a.role,
            phone: a.phone.clone(),
            created_at: a.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_round_trips() {
        for role in [Role::Player, Role::VenueOwner, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("FutsalAdmin"), None);
        assert_eq!(Role::parse("player"), None);
    }

    #[test]
    fn account_serialization_never_leaks_credentials() {
        let account = Account {
            id: Uuid::new_v4(),
            name: "Asha".into(),
            email: "asha@example.com".into(),
            password_hash: "$2b$12$secret".into(),
            role: Role::Player,
            phone: Some("9841000000".into()),
            reset_token_hash: Some("deadbeef".into()),
            reset_token_expires_at: Some(Utc::now()),
            created_at: Utc::now(),
            last_login_at: None,
        };

        let value = serde_json::to_value(&account).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("password_hash"));
        assert!(!obj.contains_key("reset_token_hash"));
        assert!(!obj.contains_key("reset_token_expires_at"));
        assert_eq!(obj["email"], "asha@example.com");

        let public = serde_json::to_value(AccountPublic::from(&account)).unwrap();
        let text = public.to_string();
        assert!(!text.contains("secret"));
        assert!(!text.contains("deadbeef"));
    }
}
