use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // account id
    pub role: Option<String>,
    #[serde(rename = "type")]
    pub token_type: Option<String>, // "access" or "refresh"
    pub exp: i64,
    pub iat: i64,
}

/// Identity attached to the request by `authenticate`. The role here comes
/// from the token and is informational only; role-gated paths re-verify it
/// against the accounts table (see `middleware::roles`).
#[derive(Debug, Clone)]
pub struct AuthAccount {
    pub id: Uuid,
    pub role: Option<String>,
}

pub fn generate_tokens(
    account_id: Uuid,
    role: Option<&str>,
    secret: &str,
    access_expiry_secs: i64,
    refresh_expiry_secs: i64,
) -> AppResult<(String, String)> {
    let now = Utc::now().timestamp();

    let access_claims = Claims {
        sub: account_id.to_string(),
        role: role.map(String::from),
        token_type: Some("access".to_string()),
        exp: now + access_expiry_secs,
        iat: now,
    };
    let access_token = encode(
        &Header::default(),
        &access_claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    let refresh_claims = Claims {
        sub: account_id.to_string(),
        role: role.map(String::from),
        token_type: Some("refresh".to_string()),
        exp: now + refresh_expiry_secs,
        iat: now,
    };
    let refresh_token = encode(
        &Header::default(),
        &refresh_claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok((access_token, refresh_token))
}

pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

fn extract_bearer(req: &Request) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(String::from)
}

/// Middleware: requires a valid access token. Sets AuthAccount in extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer(&req)
        .ok_or_else(|| AppError::Unauthorized("No token provided".into()))?;

    let claims = verify_token(&token, &state.config.jwt.secret)?;

    if claims.token_type.as_deref() == Some("refresh") {
        return Err(AppError::Unauthorized("Access token required".into()));
    }

    let account_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid token subject".into()))?;

    req.extensions_mut().insert(AuthAccount {
        id: account_id,
        role: claims.role,
    });

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn access_token_round_trips() {
        let id = Uuid::new_v4();
        let (access, refresh) =
            generate_tokens(id, Some("Player"), SECRET, 3600, 86400).unwrap();

        let claims = verify_token(&access, SECRET).unwrap();
        assert_eq!(claims.sub, id.to_string());
        assert_eq!(claims.role.as_deref(), Some("Player"));
        assert_eq!(claims.token_type.as_deref(), Some("access"));

        let refresh_claims = verify_token(&refresh, SECRET).unwrap();
        assert_eq!(refresh_claims.token_type.as_deref(), Some("refresh"));
    }

    #[test]
    fn tampered_or_foreign_tokens_fail() {
        let (access, _) = generate_tokens(Uuid::new_v4(), None, SECRET, 3600, 86400).unwrap();
        assert!(verify_token(&access, "some-other-secret").is_err());

        let mut forged = access.clone();
        forged.push('x');
        assert!(verify_token(&forged, SECRET).is_err());
    }

    #[test]
    fn expired_tokens_fail() {
        let (access, _) =
            generate_tokens(Uuid::new_v4(), None, SECRET, -120, 86400).unwrap();
        assert!(verify_token(&access, SECRET).is_err());
    }
}
