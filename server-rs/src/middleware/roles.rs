use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthAccount;
use crate::models::account::Role;
use crate::AppState;

/// The stored role for an account. Token claims are never trusted for
/// authorization decisions; this lookup is the source of truth.
pub async fn account_role(db: &sqlx::PgPool, account_id: Uuid) -> AppResult<Role> {
    let role: Option<Role> =
        sqlx::query_scalar("SELECT role FROM accounts WHERE id = $1")
            .bind(account_id)
            .fetch_optional(db)
            .await?;

    role.ok_or_else(|| AppError::Unauthorized("Unknown account".into()))
}

async fn require_role(
    state: &AppState,
    req: &mut Request,
    wanted: Role,
) -> Result<(), AppError> {
    let account = req
        .extensions()
        .get::<AuthAccount>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))?;

    let role = account_role(&state.db, account.id).await?;
    if role != wanted {
        return Err(AppError::Forbidden(format!(
            "Requires {} role",
            wanted.as_str()
        )));
    }

    req.extensions_mut().insert(AuthAccount {
        id: account.id,
        role: Some(role.as_str().to_string()),
    });
    Ok(())
}

/// Middleware: caller's stored role must be Admin.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_role(&state, &mut req, Role::Admin).await?;
    Ok(next.run(req).await)
}

/// Middleware: caller's stored role must be VenueOwner.
pub async fn require_venue_owner(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_role(&state, &mut req, Role::VenueOwner).await?;
    Ok(next.run(req).await)
}

/// Middleware: caller's stored role must be Player. Booking requests are
/// placed by players; owners and admins only act on them.
pub async fn require_player(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_role(&state, &mut req, Role::Player).await?;
    Ok(next.run(req).await)
}
