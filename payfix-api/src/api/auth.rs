//! Operator accounts and bearer token authentication
//!
//! Signup stores a salted password hash; login issues a signed token that the
//! middleware checks on every data route.

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
    Json,
};
use chrono::Utc;
use payfix_common::api::{LoginRequest, LoginResponse, MessageResponse, SignupRequest};
use payfix_common::auth::{issue_token, verify_password, verify_token};
use payfix_common::db;
use tracing::{debug, info, warn};

use crate::{ApiError, ApiResult, AppState};

/// POST /api/signup
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(req) = payload?;
    let (Some(name), Some(username), Some(password)) = (
        non_empty(req.name),
        non_empty(req.username),
        non_empty(req.password),
    ) else {
        return Err(ApiError::BadRequest("Missing fields".to_string()));
    };

    db::create_user(&state.db, &name, &username, &password).await?;
    info!("Registered operator {}", username);

    Ok(Json(MessageResponse {
        ok: true,
        message: "User registered successfully".to_string(),
    }))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload?;
    let (Some(username), Some(password)) = (non_empty(req.username), non_empty(req.password))
    else {
        return Err(ApiError::BadRequest(
            "Username and password required".to_string(),
        ));
    };

    let user = db::find_user_by_username(&state.db, &username)
        .await?
        .filter(|u| verify_password(&password, &u.password_salt, &u.password_hash));

    let Some(user) = user else {
        warn!("Failed login for {}", username);
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    };

    let token = issue_token(
        &state.token_secret,
        &user.id,
        &user.username,
        state.token_ttl_seconds,
        Utc::now(),
    );
    info!("Operator {} logged in", user.username);

    Ok(Json(LoginResponse {
        ok: true,
        token,
        username: user.username,
    }))
}

/// Bearer token middleware
///
/// A valid token's claims are attached to the request as an extension. When
/// `require_auth` is off, requests without a usable token pass through
/// anonymously.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let verified = bearer_token(request.headers())
        .map(|token| verify_token(&state.token_secret, token, Utc::now()));

    match verified {
        Some(Ok(claims)) => {
            request.extensions_mut().insert(claims);
        }
        Some(Err(e)) if state.require_auth => {
            warn!("Rejected bearer token: {}", e);
            return Err(ApiError::Unauthorized(e.to_string()));
        }
        Some(Err(e)) => debug!("Ignoring invalid bearer token: {}", e),
        None if state.require_auth => {
            return Err(ApiError::Unauthorized("Missing bearer token".to_string()));
        }
        None => {}
    }

    Ok(next.run(request).await)
}

/// Token from an `Authorization: Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
