use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap},
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;
use tracing::{instrument, warn};

use crate::{
    auth::{
        cookies::{clear_cookie, get_cookie, token_cookie, ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME},
        dto::{SigninRequest, SignupRequest},
        extractors::AuthUser,
        models::UserSummary,
    },
    error::AuthError,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/signin", post(signin))
        .route("/auth/signout", post(signout))
        .route("/auth/me", get(me))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<Json<serde_json::Value>, AuthError> {
    payload.email = payload.email.trim().to_string();

    if payload.email.is_empty() || payload.username.is_empty() || payload.password.is_empty() {
        return Err(AuthError::BadRequest(
            "Email, username, and password are required.".into(),
        ));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AuthError::BadRequest("Invalid email.".into()));
    }

    let uid = state
        .auth
        .signup(&payload.email, &payload.username, &payload.password)
        .await?;

    Ok(Json(json!({
        "status": "ok",
        "message": "Signup successful.",
        "uid": uid,
    })))
}

#[instrument(skip(state, payload))]
async fn signin(
    State(state): State<AppState>,
    Json(payload): Json<SigninRequest>,
) -> Result<impl IntoResponse, AuthError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(AuthError::BadRequest(
            "Email and password are required.".into(),
        ));
    }

    let (access_token, refresh_token, user) =
        state.auth.signin(&payload.email, &payload.password).await?;

    let keys = state.auth.keys();
    let cookies = AppendHeaders([
        (
            SET_COOKIE,
            token_cookie(
                ACCESS_COOKIE_NAME,
                &access_token,
                keys.access_ttl.whole_seconds(),
            ),
        ),
        (
            SET_COOKIE,
            token_cookie(
                REFRESH_COOKIE_NAME,
                &refresh_token,
                keys.refresh_ttl.whole_seconds(),
            ),
        ),
    ]);

    Ok((
        cookies,
        Json(json!({
            "status": "ok",
            "email": user.email,
            "username": user.username,
        })),
    ))
}

#[instrument(skip(state, headers))]
async fn signout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AuthError> {
    let access_token = get_cookie(&headers, ACCESS_COOKIE_NAME);
    state.auth.signout(access_token.as_deref()).await?;

    let cookies = AppendHeaders([
        (SET_COOKIE, clear_cookie(ACCESS_COOKIE_NAME)),
        (SET_COOKIE, clear_cookie(REFRESH_COOKIE_NAME)),
    ]);

    Ok((
        cookies,
        Json(json!({ "status": "ok", "message": "Signed out." })),
    ))
}

#[instrument(skip(state))]
async fn me(
    State(state): State<AppState>,
    AuthUser(uid): AuthUser,
) -> Result<Json<UserSummary>, AuthError> {
    let profile = state.auth.get_profile(uid).await?;
    Ok(Json(profile))
}
