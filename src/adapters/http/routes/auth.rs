use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::{
    adapters::http::{
        app_state::AppState,
        routes::common::{cleared_session_headers, current_user_id, session_headers},
    },
    app_error::{AppError, AppResult},
    domain::entities::subscription_plan::PlanId,
};

#[derive(Deserialize)]
struct RegisterPayload {
    name: String,
    email: String,
    plan: Option<String>,
}

#[derive(Deserialize)]
struct LoginPayload {
    email: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(get_me))
}

async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> AppResult<impl IntoResponse> {
    let plan = payload
        .plan
        .as_deref()
        .map(|p| {
            p.parse::<PlanId>()
                .map_err(|_| AppError::InvalidInput(format!("Unknown plan: {}", p)))
        })
        .transpose()?;

    let profile = app_state
        .auth_use_cases
        .register(&payload.name, &payload.email, plan)
        .await?;
    let headers = session_headers(&app_state, profile.id)?;
    Ok((StatusCode::CREATED, headers, Json(profile)))
}

async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> AppResult<impl IntoResponse> {
    let profile = app_state.auth_use_cases.login(&payload.email).await?;
    let headers = session_headers(&app_state, profile.id)?;
    Ok((StatusCode::OK, headers, Json(profile)))
}

async fn logout() -> AppResult<(StatusCode, HeaderMap)> {
    Ok((StatusCode::NO_CONTENT, cleared_session_headers()?))
}

async fn get_me(
    State(app_state): State<AppState>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&jar, &app_state)?;
    let profile = app_state
        .auth_use_cases
        .get_profile(user_id)
        .await
        .map_err(|err| match err {
            // A valid token for a profile that no longer exists
            AppError::NotFound => AppError::InvalidCredentials,
            other => other,
        })?;
    Ok(Json(profile))
}
