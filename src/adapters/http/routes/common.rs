//! Session cookie helpers shared by the route modules.

use axum::http::{HeaderMap, HeaderValue};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::jwt,
};

pub(crate) const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Appends a cookie to the headers, handling parse errors gracefully
pub(crate) fn append_cookie(headers: &mut HeaderMap, cookie: Cookie<'_>) -> AppResult<()> {
    let value = HeaderValue::from_str(&cookie.to_string())
        .map_err(|_| AppError::Internal("Failed to build cookie header".into()))?;
    headers.append("set-cookie", value);
    Ok(())
}

/// Issues an access token for `user_id` and returns it as a `set-cookie` header.
pub(crate) fn session_headers(app_state: &AppState, user_id: Uuid) -> AppResult<HeaderMap> {
    let token = jwt::issue(
        user_id,
        &app_state.config.jwt_secret,
        app_state.config.access_token_ttl,
    )?;
    let cookie = Cookie::build((ACCESS_TOKEN_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(app_state.config.access_token_ttl)
        .build();

    let mut headers = HeaderMap::new();
    append_cookie(&mut headers, cookie)?;
    Ok(headers)
}

pub(crate) fn cleared_session_headers() -> AppResult<HeaderMap> {
    let cookie = Cookie::build((ACCESS_TOKEN_COOKIE, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(0))
        .build();

    let mut headers = HeaderMap::new();
    append_cookie(&mut headers, cookie)?;
    Ok(headers)
}

pub(crate) fn current_user_id(jar: &CookieJar, app_state: &AppState) -> AppResult<Uuid> {
    let Some(access_cookie) = jar.get(ACCESS_TOKEN_COOKIE) else {
        return Err(AppError::InvalidCredentials);
    };
    let claims = jwt::verify(access_cookie.value(), &app_state.config.jwt_secret)?;
    claims.user_id()
}
