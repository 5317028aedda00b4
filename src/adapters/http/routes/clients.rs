use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    adapters::http::{app_state::AppState, routes::common::current_user_id},
    app_error::{AppError, AppResult},
    domain::entities::client::ClientStatus,
    use_cases::client::{ClientListFilter, CreateClientInput, UpdateClientInput},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_clients).post(add_client))
        .route("/limit", get(get_limit))
        .route("/{id}", get(get_client).patch(update_client))
        .route("/{id}/archive", post(archive_client))
        .route("/{id}/restore", post(restore_client))
}

#[derive(Deserialize)]
struct ListQuery {
    status: Option<String>,
    search: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateClientPayload {
    full_name: String,
    email: Option<String>,
    phone: Option<String>,
    notes: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateClientPayload {
    full_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    notes: Option<String>,
    status: Option<String>,
}

fn parse_status(raw: &str) -> AppResult<ClientStatus> {
    raw.parse()
        .map_err(|_| AppError::InvalidInput(format!("Invalid client status: {}", raw)))
}

async fn list_clients(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&jar, &app_state)?;
    let filter = ClientListFilter {
        status: query.status.as_deref().map(parse_status).transpose()?,
        search: query.search,
    };
    let clients = app_state
        .client_use_cases
        .list_clients(user_id, &filter)
        .await?;
    Ok(Json(clients))
}

async fn get_limit(
    State(app_state): State<AppState>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&jar, &app_state)?;
    let decision = app_state
        .entitlement_use_cases
        .check_client_limit(user_id)
        .await?;
    Ok(Json(decision))
}

async fn add_client(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<CreateClientPayload>,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&jar, &app_state)?;
    let added = app_state
        .client_use_cases
        .add_client(
            user_id,
            CreateClientInput {
                full_name: payload.full_name,
                email: payload.email,
                phone: payload.phone,
                notes: payload.notes,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(added)))
}

async fn get_client(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Path(client_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&jar, &app_state)?;
    let client = app_state
        .client_use_cases
        .get_client(user_id, client_id)
        .await?;
    Ok(Json(client))
}

async fn update_client(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Path(client_id): Path<Uuid>,
    Json(payload): Json<UpdateClientPayload>,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&jar, &app_state)?;
    let input = UpdateClientInput {
        full_name: payload.full_name,
        email: payload.email,
        phone: payload.phone,
        notes: payload.notes,
        status: payload.status.as_deref().map(parse_status).transpose()?,
    };
    let client = app_state
        .client_use_cases
        .update_client(user_id, client_id, input)
        .await?;
    Ok(Json(client))
}

async fn archive_client(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Path(client_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&jar, &app_state)?;
    let client = app_state
        .client_use_cases
        .archive_client(user_id, client_id)
        .await?;
    Ok(Json(client))
}

async fn restore_client(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Path(client_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&jar, &app_state)?;
    let client = app_state
        .client_use_cases
        .restore_client(user_id, client_id)
        .await?;
    Ok(Json(client))
}
