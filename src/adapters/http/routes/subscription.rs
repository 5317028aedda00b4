use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::{app_state::AppState, routes::common::current_user_id},
    app_error::{AppError, AppResult},
    domain::entities::{
        subscription::SubscriptionData,
        subscription_plan::{PlanId, SubscriptionPlan},
    },
    use_cases::entitlement::subscription_warning,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_subscription))
        .route("/warning", get(get_warning))
        .route("/billing-history", get(get_billing_history))
        .route("/plan", post(change_plan))
        .route("/renew", post(renew))
}

pub(crate) async fn list_plans(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.subscription_use_cases.list_plans())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionResponse {
    subscription: SubscriptionData,
    plan: &'static SubscriptionPlan,
    days_until_expiry: i64,
    is_expired: bool,
    warning: Option<String>,
}

impl SubscriptionResponse {
    fn from_data(subscription: SubscriptionData) -> Self {
        let now = Utc::now();
        Self {
            plan: subscription.plan.plan(),
            days_until_expiry: subscription.days_until_expiry(now),
            is_expired: subscription.is_expired_at(now),
            warning: subscription_warning(&subscription, now),
            subscription,
        }
    }
}

async fn get_subscription(
    State(app_state): State<AppState>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&jar, &app_state)?;
    let subscription = app_state
        .subscription_use_cases
        .get_subscription(user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(SubscriptionResponse::from_data(subscription)))
}

#[derive(Serialize)]
struct WarningResponse {
    message: Option<String>,
}

async fn get_warning(
    State(app_state): State<AppState>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&jar, &app_state)?;
    let message = app_state
        .entitlement_use_cases
        .get_subscription_warning(user_id)
        .await?;
    Ok(Json(WarningResponse { message }))
}

async fn get_billing_history(
    State(app_state): State<AppState>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&jar, &app_state)?;
    let history = app_state
        .subscription_use_cases
        .billing_history(user_id)
        .await?;
    Ok(Json(history))
}

#[derive(Deserialize)]
struct ChangePlanPayload {
    plan: String,
}

async fn change_plan(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<ChangePlanPayload>,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&jar, &app_state)?;
    let plan: PlanId = payload
        .plan
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("Unknown plan: {}", payload.plan)))?;

    let subscription = app_state
        .subscription_use_cases
        .change_plan(user_id, plan)
        .await?;
    Ok(Json(SubscriptionResponse::from_data(subscription)))
}

async fn renew(
    State(app_state): State<AppState>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&jar, &app_state)?;
    let subscription = app_state.subscription_use_cases.renew(user_id).await?;
    Ok(Json(SubscriptionResponse::from_data(subscription)))
}
