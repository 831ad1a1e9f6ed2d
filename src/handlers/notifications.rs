//! HTTP handlers for notification subscribers.
//!
//! Subscribers register an HTTPS endpoint and receive signed JSON
//! notifications for completed shifts and new vehicles.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    error::AppError,
    extract::{ApiJson, ApiPath},
    models::{
        ApiResponse,
        notification::{
            DispatcherStatus, SendNotificationRequest, SubscribeRequest, SubscriptionStatus,
        },
    },
    services::notification_service,
    state::AppState,
};

/// Register (or reactivate) a subscriber endpoint.
///
/// # Response
///
/// 201 Created with `subscriptionId` and the signing `secret`. The secret is
/// only returned here.
pub async fn subscribe(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SubscribeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = notification_service::subscribe(&state.pool, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

pub async fn subscription_status(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SubscriptionStatus>>, AppError> {
    let total = notification_service::active_subscription_count(&state.pool).await?;
    Ok(Json(ApiResponse::success(SubscriptionStatus {
        total_subscriptions: total,
        message: "Push notification service is running".to_string(),
    })))
}

/// Deactivate a subscription. Returns 404 when it is unknown or already inactive.
pub async fn unsubscribe(
    State(state): State<AppState>,
    ApiPath(subscription_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    notification_service::unsubscribe(&state.pool, subscription_id).await?;
    Ok(Json(ApiResponse::success(json!({
        "subscriptionId": subscription_id,
        "message": "Subscription removed",
    }))))
}

/// Broadcast an operator-composed notification.
///
/// Delivery happens in the background; `queued` is false when notifications
/// are disabled.
pub async fn send(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SendNotificationRequest>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let payload = notification_service::custom_payload(request)?;
    let tag = payload.tag.clone();

    state.notifier.dispatch(payload);

    Ok(Json(ApiResponse::success(json!({
        "tag": tag,
        "queued": state.notifier.is_enabled(),
    }))))
}

pub async fn dispatcher_status(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DispatcherStatus>>, AppError> {
    let active = notification_service::active_subscription_count(&state.pool).await?;
    Ok(Json(ApiResponse::success(DispatcherStatus {
        message: "Notification dispatcher is running".to_string(),
        enabled: state.notifier.is_enabled(),
        active_subscriptions: active,
    })))
}
