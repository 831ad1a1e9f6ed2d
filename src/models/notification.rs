//! Notification subscription and delivery models.
//!
//! # Flow
//!
//! 1. A client registers an endpoint via `POST /notifications/subscribe`
//! 2. The server stores it in `push_subscriptions` with a signing secret
//! 3. Lifecycle events (shift completed, vehicle added) are POSTed to every
//!    active subscription, signed with HMAC-SHA256
//! 4. Each attempt is logged in `notification_events`
//!
//! Subscriptions live in the database so restarts and multiple instances
//! see the same set.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Delivery target read from `push_subscriptions`.
///
/// Only the columns delivery needs; the `secret` never leaves the server
/// after registration.
#[derive(Debug, Clone, FromRow)]
pub struct PushSubscription {
    pub id: Uuid,
    pub endpoint: String,
    pub secret: String,
}

/// Request to register a subscriber.
///
/// ```json
/// { "endpoint": "https://hooks.example/shift", "keys": { "p256dh": "...", "auth": "..." } }
/// ```
///
/// `keys` is stored as given for clients that carry browser push metadata.
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub endpoint: String,
    pub keys: Option<serde_json::Value>,
}

/// Returned once, on registration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeResponse {
    pub subscription_id: Uuid,
    pub secret: String,
    pub message: String,
}

/// `GET /notifications/subscribe`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    pub total_subscriptions: i64,
    pub message: String,
}

/// `GET /notifications/send`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatcherStatus {
    pub message: String,
    pub enabled: bool,
    pub active_subscriptions: i64,
}

/// Body of `POST /notifications/send`.
#[derive(Debug, Deserialize)]
pub struct SendNotificationRequest {
    pub title: String,
    pub body: String,
    pub tag: Option<String>,
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// JSON body POSTed to subscribers.
///
/// # Example
///
/// ```json
/// {
///   "title": "Shift completed",
///   "body": "Patrol 1 returned by J. Rivera after 50 miles.",
///   "tag": "shift-completed",
///   "icon": "/icon-192x192.png",
///   "badge": "/icon-72x72.png",
///   "data": { "entryId": "..." },
///   "actions": [{ "action": "view", "title": "View" }]
/// }
/// ```
///
/// # Signature Verification
///
/// Requests carry `X-Notification-Signature: sha256=<hex>` where the hex is
/// HMAC-SHA256(secret, body).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub tag: String,
    pub icon: String,
    pub badge: String,
    pub data: serde_json::Value,
    pub actions: Vec<NotificationAction>,
}

/// Delivery record written to `notification_events`.
#[derive(Debug, Clone)]
pub struct NewNotificationEvent {
    pub id: Uuid,
    pub subscription_id: Uuid,
    pub tag: String,
    pub payload: serde_json::Value,
    pub response_status: Option<i32>,
    pub response_body: Option<String>,
}
