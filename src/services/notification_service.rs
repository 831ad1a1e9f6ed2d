//! Notification service: subscriber registry and fire-and-forget delivery.
//!
//! Lifecycle code signals the [`Notifier`]; delivery runs on a spawned task,
//! so request latency and outcome never depend on subscribers. Failed
//! deliveries are logged and recorded, not retried.

use std::time::Duration;

use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use crate::{
    config::Config,
    db::DbPool,
    error::AppError,
    models::{
        mileage_entry::MileageEntry,
        notification::{
            NewNotificationEvent, NotificationAction, NotificationPayload, PushSubscription,
            SendNotificationRequest, SubscribeRequest, SubscribeResponse,
        },
    },
    services::vehicle_service,
};

type HmacSha256 = Hmac<Sha256>;

const MAX_ENDPOINT_LEN: usize = 2048;
const MAX_TAG_LEN: usize = 64;
const ICON: &str = "/icon-192x192.png";
const BADGE: &str = "/icon-72x72.png";

/// Register a subscriber endpoint.
///
/// Registering an endpoint that already exists reactivates it and rotates
/// its secret. The secret is only returned here.
pub async fn subscribe(
    pool: &DbPool,
    request: SubscribeRequest,
) -> Result<SubscribeResponse, AppError> {
    validate_endpoint_url(&request.endpoint)?;

    let secret = generate_secret();

    let subscription_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO push_subscriptions (endpoint, keys, secret)
        VALUES ($1, $2, $3)
        ON CONFLICT (endpoint) DO UPDATE
        SET keys = EXCLUDED.keys, secret = EXCLUDED.secret, is_active = TRUE
        RETURNING id
        "#,
    )
    .bind(&request.endpoint)
    .bind(&request.keys)
    .bind(&secret)
    .fetch_one(pool)
    .await?;

    tracing::info!(%subscription_id, "push subscription registered");

    Ok(SubscribeResponse {
        subscription_id,
        secret,
        message: "Successfully subscribed to push notifications".to_string(),
    })
}

pub async fn active_subscription_count(pool: &DbPool) -> Result<i64, AppError> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM push_subscriptions WHERE is_active = TRUE")
            .fetch_one(pool)
            .await?;

    Ok(count)
}

/// Deactivate a subscription (delivery history is kept).
pub async fn unsubscribe(pool: &DbPool, subscription_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE push_subscriptions SET is_active = FALSE WHERE id = $1 AND is_active = TRUE",
    )
    .bind(subscription_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Subscription not found".to_string()));
    }

    Ok(())
}

/// Payload for a completed shift.
pub fn shift_completed_payload(
    entry: &MileageEntry,
    vehicle_name: Option<&str>,
) -> NotificationPayload {
    let vehicle = vehicle_name.unwrap_or("Unknown vehicle");
    let miles = entry.total_miles.unwrap_or(0);
    NotificationPayload {
        title: "Shift Completed".to_string(),
        body: format!(
            "{vehicle} returned by {} after {miles} miles.",
            entry.supervisor_name
        ),
        tag: "shift-completed".to_string(),
        icon: ICON.to_string(),
        badge: BADGE.to_string(),
        data: json!({
            "entryId": entry.id,
            "vehicleId": entry.vehicle_id,
            "totalMiles": miles,
        }),
        actions: vec![
            action("view", "View"),
            action("dismiss", "Dismiss"),
        ],
    }
}

/// Payload announcing a vehicle added to the fleet.
pub fn new_vehicle_payload(vehicle_name: &str) -> NotificationPayload {
    NotificationPayload {
        title: "New Vehicle Added".to_string(),
        body: format!("{vehicle_name} has been added to the fleet and is available for shifts."),
        tag: "new-vehicle".to_string(),
        icon: ICON.to_string(),
        badge: BADGE.to_string(),
        data: json!({}),
        actions: Vec::new(),
    }
}

/// Payload for an operator-composed broadcast.
pub fn custom_payload(request: SendNotificationRequest) -> Result<NotificationPayload, AppError> {
    let title = request.title.trim();
    let body = request.body.trim();
    if title.is_empty() || body.is_empty() {
        return Err(AppError::Validation(
            "Notification title and body are required".to_string(),
        ));
    }

    let tag = request
        .tag
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .unwrap_or_else(|| "broadcast".to_string());
    if tag.len() > MAX_TAG_LEN {
        return Err(AppError::Validation(format!(
            "Notification tag cannot exceed {MAX_TAG_LEN} characters"
        )));
    }

    Ok(NotificationPayload {
        title: title.to_string(),
        body: body.to_string(),
        tag,
        icon: ICON.to_string(),
        badge: BADGE.to_string(),
        data: request.data.unwrap_or_else(|| json!({})),
        actions: vec![
            action("view", "View"),
            action("dismiss", "Dismiss"),
        ],
    })
}

fn action(action: &str, title: &str) -> NotificationAction {
    NotificationAction {
        action: action.to_string(),
        title: title.to_string(),
    }
}

/// Handle used by request handlers to signal lifecycle events.
#[derive(Debug, Clone)]
pub struct Notifier {
    pool: DbPool,
    client: reqwest::Client,
    enabled: bool,
}

impl Notifier {
    pub fn new(pool: DbPool, config: &Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.notification_timeout_secs))
            .build()?;

        Ok(Self {
            pool,
            client,
            enabled: config.notifications_enabled,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Deliver `payload` to every active subscriber in the background.
    pub fn dispatch(&self, payload: NotificationPayload) {
        if !self.enabled {
            tracing::debug!(tag = %payload.tag, "notifications disabled, dropping");
            return;
        }

        let notifier = self.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.deliver_all(&payload).await {
                tracing::error!(tag = %payload.tag, error = ?e, "notification fan-out failed");
            }
        });
    }

    /// Announce a completed shift. The vehicle name is looked up off the request path.
    pub fn shift_completed(&self, entry: MileageEntry) {
        if !self.enabled {
            return;
        }

        let notifier = self.clone();
        tokio::spawn(async move {
            let vehicle_name = match vehicle_service::find_vehicle(&notifier.pool, entry.vehicle_id).await {
                Ok(vehicle) => vehicle.map(|v| v.name),
                Err(e) => {
                    tracing::warn!(vehicle_id = %entry.vehicle_id, error = ?e, "vehicle lookup failed");
                    None
                }
            };
            let payload = shift_completed_payload(&entry, vehicle_name.as_deref());
            if let Err(e) = notifier.deliver_all(&payload).await {
                tracing::error!(entry_id = %entry.id, error = ?e, "notification fan-out failed");
            }
        });
    }

    async fn deliver_all(&self, payload: &NotificationPayload) -> Result<(), AppError> {
        let subscriptions = sqlx::query_as::<_, PushSubscription>(
            "SELECT id, endpoint, secret FROM push_subscriptions WHERE is_active = TRUE",
        )
        .fetch_all(&self.pool)
        .await?;

        for subscription in subscriptions {
            if let Err(e) = self.deliver(&subscription, payload).await {
                tracing::error!(
                    subscription_id = %subscription.id,
                    endpoint = %subscription.endpoint,
                    error = ?e,
                    "failed to deliver notification"
                );
                // Continue to next subscriber even if one fails
            }
        }

        Ok(())
    }

    /// Send one signed notification and record the attempt.
    ///
    /// # Headers Sent
    ///
    /// - `Content-Type: application/json`
    /// - `X-Notification-Signature: sha256=<hex>`
    /// - `X-Notification-Id: <uuid>`
    async fn deliver(
        &self,
        subscription: &PushSubscription,
        payload: &NotificationPayload,
    ) -> Result<(), AppError> {
        let event_id = Uuid::new_v4();
        let body = serde_json::to_string(payload)
            .map_err(|e| AppError::Internal(format!("Failed to serialize notification: {e}")))?;
        let signature = generate_signature(&subscription.secret, &body)?;

        let response = self
            .client
            .post(&subscription.endpoint)
            .header("Content-Type", "application/json")
            .header("X-Notification-Signature", &signature)
            .header("X-Notification-Id", event_id.to_string())
            .body(body)
            .send()
            .await;

        let (status, response_body) = match response {
            Ok(resp) => {
                let status = i32::from(resp.status().as_u16());
                (Some(status), resp.text().await.ok())
            }
            Err(e) => {
                let error_msg = format!("Request failed: {e}");
                tracing::warn!(subscription_id = %subscription.id, "{}", error_msg);
                (None, Some(error_msg))
            }
        };

        let event = NewNotificationEvent {
            id: event_id,
            subscription_id,
            tag: payload.tag.clone(),
            payload: serde_json::to_value(payload)
                .map_err(|e| AppError::Internal(format!("Failed to encode notification: {e}")))?,
            response_status: status,
            response_body,
        };

        sqlx::query(
            r#"
            INSERT INTO notification_events (
                id,
                subscription_id,
                tag,
                payload,
                response_status,
                response_body
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(event.id)
        .bind(event.subscription_id)
        .bind(&event.tag)
        .bind(&event.payload)
        .bind(event.response_status)
        .bind(&event.response_body)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// HMAC-SHA256 signature in the form `sha256=<hex>`.
fn generate_signature(secret: &str, payload: &str) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(format!("Invalid signing key: {e}")))?;
    mac.update(payload.as_bytes());
    Ok(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

/// 64 hex characters (32 random bytes).
fn generate_secret() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// Subscriber endpoints must be HTTPS; plain HTTP is accepted for localhost only.
fn validate_endpoint_url(endpoint: &str) -> Result<(), AppError> {
    if endpoint.len() > MAX_ENDPOINT_LEN {
        return Err(AppError::Validation(format!(
            "Endpoint exceeds {MAX_ENDPOINT_LEN} characters"
        )));
    }

    let parsed = url::Url::parse(endpoint)
        .map_err(|_| AppError::Validation("Invalid endpoint URL".to_string()))?;

    match parsed.scheme() {
        "https" => Ok(()),
        "http" if matches!(parsed.host_str(), Some("localhost" | "127.0.0.1" | "0.0.0.0")) => {
            Ok(())
        }
        "http" => Err(AppError::Validation(
            "HTTP is only allowed for localhost. Use HTTPS for production.".to_string(),
        )),
        _ => Err(AppError::Validation(
            "Endpoint must use HTTP or HTTPS".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mileage_entry::fixtures::completed_entry;
    use crate::models::mileage_entry::ShiftKind;
    use chrono::NaiveDate;

    #[test]
    fn test_signature_is_hex_hmac() {
        let signature = generate_signature("secret", "{}").unwrap();
        assert!(signature.starts_with("sha256="));
        assert_eq!(signature.len(), "sha256=".len() + 64);
        assert_eq!(signature, generate_signature("secret", "{}").unwrap());
        assert_ne!(signature, generate_signature("other", "{}").unwrap());
    }

    #[test]
    fn test_secret_is_64_hex_chars() {
        let secret = generate_secret();
        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(secret, generate_secret());
    }

    #[test]
    fn test_endpoint_url_rules() {
        assert!(validate_endpoint_url("https://hooks.example/shift").is_ok());
        assert!(validate_endpoint_url("http://localhost:8080/hook").is_ok());
        assert!(validate_endpoint_url("http://hooks.example/shift").is_err());
        assert!(validate_endpoint_url("ftp://hooks.example/shift").is_err());
        assert!(validate_endpoint_url("not a url").is_err());
        let long = format!("https://hooks.example/{}", "a".repeat(MAX_ENDPOINT_LEN));
        assert!(validate_endpoint_url(&long).is_err());
    }

    #[test]
    fn test_shift_completed_payload() {
        let entry = completed_entry(
            Uuid::new_v4(),
            "J. Rivera",
            ShiftKind::First,
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            50,
        );

        let payload = shift_completed_payload(&entry, Some("Patrol 1"));
        assert_eq!(payload.tag, "shift-completed");
        assert_eq!(payload.body, "Patrol 1 returned by J. Rivera after 50 miles.");
        assert_eq!(payload.data["totalMiles"], 50);

        let dangling = shift_completed_payload(&entry, None);
        assert!(dangling.body.starts_with("Unknown vehicle"));
    }

    #[test]
    fn test_custom_payload_requires_text() {
        let blank = SendNotificationRequest {
            title: " ".to_string(),
            body: "Body".to_string(),
            tag: None,
            data: None,
        };
        assert!(matches!(custom_payload(blank), Err(AppError::Validation(_))));

        let ok = custom_payload(SendNotificationRequest {
            title: "Road closure".to_string(),
            body: "Gate 3 closed tonight".to_string(),
            tag: Some("  ".to_string()),
            data: None,
        })
        .unwrap();
        assert_eq!(ok.tag, "broadcast");
        assert_eq!(ok.data, json!({}));

        let long_tag = SendNotificationRequest {
            title: "Title".to_string(),
            body: "Body".to_string(),
            tag: Some("t".repeat(MAX_TAG_LEN + 1)),
            data: None,
        };
        assert!(matches!(custom_payload(long_tag), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_new_vehicle_payload() {
        let payload = new_vehicle_payload("Patrol 7");
        assert_eq!(payload.tag, "new-vehicle");
        assert!(payload.body.starts_with("Patrol 7 has been added"));
    }
}
