use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Json,
};
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::server::AppState;
use crate::auth::WebhookVerifier;
use crate::domain::{self, ProvisionOutcome};
use crate::models::{ClerkEvent, WebhookResponse};

/// Identity-provider webhook. The raw body is needed for signature
/// verification, so JSON is parsed only after the signature checks out.
#[tracing::instrument(skip(state, headers, body), fields(body_len = body.len()))]
pub async fn clerk_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookResponse>> {
    let secret = state
        .config
        .clerk_webhook_secret
        .as_deref()
        .ok_or_else(|| ApiError::Internal("Webhook secret not configured".to_string()))?;

    let verifier = WebhookVerifier::new(secret).map_err(|e| {
        warn!(error = %e, "Configured webhook secret is unusable");
        ApiError::Internal("Webhook secret not configured".to_string())
    })?;

    if let Err(e) = verifier.verify(&headers, &body) {
        warn!(error = %e, "Rejected webhook delivery");
        return Err(e.into());
    }

    let event: ClerkEvent = serde_json::from_slice(&body)?;

    let response = match domain::provision_user(state.store.as_ref(), &event).await? {
        ProvisionOutcome::Created(user) => {
            info!(user_id = user.id, "Provisioned user from webhook");
            WebhookResponse {
                message: "User created successfully".to_string(),
                user_id: Some(user.id),
                event_type: None,
            }
        }
        ProvisionOutcome::AlreadyExists => WebhookResponse {
            message: "User already exists".to_string(),
            user_id: None,
            event_type: None,
        },
        ProvisionOutcome::Ignored { event_type } => WebhookResponse {
            message: "Event received but not processed".to_string(),
            user_id: None,
            event_type: Some(event_type),
        },
    };

    Ok(Json(response))
}
