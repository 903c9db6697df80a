use tracing::{info, warn};

use super::DomainError;
use crate::db::{BlogStore, USER_CLERK_ID_CONSTRAINT, USER_EMAIL_CONSTRAINT};
use crate::models::{ClerkEvent, ClerkUserData, NewUser, User, USER_CREATED_EVENT};

/// Result of handling a verified identity-provider event
#[derive(Debug, Clone, PartialEq)]
pub enum ProvisionOutcome {
    /// A new local user was inserted
    Created(User),
    /// The external identity key was already provisioned; nothing changed
    AlreadyExists,
    /// The event type is not one we act on
    Ignored { event_type: String },
}

impl From<&ClerkUserData> for NewUser {
    fn from(data: &ClerkUserData) -> Self {
        Self {
            clerk_user_id: data.id.clone(),
            username: data.display_name(),
            email: data.primary_email().map(str::to_string),
            img: data.avatar_url(),
        }
    }
}

/// Materialize the local user for a verified `user.created` event.
///
/// Delivery is at-least-once, so replays (including concurrent ones) resolve to
/// [`ProvisionOutcome::AlreadyExists`] instead of an error. At most one user is
/// ever inserted per external identity key.
#[tracing::instrument(skip(store, event), fields(event_type = %event.event_type))]
pub async fn provision_user(
    store: &dyn BlogStore,
    event: &ClerkEvent,
) -> Result<ProvisionOutcome, DomainError> {
    if event.event_type != USER_CREATED_EVENT {
        info!("Ignoring webhook event");
        return Ok(ProvisionOutcome::Ignored {
            event_type: event.event_type.clone(),
        });
    }

    let data: ClerkUserData = serde_json::from_value(event.data.clone())
        .map_err(|e| DomainError::Validation(format!("Malformed user.created payload: {}", e)))?;

    if data.id.trim().is_empty() {
        return Err(DomainError::Validation(
            "user.created payload is missing the user id".to_string(),
        ));
    }

    if store.find_user_by_clerk_id(&data.id).await?.is_some() {
        info!(clerk_user_id = %data.id, "User already provisioned");
        return Ok(ProvisionOutcome::AlreadyExists);
    }

    let new_user = NewUser::from(&data);
    match store.insert_user(&new_user).await {
        Ok(user) => {
            info!(user_id = user.id, clerk_user_id = %user.clerk_user_id, "Provisioned user");
            Ok(ProvisionOutcome::Created(user))
        }
        // A concurrent delivery of the same event won the insert
        Err(e) if e.is_unique_violation_on(USER_CLERK_ID_CONSTRAINT) => {
            info!(clerk_user_id = %data.id, "User provisioned by a concurrent delivery");
            Ok(ProvisionOutcome::AlreadyExists)
        }
        Err(e) if e.is_unique_violation_on(USER_EMAIL_CONSTRAINT) => {
            warn!(clerk_user_id = %data.id, "Email already belongs to another user");
            Err(DomainError::Conflict(
                "Email address is already registered to another user.".to_string(),
            ))
        }
        Err(e) => Err(e.into()),
    }
}
