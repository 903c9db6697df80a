use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event type that triggers user provisioning
pub const USER_CREATED_EVENT: &str = "user.created";

/// Envelope of every identity-provider webhook. `data` stays untyped until the
/// event type is known, since each type carries a different shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClerkEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClerkEmailAddress {
    pub email_address: Option<String>,
}

/// `data` of a `user.created` event. Every field except `id` may be absent or
/// null depending on how the user signed up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClerkUserData {
    pub id: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_addresses: Option<Vec<ClerkEmailAddress>>,
    pub profile_image_url: Option<String>,
    pub image_url: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl ClerkUserData {
    /// Address of the first listed email entry, if it has one
    pub fn primary_email(&self) -> Option<&str> {
        let first = self.email_addresses.as_deref()?.first()?;
        non_empty(first.email_address.as_deref())
    }

    /// Display name, first non-empty of:
    /// 1. `username`
    /// 2. `"{first_name} {last_name}"`, trimmed
    /// 3. local part of the primary email
    /// 4. `"user_{id}"`
    pub fn display_name(&self) -> String {
        if let Some(username) = non_empty(self.username.as_deref()) {
            return username.to_string();
        }

        let first = self.first_name.as_deref().unwrap_or("");
        let last = self.last_name.as_deref().unwrap_or("");
        let full_name = format!("{} {}", first, last);
        let full_name = full_name.trim();
        if !full_name.is_empty() {
            return full_name.to_string();
        }

        if let Some(email) = self.primary_email() {
            let local_part = email.split('@').next().unwrap_or("");
            if !local_part.is_empty() {
                return local_part.to_string();
            }
        }

        format!("user_{}", self.id)
    }

    /// `profile_image_url`, else `image_url`, else empty
    pub fn avatar_url(&self) -> String {
        non_empty(self.profile_image_url.as_deref())
            .or_else(|| non_empty(self.image_url.as_deref()))
            .unwrap_or("")
            .to_string()
    }
}
