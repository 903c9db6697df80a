use std::env;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Credentials of the image hosting service used for client-side uploads
#[derive(Debug, Clone, PartialEq)]
pub struct ImageKitConfig {
    pub url_endpoint: String,
    pub public_key: String,
    pub private_key: String,
}

/// Process configuration, read once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    /// `whsec_`-prefixed signing secret of the identity-provider webhook
    pub clerk_webhook_secret: Option<String>,
    pub imagekit: Option<ImageKitConfig>,
    /// External identity keys allowed to feature any blog
    pub admin_user_ids: Vec<String>,
}

impl AppConfig {
    /// Load from the environment, after merging a `.env` file if one exists
    pub fn from_env() -> Result<Self, ConfigError> {
        if dotenv::dotenv().is_ok() {
            info!("Loaded environment from .env");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: e.to_string(),
            })?,
            None => 3000,
        };

        let imagekit = match (
            get("IMAGEKIT_URL_ENDPOINT"),
            get("IMAGEKIT_PUBLIC_KEY"),
            get("IMAGEKIT_PRIVATE_KEY"),
        ) {
            (Some(url_endpoint), Some(public_key), Some(private_key)) => Some(ImageKitConfig {
                url_endpoint,
                public_key,
                private_key,
            }),
            _ => None,
        };

        let admin_user_ids = get("ADMIN_CLERK_USER_IDS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url,
            port,
            clerk_webhook_secret: get("CLERK_WEBHOOK_SIGNING_SECRET"),
            imagekit,
            admin_user_ids,
        })
    }
}
