use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::api::error::ApiError;
use crate::config::ImageKitConfig;
use crate::models::UploadAuthResponse;

type HmacSha1 = Hmac<Sha1>;

/// Lifetime of an upload token
pub const UPLOAD_TOKEN_TTL_SECS: i64 = 30 * 60;

/// Hex HMAC-SHA1 of `token + expire` keyed by the media host's private key
pub fn sign_upload(private_key: &str, token: &str, expire: i64) -> Result<String, ApiError> {
    let mut mac = HmacSha1::new_from_slice(private_key.as_bytes())
        .map_err(|e| ApiError::Internal(format!("Invalid upload signing key: {}", e)))?;
    mac.update(token.as_bytes());
    mac.update(expire.to_string().as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Short-lived parameters that let a browser upload straight to the media host
pub fn upload_auth_parameters(config: &ImageKitConfig, now: i64) -> Result<UploadAuthResponse, ApiError> {
    let token = uuid::Uuid::new_v4().to_string();
    let expire = now + UPLOAD_TOKEN_TTL_SECS;
    let signature = sign_upload(&config.private_key, &token, expire)?;

    Ok(UploadAuthResponse {
        token,
        expire,
        signature,
    })
}
