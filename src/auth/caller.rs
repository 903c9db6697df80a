use axum::http::HeaderMap;

use crate::api::error::ApiError;

/// Header an upstream auth layer uses to attach the caller's external identity key
pub const CALLER_HEADER: &str = "X-Clerk-User-Id";

/// Resolve the caller's external identity key.
///
/// The header set by the auth layer wins over a `clerkUserId` supplied in the
/// request itself. Missing or blank in both places is an authorization error.
pub fn caller_identity(headers: &HeaderMap, supplied: Option<&str>) -> Result<String, ApiError> {
    let from_header = headers
        .get(CALLER_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    from_header
        .or_else(|| supplied.map(str::trim).filter(|v| !v.is_empty()))
        .map(str::to_string)
        .ok_or_else(|| ApiError::Unauthorized("Clerk user ID is required.".to_string()))
}
