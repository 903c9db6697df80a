pub mod caller;
pub mod webhook;
pub mod upload;

pub use caller::{caller_identity, CALLER_HEADER};
pub use webhook::{WebhookError, WebhookVerifier};
pub use upload::upload_auth_parameters;
