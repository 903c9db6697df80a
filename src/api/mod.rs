pub mod error;
pub mod extract;
pub mod handlers;
pub mod server;

pub use server::{create_app, create_router, AppState};
