pub mod records;
pub mod api;
pub mod webhook;


pub use records::*;
pub use api::*;
pub use webhook::*;
