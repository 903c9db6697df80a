pub mod connection;
pub mod errors;
pub mod store;
pub mod postgres;
pub mod memory;


pub use connection::*;
pub use errors::*;
pub use store::*;
pub use postgres::PgStore;
pub use memory::MemoryStore;
