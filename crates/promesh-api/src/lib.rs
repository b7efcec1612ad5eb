// promesh-api: Async Rust clients for the event portal and broker management APIs.

pub mod error;
pub mod portal;
pub mod semp;
pub mod transport;

pub use error::{Error, FieldError};
pub use portal::PortalClient;
pub use semp::SempClient;
pub use transport::TransportConfig;
