pub mod clock;
pub mod config;
mod error;
mod fault;
pub mod genesis;
mod network;
pub mod serde;
pub mod signing;
pub mod types;

pub use clock::Clock;
pub use error::Error;
pub use fault::{FaultCategory, FaultRecord, FaultReason, FaultSummary};
pub use network::Network;
