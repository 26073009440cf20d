pub mod collector;
pub mod error;
pub mod event;
pub mod relay_client;

pub use collector::{Collector, EVENT_CHANNEL_CAPACITY};
pub use event::Event;
pub use relay_client::{RelayClient, RelayEndpoint};
