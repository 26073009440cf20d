pub mod basefee;
mod cache;
pub mod context;
pub mod domain;
pub mod sync;

pub use context::ConsensusContext;
pub use domain::SignatureDomains;
