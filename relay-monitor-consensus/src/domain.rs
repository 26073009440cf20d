//! Signature domains are pure functions of the network `Context` and, for
//! the beacon-proposer domain, the active fork — so both are computed once
//! and cached rather than recomputed per bid.

use ethereum_consensus::{primitives::Domain, state_transition::Context, Fork};
use parking_lot::RwLock;
use relay_monitor_types::{signing, Error};
use std::collections::HashMap;

pub struct SignatureDomains {
    context: Context,
    builder: Domain,
    per_fork: RwLock<HashMap<Fork, Domain>>,
}

impl SignatureDomains {
    pub fn new(context: Context) -> Result<Self, Error> {
        let builder = signing::signature_domain_for_builder(&context)?;
        Ok(Self { context, builder, per_fork: RwLock::new(HashMap::new()) })
    }

    pub fn for_builder(&self) -> Domain {
        self.builder
    }

    pub fn for_slot(&self, slot: u64) -> Result<Domain, Error> {
        let fork = self.context.fork_for(slot);
        if let Some(domain) = self.per_fork.read().get(&fork) {
            return Ok(*domain)
        }
        let domain = signing::signature_domain_for_slot(&self.context, slot)?;
        self.per_fork.write().insert(fork, domain);
        Ok(domain)
    }
}
