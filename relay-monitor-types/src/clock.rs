//! Wall time ↔ slot ↔ epoch translation, grounded in
//! `ethereum_consensus::clock` (the same module `mev_relay_rs::service::
//! Service::run` uses for `clock::for_mainnet()` and `clock.stream_slots()`).
//! This wrapper adds the `slotStart`/`epochOf` arithmetic the validation
//! state machine needs and that `ethereum_consensus::clock` does not itself
//! expose as a public helper.

use ethereum_consensus::{
    clock::{self, SystemTimeProvider},
    primitives::{Epoch, Slot},
};
use futures::Stream;

pub struct Clock {
    genesis_time: u64,
    seconds_per_slot: u64,
    slots_per_epoch: Slot,
    inner: clock::Clock<SystemTimeProvider>,
}

impl Clock {
    pub fn new(genesis_time: u64, seconds_per_slot: u64, slots_per_epoch: Slot) -> Self {
        let inner = clock::Clock::new(
            genesis_time,
            seconds_per_slot,
            slots_per_epoch,
            SystemTimeProvider,
        );
        Self { genesis_time, seconds_per_slot, slots_per_epoch, inner }
    }

    pub fn current_slot(&self) -> Slot {
        self.inner.current_slot()
    }

    /// `genesisTime + slot * secondsPerSlot`.
    pub fn slot_start(&self, slot: Slot) -> u64 {
        self.genesis_time + slot * self.seconds_per_slot
    }

    pub fn epoch_of(&self, slot: Slot) -> Epoch {
        slot / self.slots_per_epoch
    }

    pub fn stream_slots(&self) -> impl Stream<Item = Slot> + '_ {
        self.inner.stream_slots()
    }

    pub fn stream_epochs(&self) -> impl Stream<Item = Epoch> + '_ {
        self.inner.stream_epochs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_start_and_epoch_of() {
        let clock = Clock::new(0, 12, 32);
        assert_eq!(clock.slot_start(100), 1200);
        assert_eq!(clock.epoch_of(100), 3);
    }
}
