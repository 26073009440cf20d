//! The short-circuit bid-validation state machine: signature, public key,
//! header-consensus checks, then validator-preference checks, in that order,
//! returning on the first failure. Mirrors the shape of
//! `mev_rs::block_validation`, generalized from "is this gas limit in
//! bounds" to the full set of checks a relay monitor needs to run without a
//! local execution client.

use ethereum_consensus::builder::SignedValidatorRegistration;
use relay_monitor_consensus::{basefee, ConsensusContext, SignatureDomains};
use relay_monitor_types::{signing, types::BidContext, types::SignedBid, Clock, Error, FaultReason};
use std::cmp::Ordering;

const GAS_BOUND_DIVISOR: u64 = 1024;

/// The three possible outcomes of analyzing one collected bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidOutcome {
    /// No bid was collected for the slot; nothing to analyze or count.
    NoBid,
    Valid,
    Invalid(FaultReason),
}

/// Runs the full state machine against one collected bid.
pub async fn validate_bid(
    context: &BidContext,
    bid: Option<&SignedBid>,
    ccc: &ConsensusContext,
    domains: &SignatureDomains,
    clock: &Clock,
    registration: Option<&SignedValidatorRegistration>,
) -> Result<BidOutcome, Error> {
    let Some(bid) = bid else { return Ok(BidOutcome::NoBid) };

    if let Err(reason) = check_signature(bid, domains) {
        return Ok(BidOutcome::Invalid(reason))
    }
    if bid.message.public_key() != &context.relay_public_key {
        return Ok(BidOutcome::Invalid(FaultReason::IncorrectPublicKey))
    }
    if let Some(reason) = check_header_consensus(context, bid, ccc, clock).await? {
        return Ok(BidOutcome::Invalid(reason))
    }
    if let Some(registration) = registration {
        if let Some(reason) = check_validator_preferences(bid, registration, ccc).await? {
            return Ok(BidOutcome::Invalid(reason))
        }
    }
    Ok(BidOutcome::Valid)
}

fn check_signature(bid: &SignedBid, domains: &SignatureDomains) -> Result<(), FaultReason> {
    let mut message = bid.message.clone();
    let domain = domains.for_builder();
    let signing_root =
        signing::compute_signing_root(&mut message, domain).map_err(|_| FaultReason::InvalidSignature)?;
    signing::verify_signature(bid.message.public_key(), signing_root.as_ref(), &bid.signature)
        .map_err(|_| FaultReason::InvalidSignature)
}

async fn check_header_consensus(
    context: &BidContext,
    bid: &SignedBid,
    ccc: &ConsensusContext,
    clock: &Clock,
) -> Result<Option<FaultReason>, Error> {
    let header = bid.message.header();
    let slot = context.slot;

    if header.parent_hash() != &context.parent_hash {
        return Ok(Some(FaultReason::InvalidParentHash))
    }
    if header.prev_randao() != &ccc.get_randomness_for_proposal(slot).await? {
        return Ok(Some(FaultReason::InvalidRandomValue))
    }
    if header.block_number() != ccc.get_block_number_for_proposal(slot).await? {
        return Ok(Some(FaultReason::InvalidBlockNumber))
    }
    if header.gas_used() > header.gas_limit() {
        return Ok(Some(FaultReason::InvalidGasUsed))
    }
    if header.timestamp() != clock.slot_start(slot) {
        return Ok(Some(FaultReason::InvalidTimestamp))
    }
    let base_fee = basefee::base_fee_from_le_bytes(
        header.base_fee_per_gas().to_bytes_le().try_into().expect("32 bytes"),
    );
    if base_fee != ccc.get_base_fee_for_proposal(slot).await? {
        return Ok(Some(FaultReason::InvalidBaseFee))
    }

    Ok(None)
}

async fn check_validator_preferences(
    bid: &SignedBid,
    registration: &SignedValidatorRegistration,
    ccc: &ConsensusContext,
) -> Result<Option<FaultReason>, Error> {
    let header = bid.message.header();
    let preferences = &registration.message;

    if header.fee_recipient() != &preferences.fee_recipient {
        return Ok(Some(FaultReason::IgnoredValidatorPreferenceFeeRecipient))
    }

    let current = header.gas_limit();
    let preferred = preferences.gas_limit;
    if current == preferred {
        return Ok(None)
    }

    let parent = match ccc.get_parent_gas_limit(header.block_number()).await {
        Ok(parent) => parent,
        // Indeterminate: never guess, skip the check rather than fault it.
        Err(Error::MissingBlockNumberMapping(..)) => return Ok(None),
        Err(err) => return Err(err),
    };

    let expected = match preferred.cmp(&current) {
        Ordering::Equal => current,
        Ordering::Greater => parent + parent / GAS_BOUND_DIVISOR,
        Ordering::Less => parent - parent / GAS_BOUND_DIVISOR,
    };

    if current == expected {
        Ok(None)
    } else {
        Ok(Some(FaultReason::IgnoredValidatorPreferenceGasLimit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_limit_drift_accepted() {
        let parent = 30_000_000u64;
        let preferred = 31_000_000u64;
        let current = 30_000_000 + 30_000_000 / GAS_BOUND_DIVISOR;
        let expected = match preferred.cmp(&current) {
            Ordering::Greater => parent + parent / GAS_BOUND_DIVISOR,
            Ordering::Less => parent - parent / GAS_BOUND_DIVISOR,
            Ordering::Equal => current,
        };
        assert_eq!(current, expected);
        assert_eq!(current, 30_029_296);
    }
}
