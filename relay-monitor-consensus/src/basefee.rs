//! EIP-1559 base-fee projection used to compute the value a proposal at
//! `slot` must carry given the parent execution payload.
//!
//! Grounded in `block_validation.rs`'s `compute_preferred_gas_limit`: a small,
//! independently testable pure function mirroring the spec's arithmetic
//! rather than the protocol's own implementation, since `ethereum_consensus`
//! does not expose this computation directly.

use ethereum_consensus::primitives::U256;

const BASE_FEE_MAX_CHANGE_DENOMINATOR: u64 = 8;

/// Projects the base fee a child block at `parent_gas_limit`/`parent_gas_used`/
/// `parent_base_fee` must carry, per EIP-1559.
pub fn compute_base_fee(parent_gas_limit: u64, parent_gas_used: u64, parent_base_fee: U256) -> U256 {
    let parent_gas_target = parent_gas_limit / 2;

    if parent_gas_used == parent_gas_target {
        return parent_base_fee
    }

    let denominator = U256::from(BASE_FEE_MAX_CHANGE_DENOMINATOR);
    let target = U256::from(parent_gas_target);

    if parent_gas_used > parent_gas_target {
        let gas_used_delta = U256::from(parent_gas_used - parent_gas_target);
        let delta = (parent_base_fee * gas_used_delta / target / denominator).max(U256::from(1));
        parent_base_fee + delta
    } else {
        let gas_used_delta = U256::from(parent_gas_target - parent_gas_used);
        let delta = parent_base_fee * gas_used_delta / target / denominator;
        parent_base_fee.checked_sub(delta).unwrap_or(U256::ZERO)
    }
}

/// The execution payload header stores `base_fee_per_gas` as a 32-byte
/// little-endian field; these two helpers are the explicit round-trip used in
/// tests, since `ExecutionPayloadHeader::base_fee_per_gas` already returns a
/// decoded `U256` and application code never needs to reverse bytes itself.
pub fn le_bytes_from_base_fee(value: U256) -> [u8; 32] {
    value.to_bytes_le().try_into().expect("U256 encodes to 32 bytes")
}

pub fn base_fee_from_le_bytes(bytes: [u8; 32]) -> U256 {
    U256::from_bytes_le(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_fee_unchanged_at_target() {
        let base_fee = U256::from(1_000_000_000u64);
        assert_eq!(compute_base_fee(30_000_000, 15_000_000, base_fee), base_fee);
    }

    #[test]
    fn test_base_fee_increases_above_target() {
        let base_fee = U256::from(1_000_000_000u64);
        let projected = compute_base_fee(30_000_000, 20_000_000, base_fee);
        assert!(projected > base_fee);
    }

    #[test]
    fn test_base_fee_decreases_below_target() {
        // parentGasTarget=10_000_000, parentGasUsed=9_000_000, parentBaseFee=0x3b9aca00
        let base_fee = U256::from(0x3b9aca00u64);
        let projected = compute_base_fee(20_000_000, 9_000_000, base_fee);
        assert_eq!(projected, U256::from(0x3adc0de0u64));
    }

    #[test]
    fn test_base_fee_le_byte_round_trip() {
        let base_fee = U256::from(0x3adc0de0u64);
        let bytes = le_bytes_from_base_fee(base_fee);
        assert_eq!(base_fee_from_le_bytes(bytes), base_fee);
    }
}
