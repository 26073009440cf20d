use crate::types::BidContext;
use ethereum_consensus::primitives::Slot;

/// The closed set of outcome categories a bid analysis can settle into.
///
/// `ValidBid` is equivalent to "no fault" (invariant 3 of the data model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FaultCategory {
    ValidBid,
    InvalidBidPublicKey,
    InvalidBidSignature,
    InvalidBidConsensus,
    InvalidBidIgnoredPreferences,
}

impl std::fmt::Display for FaultCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ValidBid => "valid-bid",
            Self::InvalidBidPublicKey => "invalid-bid-public-key",
            Self::InvalidBidSignature => "invalid-bid-signature",
            Self::InvalidBidConsensus => "invalid-bid-consensus",
            Self::InvalidBidIgnoredPreferences => "invalid-bid-ignored-preferences",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("unrecognized fault category `{0}`")]
pub struct ParseFaultCategoryError(());

impl std::str::FromStr for FaultCategory {
    type Err = ParseFaultCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "valid-bid" | "ValidBid" => Ok(Self::ValidBid),
            "invalid-bid-public-key" | "InvalidBidPublicKey" => Ok(Self::InvalidBidPublicKey),
            "invalid-bid-signature" | "InvalidBidSignature" => Ok(Self::InvalidBidSignature),
            "invalid-bid-consensus" | "InvalidBidConsensus" => Ok(Self::InvalidBidConsensus),
            "invalid-bid-ignored-preferences" | "InvalidBidIgnoredPreferences" => {
                Ok(Self::InvalidBidIgnoredPreferences)
            }
            _ => Err(ParseFaultCategoryError(())),
        }
    }
}

/// The closed set of reasons within each category, per the bid-validation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FaultReason {
    InvalidSignature,
    IncorrectPublicKey,
    InvalidParentHash,
    InvalidRandomValue,
    InvalidBlockNumber,
    InvalidGasUsed,
    InvalidTimestamp,
    InvalidBaseFee,
    /// A transcript's bid did not match the bid stored under its context.
    /// Tracked per the Open Questions resolution in DESIGN.md: queryable via
    /// `records`, but never counted toward `reputationScore`.
    TranscriptBidMismatch,
    IgnoredValidatorPreferenceFeeRecipient,
    IgnoredValidatorPreferenceGasLimit,
}

impl FaultReason {
    pub const fn category(&self) -> FaultCategory {
        match self {
            Self::InvalidSignature => FaultCategory::InvalidBidSignature,
            Self::IncorrectPublicKey => FaultCategory::InvalidBidPublicKey,
            Self::InvalidParentHash
            | Self::InvalidRandomValue
            | Self::InvalidBlockNumber
            | Self::InvalidGasUsed
            | Self::InvalidTimestamp
            | Self::InvalidBaseFee
            | Self::TranscriptBidMismatch => FaultCategory::InvalidBidConsensus,
            Self::IgnoredValidatorPreferenceFeeRecipient
            | Self::IgnoredValidatorPreferenceGasLimit => FaultCategory::InvalidBidIgnoredPreferences,
        }
    }
}

impl std::fmt::Display for FaultReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// A single classified discrepancy (or `None` when the bid was valid),
/// anchored to the `BidContext` it was observed under.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FaultRecord {
    pub context: BidContext,
    pub category: FaultCategory,
    pub reason: Option<FaultReason>,
}

impl FaultRecord {
    pub fn valid(context: BidContext) -> Self {
        Self { context, category: FaultCategory::ValidBid, reason: None }
    }

    pub fn invalid(context: BidContext, reason: FaultReason) -> Self {
        Self { context, category: reason.category(), reason: Some(reason) }
    }

    pub fn slot(&self) -> Slot {
        self.context.slot
    }
}

/// Aggregate, monotonically non-decreasing counters for one relay over its
/// observed lifetime (queries narrow this down to a slot window at read
/// time; see `relay_monitor_analyzer::store`).
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct FaultSummary {
    pub total_bids: u64,
    pub no_bids: u64,
    pub signature_invalid: u64,
    pub public_key_invalid: u64,
    pub consensus_invalid: u64,
    pub ignored_preferences: u64,
    /// Reserved for the out-of-scope full-payload-validation path (see spec
    /// Non-goals): always zero until that collaborator exists.
    pub payment_invalid: u64,
    pub malformed_payloads: u64,
    pub consensus_invalid_payloads: u64,
    pub unavailable_payloads: u64,
}

impl FaultSummary {
    pub fn record(&mut self, category: FaultCategory) {
        self.total_bids += 1;
        match category {
            FaultCategory::ValidBid => {}
            FaultCategory::InvalidBidSignature => self.signature_invalid += 1,
            FaultCategory::InvalidBidPublicKey => self.public_key_invalid += 1,
            FaultCategory::InvalidBidConsensus => self.consensus_invalid += 1,
            FaultCategory::InvalidBidIgnoredPreferences => self.ignored_preferences += 1,
        }
    }

    /// A relay answered with HTTP 204 for the slot. Per the `totalBids`
    /// Open Questions resolution this does not bump `total_bids` — it is
    /// not a bid to analyze — but is still worth counting separately.
    pub fn record_no_bid(&mut self) {
        self.no_bids += 1;
    }
}
