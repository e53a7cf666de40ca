use super::value::{Address, Amount, DestinationId, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the next scan resumes. Both indices are reduced modulo the
/// current list lengths every time they are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanCursor {
    pub company_index: usize,
    pub employee_index: usize,
}

/// A due payment found by a scan, handed back verbatim to `dispatch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchToken {
    pub company_id: u64,
    pub employee_id: u64,
    pub company_index: usize,
    pub employee_index: usize,
    /// The pay date observed at scan time. A dispatch whose employee no
    /// longer carries this value is stale.
    pub expected_next_pay_date: Timestamp,
}

/// What kind of caller started a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Timer or automation; can only offer the configured automation fee.
    Automatic,
    /// Company owner paying now, bringing its own bridge fee.
    Manual { fee: u128 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeferReason {
    InsufficientAllowance,
    TransferFailed,
    EscrowFailed,
    BridgeFeeUnavailable,
}

impl fmt::Display for DeferReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeferReason::InsufficientAllowance => "insufficient_allowance",
            DeferReason::TransferFailed => "transfer_failed",
            DeferReason::EscrowFailed => "escrow_failed",
            DeferReason::BridgeFeeUnavailable => "bridge_fee_unavailable",
        };
        f.write_str(s)
    }
}

/// Handle returned by a bridge for an accepted transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingHandle {
    Sequence(u64),
    MessageId(String),
}

impl fmt::Display for TrackingHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingHandle::Sequence(seq) => write!(f, "seq:{}", seq),
            TrackingHandle::MessageId(id) => write!(f, "msg:{}", id),
        }
    }
}

/// Parameters of one cross-chain transfer attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeTransfer {
    /// Holder the bridge pulls from (the orchestrator escrow).
    pub source: Address,
    pub amount: Amount,
    pub destination: DestinationId,
    pub recipient: Address,
    pub payload: Vec<u8>,
}

/// Result of one dispatch that reached a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    LocalSettled {
        employee_id: u64,
        amount: Amount,
        next_pay_date: Timestamp,
    },
    BridgeSubmitted {
        employee_id: u64,
        amount: Amount,
        handle: TrackingHandle,
        next_pay_date: Timestamp,
    },
    Deferred {
        employee_id: u64,
        reason: DeferReason,
    },
}

impl DispatchOutcome {
    pub fn is_settled(&self) -> bool {
        !matches!(self, DispatchOutcome::Deferred { .. })
    }
}
