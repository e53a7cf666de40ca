use super::payment::{DeferReason, TrackingHandle};
use super::value::{Address, DestinationId, Timestamp};
use serde::{Deserialize, Serialize};

/// Audit trail entries written by the registry and the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PayrollEvent {
    CompanyRegistered {
        company_id: u64,
        owner: Address,
        fee: u128,
    },
    CompanyStatusChanged {
        company_id: u64,
        active: bool,
    },
    CompanyDeleted {
        company_id: u64,
        removed_employees: Vec<u64>,
    },
    CompanyOwnershipTransferred {
        company_id: u64,
        previous_owner: Address,
        new_owner: Address,
    },
    EmployeeAdded {
        company_id: u64,
        employee_id: u64,
        destination: DestinationId,
        amount: u128,
    },
    EmployeeUpdated {
        company_id: u64,
        employee_id: u64,
        destination: DestinationId,
        amount: u128,
    },
    EmployeeDeactivated {
        company_id: u64,
        employee_id: u64,
        by_admin: bool,
    },
    DestinationAllowed {
        destination: DestinationId,
    },
    DestinationDisallowed {
        destination: DestinationId,
    },
    /// Schedule left untouched; the payment is retried by a later scan.
    PaymentDeferred {
        company_id: u64,
        employee_id: u64,
        amount: u128,
        destination: DestinationId,
        reason: DeferReason,
    },
    LocalSettled {
        company_id: u64,
        employee_id: u64,
        amount: u128,
        destination: DestinationId,
    },
    BridgeSubmitted {
        company_id: u64,
        employee_id: u64,
        amount: u128,
        destination: DestinationId,
        handle: TrackingHandle,
    },
    /// Funds reached escrow but the bridge rejected the submission.
    EscrowStranded {
        company_id: u64,
        employee_id: u64,
        amount: u128,
        destination: DestinationId,
        error: String,
    },
}

impl PayrollEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            PayrollEvent::CompanyRegistered { .. } => "company_registered",
            PayrollEvent::CompanyStatusChanged { .. } => "company_status_changed",
            PayrollEvent::CompanyDeleted { .. } => "company_deleted",
            PayrollEvent::CompanyOwnershipTransferred { .. } => "company_ownership_transferred",
            PayrollEvent::EmployeeAdded { .. } => "employee_added",
            PayrollEvent::EmployeeUpdated { .. } => "employee_updated",
            PayrollEvent::EmployeeDeactivated { .. } => "employee_deactivated",
            PayrollEvent::DestinationAllowed { .. } => "destination_allowed",
            PayrollEvent::DestinationDisallowed { .. } => "destination_disallowed",
            PayrollEvent::PaymentDeferred { .. } => "payment_deferred",
            PayrollEvent::LocalSettled { .. } => "local_settled",
            PayrollEvent::BridgeSubmitted { .. } => "bridge_submitted",
            PayrollEvent::EscrowStranded { .. } => "escrow_stranded",
        }
    }

    pub fn company_id(&self) -> Option<u64> {
        match self {
            PayrollEvent::CompanyRegistered { company_id, .. }
            | PayrollEvent::CompanyStatusChanged { company_id, .. }
            | PayrollEvent::CompanyDeleted { company_id, .. }
            | PayrollEvent::CompanyOwnershipTransferred { company_id, .. }
            | PayrollEvent::EmployeeAdded { company_id, .. }
            | PayrollEvent::EmployeeUpdated { company_id, .. }
            | PayrollEvent::EmployeeDeactivated { company_id, .. }
            | PayrollEvent::PaymentDeferred { company_id, .. }
            | PayrollEvent::LocalSettled { company_id, .. }
            | PayrollEvent::BridgeSubmitted { company_id, .. }
            | PayrollEvent::EscrowStranded { company_id, .. } => Some(*company_id),
            PayrollEvent::DestinationAllowed { .. } | PayrollEvent::DestinationDisallowed { .. } => {
                None
            }
        }
    }

    pub fn employee_id(&self) -> Option<u64> {
        match self {
            PayrollEvent::EmployeeAdded { employee_id, .. }
            | PayrollEvent::EmployeeUpdated { employee_id, .. }
            | PayrollEvent::EmployeeDeactivated { employee_id, .. }
            | PayrollEvent::PaymentDeferred { employee_id, .. }
            | PayrollEvent::LocalSettled { employee_id, .. }
            | PayrollEvent::BridgeSubmitted { employee_id, .. }
            | PayrollEvent::EscrowStranded { employee_id, .. } => Some(*employee_id),
            _ => None,
        }
    }
}

/// An event as persisted in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub sequence: u64,
    pub recorded_at: Timestamp,
    pub event: PayrollEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_kind_tag() {
        let event = PayrollEvent::BridgeSubmitted {
            company_id: 1,
            employee_id: 2,
            amount: 500,
            destination: DestinationId(30),
            handle: TrackingHandle::Sequence(9),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "bridge_submitted");
        assert_eq!(json["handle"]["sequence"], 9);
        assert_eq!(event.kind(), "bridge_submitted");
    }

    #[test]
    fn test_event_ids() {
        let event = PayrollEvent::PaymentDeferred {
            company_id: 3,
            employee_id: 4,
            amount: 0,
            destination: DestinationId(0),
            reason: DeferReason::InsufficientAllowance,
        };
        assert_eq!(event.company_id(), Some(3));
        assert_eq!(event.employee_id(), Some(4));
        let allowed = PayrollEvent::DestinationAllowed {
            destination: DestinationId(5),
        };
        assert_eq!(allowed.company_id(), None);
    }
}
