use crate::domain::event::{EventRecord, PayrollEvent};
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// Flat CSV shape of one event record.
#[derive(Debug, Serialize, PartialEq)]
struct EventRow {
    seq: u64,
    at: u64,
    kind: &'static str,
    company: Option<u64>,
    employee: Option<u64>,
    amount: Option<u128>,
    destination: Option<u64>,
    detail: String,
}

impl From<&EventRecord> for EventRow {
    fn from(record: &EventRecord) -> Self {
        let event = &record.event;
        let (amount, destination, detail) = match event {
            PayrollEvent::CompanyRegistered { owner, fee, .. } => {
                (Some(*fee), None, owner.to_string())
            }
            PayrollEvent::CompanyStatusChanged { active, .. } => {
                (None, None, if *active { "active" } else { "inactive" }.to_string())
            }
            PayrollEvent::CompanyDeleted {
                removed_employees, ..
            } => (
                None,
                None,
                removed_employees
                    .iter()
                    .map(u64::to_string)
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            PayrollEvent::CompanyOwnershipTransferred {
                previous_owner,
                new_owner,
                ..
            } => (None, None, format!("{}->{}", previous_owner, new_owner)),
            PayrollEvent::EmployeeAdded {
                destination,
                amount,
                ..
            }
            | PayrollEvent::EmployeeUpdated {
                destination,
                amount,
                ..
            }
            | PayrollEvent::LocalSettled {
                destination,
                amount,
                ..
            } => (Some(*amount), Some(destination.0), String::new()),
            PayrollEvent::EmployeeDeactivated { by_admin, .. } => (
                None,
                None,
                if *by_admin { "admin" } else { "owner" }.to_string(),
            ),
            PayrollEvent::DestinationAllowed { destination }
            | PayrollEvent::DestinationDisallowed { destination } => {
                (None, Some(destination.0), String::new())
            }
            PayrollEvent::PaymentDeferred {
                amount,
                destination,
                reason,
                ..
            } => (Some(*amount), Some(destination.0), reason.to_string()),
            PayrollEvent::BridgeSubmitted {
                amount,
                destination,
                handle,
                ..
            } => (Some(*amount), Some(destination.0), handle.to_string()),
            PayrollEvent::EscrowStranded {
                amount,
                destination,
                error,
                ..
            } => (Some(*amount), Some(destination.0), error.clone()),
        };

        Self {
            seq: record.sequence,
            at: record.recorded_at,
            kind: event.kind(),
            company: event.company_id(),
            employee: event.employee_id(),
            amount,
            destination,
            detail,
        }
    }
}

/// Writes the event log as CSV, one row per record, header first.
pub struct EventWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> EventWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_events<'r>(&mut self, records: impl IntoIterator<Item = &'r EventRecord>) -> Result<()> {
        for record in records {
            self.writer.serialize(EventRow::from(record))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
