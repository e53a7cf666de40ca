use super::value::{Address, Amount, DestinationId, Timestamp};
use crate::error::{PayrollError, Result};
use serde::{Deserialize, Serialize};

/// A payee and their pay schedule.
///
/// `company_id` never changes after creation. `next_pay_date` moves forward
/// only when a payment settles locally or is handed to a bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: u64,
    pub company_id: u64,
    pub name: String,
    pub payout_address: Address,
    pub destination: DestinationId,
    pub salary: Amount,
    pub next_pay_date: Timestamp,
    pub active: bool,
    /// Set when a bridge rejected this employee's escrowed salary. The
    /// automatic trigger skips held employees until the owner pays manually.
    #[serde(default)]
    pub held: bool,
}

/// Owner-editable fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub payout_address: Option<Address>,
    pub destination: Option<DestinationId>,
    pub salary: Option<u128>,
    pub next_pay_date: Option<Timestamp>,
    pub active: Option<bool>,
}

impl Employee {
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.active && !self.held && self.next_pay_date <= now
    }

    pub fn ensure_active(&self) -> Result<()> {
        if self.active {
            Ok(())
        } else {
            Err(PayrollError::EmployeeInactive(self.id))
        }
    }

    pub fn ensure_belongs_to(&self, company_id: u64) -> Result<()> {
        if self.company_id == company_id {
            Ok(())
        } else {
            Err(PayrollError::OwnershipMismatch {
                company: company_id,
                employee: self.id,
            })
        }
    }

    /// Moves the schedule one interval past the previous pay date.
    pub fn advance_schedule(&mut self, interval: u64) -> Result<()> {
        self.next_pay_date = self.next_pay_date.checked_add(interval).ok_or_else(|| {
            PayrollError::InvariantViolation(format!(
                "pay date overflow for employee {}",
                self.id
            ))
        })?;
        Ok(())
    }

    /// Applies an update after validating every supplied field.
    ///
    /// Either all fields are applied or none are.
    pub fn apply(&mut self, update: EmployeeUpdate) -> Result<()> {
        if let Some(address) = &update.payout_address
            && address.is_zero()
        {
            return Err(PayrollError::ZeroAddress);
        }
        let salary = update.salary.map(Amount::new).transpose()?;

        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(address) = update.payout_address {
            self.payout_address = address;
        }
        if let Some(destination) = update.destination {
            self.destination = destination;
        }
        if let Some(salary) = salary {
            self.salary = salary;
        }
        if let Some(next_pay_date) = update.next_pay_date {
            self.next_pay_date = next_pay_date;
        }
        if let Some(active) = update.active {
            self.active = active;
        }
        Ok(())
    }
}
