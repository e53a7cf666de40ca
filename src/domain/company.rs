use super::value::{Address, Timestamp};
use crate::error::{PayrollError, Result};
use serde::{Deserialize, Serialize};

/// A paying organisation.
///
/// Exactly one company exists per owner identity. The employee list keeps
/// insertion order, which is the order the scanner walks it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: u64,
    pub owner: Address,
    pub name: String,
    pub active: bool,
    pub registered_at: Timestamp,
    pub employee_ids: Vec<u64>,
}

impl Company {
    pub fn new(id: u64, owner: Address, name: String, registered_at: Timestamp) -> Self {
        Self {
            id,
            owner,
            name,
            active: true,
            registered_at,
            employee_ids: Vec::new(),
        }
    }

    pub fn ensure_active(&self) -> Result<()> {
        if self.active {
            Ok(())
        } else {
            Err(PayrollError::CompanyInactive(self.id))
        }
    }

    pub fn push_employee(&mut self, employee_id: u64) {
        self.employee_ids.push(employee_id);
    }
}
