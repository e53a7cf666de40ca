use super::company::Company;
use super::employee::Employee;
use super::event::{EventRecord, PayrollEvent};
use super::payment::{BridgeTransfer, ScanCursor, TrackingHandle};
use super::value::{Address, Amount, Timestamp};
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CompanyStore: Send + Sync {
    async fn store(&self, company: Company) -> Result<()>;
    async fn get(&self, company_id: u64) -> Result<Option<Company>>;
    async fn get_by_owner(&self, owner: &Address) -> Result<Option<Company>>;
    async fn remove(&self, company_id: u64) -> Result<Option<Company>>;
    /// All companies in ascending id order, which is registration order.
    async fn all(&self) -> Result<Vec<Company>>;
    async fn next_id(&self) -> Result<u64>;
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn store(&self, employee: Employee) -> Result<()>;
    async fn get(&self, employee_id: u64) -> Result<Option<Employee>>;
    async fn remove(&self, employee_id: u64) -> Result<Option<Employee>>;
    async fn next_id(&self) -> Result<u64>;
}

#[async_trait]
pub trait CursorStore: Send + Sync {
    async fn load(&self) -> Result<ScanCursor>;
    async fn save(&self, cursor: ScanCursor) -> Result<()>;
}

/// Append-only audit log consumed by history views.
#[async_trait]
pub trait EventLog: Send + Sync {
    async fn append(&self, recorded_at: Timestamp, event: PayrollEvent) -> Result<u64>;
    async fn all(&self) -> Result<Vec<EventRecord>>;
}

/// The fungible token salaries are paid in.
#[async_trait]
pub trait TokenLedger: Send + Sync {
    async fn balance_of(&self, holder: &Address) -> Result<u128>;
    async fn allowance(&self, owner: &Address, spender: &Address) -> Result<u128>;
    async fn approve(&self, owner: &Address, spender: &Address, amount: u128) -> Result<()>;
    /// Moves `amount` from `from` to `to`, spending `spender`'s allowance.
    async fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()>;
}

/// External cross-network transfer capability.
///
/// Submissions are not idempotent: every call is a new transfer attempt.
/// A successful return only means the bridge accepted the transfer.
#[async_trait]
pub trait BridgeAdapter: Send + Sync {
    fn name(&self) -> &'static str;
    /// Address that must be approved to pull funds from the source.
    fn spender(&self) -> Address;
    async fn quote_fee(&self, transfer: &BridgeTransfer) -> Result<u128>;
    async fn submit(&self, transfer: BridgeTransfer, fee: u128) -> Result<TrackingHandle>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

pub type CompanyStoreBox = Box<dyn CompanyStore>;
pub type EmployeeStoreBox = Box<dyn EmployeeStore>;
pub type CursorStoreBox = Box<dyn CursorStore>;
pub type EventLogBox = Box<dyn EventLog>;
pub type TokenLedgerRef = std::sync::Arc<dyn TokenLedger>;
pub type BridgeAdapterBox = Box<dyn BridgeAdapter>;
pub type ClockRef = std::sync::Arc<dyn Clock>;
