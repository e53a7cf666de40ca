use crate::config::OrchestratorConfig;
use crate::domain::event::PayrollEvent;
use crate::domain::ports::{
    BridgeAdapterBox, ClockRef, CompanyStoreBox, CursorStoreBox, EmployeeStoreBox, EventLogBox,
    TokenLedgerRef,
};
use crate::domain::value::{Address, DestinationId, Timestamp};
use crate::error::{PayrollError, Result};
use std::collections::BTreeSet;
use tokio::sync::RwLock;

/// The adapters one orchestrator instance runs on.
pub struct PayrollPorts {
    pub companies: CompanyStoreBox,
    pub employees: EmployeeStoreBox,
    pub cursor: CursorStoreBox,
    pub events: EventLogBox,
    pub ledger: TokenLedgerRef,
    pub bridge: BridgeAdapterBox,
    pub clock: ClockRef,
}

/// Explicit store object shared by the registry, scanner and dispatcher.
pub struct PayrollContext {
    pub config: OrchestratorConfig,
    pub companies: CompanyStoreBox,
    pub employees: EmployeeStoreBox,
    pub cursor: CursorStoreBox,
    pub events: EventLogBox,
    pub ledger: TokenLedgerRef,
    pub bridge: BridgeAdapterBox,
    pub clock: ClockRef,
    allowed: RwLock<BTreeSet<DestinationId>>,
}

impl PayrollContext {
    pub fn new(config: OrchestratorConfig, ports: PayrollPorts) -> Result<Self> {
        if config.admin.is_zero() || config.orchestrator.is_zero() || config.fee_collector.is_zero()
        {
            return Err(PayrollError::ZeroAddress);
        }
        if config.pay_interval == 0 {
            return Err(PayrollError::InvariantViolation(
                "pay interval must be positive".to_string(),
            ));
        }
        let allowed = config.allowed_destinations.iter().copied().collect();
        Ok(Self {
            config,
            companies: ports.companies,
            employees: ports.employees,
            cursor: ports.cursor,
            events: ports.events,
            ledger: ports.ledger,
            bridge: ports.bridge,
            clock: ports.clock,
            allowed: RwLock::new(allowed),
        })
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn is_local(&self, destination: DestinationId) -> bool {
        destination == self.config.local_destination
    }

    /// The same-chain sentinel is always payable.
    pub async fn is_destination_allowed(&self, destination: DestinationId) -> bool {
        self.is_local(destination) || self.allowed.read().await.contains(&destination)
    }

    pub async fn ensure_destination_allowed(&self, destination: DestinationId) -> Result<()> {
        if self.is_destination_allowed(destination).await {
            Ok(())
        } else {
            Err(PayrollError::ChainNotAllowed(destination))
        }
    }

    pub async fn allow_destination(&self, destination: DestinationId) -> bool {
        self.allowed.write().await.insert(destination)
    }

    pub async fn disallow_destination(&self, destination: DestinationId) -> bool {
        self.allowed.write().await.remove(&destination)
    }

    pub async fn allowed_destinations(&self) -> Vec<DestinationId> {
        self.allowed.read().await.iter().copied().collect()
    }

    pub fn ensure_admin(&self, caller: &Address) -> Result<()> {
        if caller == &self.config.admin {
            Ok(())
        } else {
            Err(PayrollError::NotOwner)
        }
    }

    pub async fn record(&self, event: PayrollEvent) -> Result<u64> {
        self.events.append(self.now(), event).await
    }
}
