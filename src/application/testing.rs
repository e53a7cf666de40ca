//! Shared fixtures for the application layer's unit tests.

use super::context::{PayrollContext, PayrollPorts};
use crate::config::OrchestratorConfig;
use crate::domain::ports::TokenLedger;
use crate::domain::value::{Address, Amount};
use crate::infrastructure::bridge::BurnMintBridge;
use crate::infrastructure::clock::ManualClock;
use crate::infrastructure::in_memory::{
    InMemoryCompanyStore, InMemoryCursorStore, InMemoryEmployeeStore, InMemoryEventLog,
};
use crate::infrastructure::ledger::InMemoryTokenLedger;
use std::sync::Arc;

pub(crate) const START: u64 = 1_000_000;

pub(crate) struct Harness {
    pub ctx: PayrollContext,
    pub ledger: InMemoryTokenLedger,
    pub clock: ManualClock,
    pub bridge: BurnMintBridge,
}

impl Harness {
    pub fn new(config: OrchestratorConfig) -> Self {
        let ledger = InMemoryTokenLedger::new();
        let clock = ManualClock::new(START);
        let bridge = BurnMintBridge::new(ledger.clone(), Address::new("emitter"), config.bridge_fee);
        let ports = PayrollPorts {
            companies: Box::new(InMemoryCompanyStore::new()),
            employees: Box::new(InMemoryEmployeeStore::new()),
            cursor: Box::new(InMemoryCursorStore::new()),
            events: Box::new(InMemoryEventLog::new()),
            ledger: Arc::new(ledger.clone()),
            bridge: Box::new(bridge.clone()),
            clock: Arc::new(clock.clone()),
        };
        let ctx = PayrollContext::new(config, ports).expect("valid test config");
        Self {
            ctx,
            ledger,
            clock,
            bridge,
        }
    }
}

/// Mints `balance` to `owner` and approves `allowance` to the orchestrator.
pub(crate) async fn fund(h: &Harness, owner: &Address, balance: u128, allowance: u128) {
    if balance > 0 {
        h.ledger
            .mint(owner, Amount::new(balance).unwrap())
            .await
            .unwrap();
    }
    h.ledger
        .approve(owner, &h.ctx.config.orchestrator, allowance)
        .await
        .unwrap();
}
