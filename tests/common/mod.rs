#![allow(dead_code)]

use payrail::application::context::PayrollPorts;
use payrail::application::engine::PayrollEngine;
use payrail::config::OrchestratorConfig;
use payrail::domain::ports::TokenLedger;
use payrail::domain::value::{Address, Amount, DestinationId};
use payrail::infrastructure::bridge::BurnMintBridge;
use payrail::infrastructure::clock::ManualClock;
use payrail::infrastructure::in_memory::{
    InMemoryCompanyStore, InMemoryCursorStore, InMemoryEmployeeStore, InMemoryEventLog,
};
use payrail::infrastructure::ledger::InMemoryTokenLedger;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

pub const INTERVAL: u64 = 100;
pub const REMOTE: DestinationId = DestinationId(30);

pub struct Setup {
    pub engine: PayrollEngine,
    pub ledger: InMemoryTokenLedger,
    pub clock: ManualClock,
    pub bridge: BurnMintBridge,
}

pub fn config() -> OrchestratorConfig {
    OrchestratorConfig {
        pay_interval: INTERVAL,
        allowed_destinations: vec![REMOTE],
        ..Default::default()
    }
}

pub fn setup(config: OrchestratorConfig) -> Setup {
    let ledger = InMemoryTokenLedger::new();
    let clock = ManualClock::new(0);
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
    Setup {
        engine: PayrollEngine::new(config, ports).unwrap(),
        ledger,
        clock,
        bridge,
    }
}

/// Registers a company for `owner`, funded and approved for `funds`.
pub async fn company(s: &Setup, owner: &str, funds: u128) -> Address {
    let owner = Address::new(owner);
    if funds > 0 {
        s.ledger.mint(&owner, Amount::new(funds).unwrap()).await.unwrap();
    }
    s.ledger
        .approve(&owner, &s.engine.config().orchestrator, funds)
        .await
        .unwrap();
    s.engine.register_company(&owner, "Co").await.unwrap();
    owner
}

pub async fn employee(
    s: &Setup,
    owner: &Address,
    payee: &str,
    destination: DestinationId,
    salary: u128,
) -> u64 {
    s.engine
        .add_employee(owner, payee, Address::new(payee), destination, salary)
        .await
        .unwrap()
        .id
}

pub async fn balance(s: &Setup, holder: &str) -> u128 {
    s.ledger.balance_of(&Address::new(holder)).await.unwrap()
}

/// Writes a command script with the standard header.
pub fn script(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "op,caller,target,name,address,destination,amount").unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file
}
