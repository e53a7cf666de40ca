use crate::domain::value::{Address, DestinationId};
use crate::error::Result;
use serde::Deserialize;
use std::path::Path;

pub const THIRTY_DAYS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BridgeKind {
    BurnMint,
    LockMint,
}

/// Process-wide settings of one orchestrator instance.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Identity allowed to run admin operations.
    pub admin: Address,
    /// The orchestrator's own holding; doubles as escrow for cross-chain pay.
    pub orchestrator: Address,
    /// Receives registration fees.
    pub fee_collector: Address,
    pub registration_fee: u128,
    /// Seconds between two payments of one employee.
    pub pay_interval: u64,
    /// Destination meaning "same network as the orchestrator".
    pub local_destination: DestinationId,
    pub allowed_destinations: Vec<DestinationId>,
    pub bridge: BridgeKind,
    pub bridge_fee: u128,
    /// Fee the automatic trigger can put towards a bridge submission.
    pub automation_fee: u128,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            admin: Address::new("admin"),
            orchestrator: Address::new("orchestrator"),
            fee_collector: Address::new("treasury"),
            registration_fee: 0,
            pay_interval: THIRTY_DAYS,
            local_destination: DestinationId(0),
            allowed_destinations: Vec::new(),
            bridge: BridgeKind::BurnMint,
            bridge_fee: 0,
            automation_fee: 0,
        }
    }
}

impl OrchestratorConfig {
    /// Reads a JSON config file; absent keys fall back to the defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
