use crate::domain::payment::{BridgeTransfer, TrackingHandle};
use crate::domain::ports::{BridgeAdapter, TokenLedger};
use crate::domain::value::Address;
use crate::error::{PayrollError, Result};
use crate::infrastructure::ledger::InMemoryTokenLedger;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// A transfer a bridge accepted, kept for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedTransfer {
    pub handle: TrackingHandle,
    pub transfer: BridgeTransfer,
    pub fee: u128,
}

/// Fee and failure controls shared by the simulated bridges.
#[derive(Default)]
struct Submissions {
    fee: u128,
    fail_next: AtomicBool,
    accepted: RwLock<Vec<AcceptedTransfer>>,
}

impl Submissions {
    fn new(fee: u128) -> Self {
        Self {
            fee,
            ..Default::default()
        }
    }

    fn precheck(&self, bridge: &str, fee: u128) -> Result<()> {
        if fee < self.fee {
            return Err(PayrollError::InsufficientFee {
                required: self.fee,
                supplied: fee,
            });
        }
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(PayrollError::BridgeSubmit(format!(
                "{} rejected the transfer",
                bridge
            )));
        }
        Ok(())
    }

    async fn record(&self, handle: TrackingHandle, transfer: BridgeTransfer, fee: u128) {
        self.accepted.write().await.push(AcceptedTransfer {
            handle,
            transfer,
            fee,
        });
    }
}

/// Burn-and-mint bridge: pulls the amount from the source, burns it and
/// hands back a sequence number for the remote mint.
#[derive(Clone)]
pub struct BurnMintBridge {
    ledger: InMemoryTokenLedger,
    emitter: Address,
    sequence: Arc<AtomicU64>,
    submissions: Arc<Submissions>,
}

impl BurnMintBridge {
    pub fn new(ledger: InMemoryTokenLedger, emitter: Address, fee: u128) -> Self {
        Self {
            ledger,
            emitter,
            sequence: Arc::new(AtomicU64::new(0)),
            submissions: Arc::new(Submissions::new(fee)),
        }
    }

    /// Makes the next submission fail after fee checks.
    pub fn fail_next_submission(&self) {
        self.submissions.fail_next.store(true, Ordering::SeqCst);
    }

    pub async fn accepted(&self) -> Vec<AcceptedTransfer> {
        self.submissions.accepted.read().await.clone()
    }
}

#[async_trait]
impl BridgeAdapter for BurnMintBridge {
    fn name(&self) -> &'static str {
        "burn-mint"
    }

    fn spender(&self) -> Address {
        self.emitter.clone()
    }

    async fn quote_fee(&self, _transfer: &BridgeTransfer) -> Result<u128> {
        Ok(self.submissions.fee)
    }

    async fn submit(&self, transfer: BridgeTransfer, fee: u128) -> Result<TrackingHandle> {
        self.submissions.precheck(self.name(), fee)?;
        self.ledger
            .transfer_from(&self.emitter, &transfer.source, &self.emitter, transfer.amount)
            .await?;
        self.ledger.burn(&self.emitter, transfer.amount).await?;

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let handle = TrackingHandle::Sequence(sequence);
        debug!(%handle, destination = %transfer.destination, "burned for remote mint");
        self.submissions.record(handle.clone(), transfer, fee).await;
        Ok(handle)
    }
}

/// Lock-and-mint bridge: pulls the amount into a lock pool and identifies
/// the transfer by a message id derived from its contents.
#[derive(Clone)]
pub struct LockMintBridge {
    ledger: InMemoryTokenLedger,
    pool: Address,
    nonce: Arc<AtomicU64>,
    submissions: Arc<Submissions>,
}

impl LockMintBridge {
    pub fn new(ledger: InMemoryTokenLedger, pool: Address, fee: u128) -> Self {
        Self {
            ledger,
            pool,
            nonce: Arc::new(AtomicU64::new(0)),
            submissions: Arc::new(Submissions::new(fee)),
        }
    }

    pub fn fail_next_submission(&self) {
        self.submissions.fail_next.store(true, Ordering::SeqCst);
    }

    pub async fn accepted(&self) -> Vec<AcceptedTransfer> {
        self.submissions.accepted.read().await.clone()
    }

    fn message_id(nonce: u64, transfer: &BridgeTransfer) -> String {
        let mut hasher = Sha256::new();
        hasher.update(nonce.to_be_bytes());
        hasher.update(transfer.source.as_str().as_bytes());
        hasher.update(transfer.destination.0.to_be_bytes());
        hasher.update(transfer.recipient.as_str().as_bytes());
        hasher.update(transfer.amount.value().to_be_bytes());
        hasher.update(&transfer.payload);
        format!("0x{}", hex::encode(hasher.finalize()))
    }
}

#[async_trait]
impl BridgeAdapter for LockMintBridge {
    fn name(&self) -> &'static str {
        "lock-mint"
    }

    fn spender(&self) -> Address {
        self.pool.clone()
    }

    async fn quote_fee(&self, _transfer: &BridgeTransfer) -> Result<u128> {
        Ok(self.submissions.fee)
    }

    async fn submit(&self, transfer: BridgeTransfer, fee: u128) -> Result<TrackingHandle> {
        self.submissions.precheck(self.name(), fee)?;
        self.ledger
            .transfer_from(&self.pool, &transfer.source, &self.pool, transfer.amount)
            .await?;

        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        let handle = TrackingHandle::MessageId(Self::message_id(nonce, &transfer));
        debug!(%handle, destination = %transfer.destination, "locked for remote mint");
        self.submissions.record(handle.clone(), transfer, fee).await;
        Ok(handle)
    }
}
