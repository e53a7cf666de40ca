use crate::domain::ports::TokenLedger;
use crate::domain::value::{Address, Amount, Balance};
use crate::error::{PayrollError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct LedgerState {
    balances: HashMap<Address, Balance>,
    allowances: HashMap<(Address, Address), u128>,
    supply: u128,
}

impl LedgerState {
    fn move_funds(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<()> {
        if to.is_zero() {
            return Err(PayrollError::ZeroAddress);
        }
        self.balances
            .entry(from.clone())
            .or_default()
            .debit(amount)?;
        self.balances.entry(to.clone()).or_default().credit(amount)
    }
}

/// Simulated fungible token with ERC-20 style allowances.
///
/// Every operation takes the write lock once, so a failed transfer leaves
/// both balances and allowances untouched.
#[derive(Default, Clone)]
pub struct InMemoryTokenLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn mint(&self, to: &Address, amount: Amount) -> Result<()> {
        let mut state = self.state.write().await;
        // A balance never exceeds the supply, so a checked supply covers it.
        let supply = state
            .supply
            .checked_add(amount.value())
            .ok_or_else(|| PayrollError::InvariantViolation("token supply overflow".to_string()))?;
        state.balances.entry(to.clone()).or_default().credit(amount)?;
        state.supply = supply;
        Ok(())
    }

    /// Destroys tokens held by `from`.
    pub async fn burn(&self, from: &Address, amount: Amount) -> Result<()> {
        let mut state = self.state.write().await;
        let supply = state
            .supply
            .checked_sub(amount.value())
            .ok_or_else(|| PayrollError::InvariantViolation("burn exceeds token supply".to_string()))?;
        state.balances.entry(from.clone()).or_default().debit(amount)?;
        state.supply = supply;
        Ok(())
    }

    pub async fn total_supply(&self) -> u128 {
        self.state.read().await.supply
    }
}

#[async_trait]
impl TokenLedger for InMemoryTokenLedger {
    async fn balance_of(&self, holder: &Address) -> Result<u128> {
        let state = self.state.read().await;
        Ok(state.balances.get(holder).map(|b| b.0).unwrap_or(0))
    }

    async fn allowance(&self, owner: &Address, spender: &Address) -> Result<u128> {
        let state = self.state.read().await;
        Ok(state
            .allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0))
    }

    async fn approve(&self, owner: &Address, spender: &Address, amount: u128) -> Result<()> {
        if spender.is_zero() {
            return Err(PayrollError::ZeroAddress);
        }
        let mut state = self.state.write().await;
        state
            .allowances
            .insert((owner.clone(), spender.clone()), amount);
        Ok(())
    }

    async fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        let key = (from.clone(), spender.clone());
        let available = state.allowances.get(&key).copied().unwrap_or(0);
        if available < amount.value() {
            return Err(PayrollError::InsufficientAllowance {
                required: amount.value(),
                available,
            });
        }
        state.move_funds(from, to, amount)?;
        state.allowances.insert(key, available - amount.value());
        Ok(())
    }
}
