use crate::domain::ports::TokenLedger;
use crate::domain::value::{Address, Amount};
use crate::error::Result;

/// Preflight check run before any balance-moving call.
///
/// Only the allowance is inspected. A payer that approved enough but holds
/// too little is caught later by the transfer itself.
pub struct AllowanceGate<'a> {
    ledger: &'a dyn TokenLedger,
    spender: &'a Address,
}

impl<'a> AllowanceGate<'a> {
    pub fn new(ledger: &'a dyn TokenLedger, spender: &'a Address) -> Self {
        Self { ledger, spender }
    }

    pub async fn check_allowance(&self, payer: &Address, amount: Amount) -> Result<bool> {
        let allowance = self.ledger.allowance(payer, self.spender).await?;
        Ok(allowance >= amount.value())
    }
}
