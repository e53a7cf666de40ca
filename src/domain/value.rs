use crate::error::{PayrollError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Seconds since the Unix epoch.
pub type Timestamp = u64;

/// An opaque identity or payout address.
///
/// Callers, payees, the escrow and bridge spenders are all addressed the
/// same way. A zero address is one that is empty or consists solely of `0`
/// characters, with or without a `0x` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Builds an address, rejecting the zero address.
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let address = Self::new(value);
        if address.is_zero() {
            Err(PayrollError::ZeroAddress)
        } else {
            Ok(address)
        }
    }

    pub fn is_zero(&self) -> bool {
        let digits = self.0.strip_prefix("0x").unwrap_or(&self.0);
        digits.chars().all(|c| c == '0')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A strictly positive token amount in the smallest currency unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u128", into = "u128")]
pub struct Amount(u128);

impl Amount {
    pub fn new(value: u128) -> Result<Self> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(PayrollError::InvalidAmount)
        }
    }

    pub fn value(&self) -> u128 {
        self.0
    }
}

impl TryFrom<u128> for Amount {
    type Error = PayrollError;

    fn try_from(value: u128) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for u128 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A non-negative token balance.
///
/// Arithmetic is checked: a debit that would go below zero is reported as
/// `InsufficientBalance` rather than wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Balance(pub u128);

impl Balance {
    pub const ZERO: Self = Self(0);

    pub fn credit(&mut self, amount: Amount) -> Result<()> {
        self.0 = self
            .0
            .checked_add(amount.value())
            .ok_or_else(|| PayrollError::InvariantViolation("balance overflow".to_string()))?;
        Ok(())
    }

    pub fn debit(&mut self, amount: Amount) -> Result<()> {
        if self.0 >= amount.value() {
            self.0 -= amount.value();
            Ok(())
        } else {
            Err(PayrollError::InsufficientBalance {
                required: amount.value(),
                available: self.0,
            })
        }
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.value())
    }
}

/// Identifier of the network a payment settles on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DestinationId(pub u64);

impl fmt::Display for DestinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
