use crate::domain::value::DestinationId;
use thiserror::Error;

/// Every rejection the orchestrator can produce.
///
/// Each variant maps to one actionable condition so a caller can tell
/// "approve more funds" apart from "not your company".
#[derive(Error, Debug)]
pub enum PayrollError {
    // Authorization
    #[error("caller is not the admin")]
    NotOwner,
    #[error("caller does not own a company")]
    NotCompanyOwner,
    #[error("employee {employee} does not belong to company {company}")]
    OwnershipMismatch { company: u64, employee: u64 },
    #[error("caller already owns company {0}")]
    DuplicateOwner(u64),
    #[error("fee allowance {available} is below the registration fee {required}")]
    InsufficientAuthorization { required: u128, available: u128 },

    // Validation
    #[error("address must not be zero")]
    ZeroAddress,
    #[error("amount must be positive")]
    InvalidAmount,
    #[error("destination {0} is not allowed")]
    ChainNotAllowed(DestinationId),
    #[error("company {0} is inactive")]
    CompanyInactive(u64),
    #[error("employee {0} is inactive")]
    EmployeeInactive(u64),
    #[error("company {0} not found")]
    CompanyNotFound(u64),
    #[error("employee {0} not found")]
    EmployeeNotFound(u64),
    #[error("dispatch token for employee {0} is stale")]
    StaleDispatch(u64),

    // Resources
    #[error("allowance {available} is below {required}")]
    InsufficientAllowance { required: u128, available: u128 },
    #[error("balance {available} is below {required}")]
    InsufficientBalance { required: u128, available: u128 },
    #[error("bridge fee {supplied} is below the quoted {required}")]
    InsufficientFee { required: u128, supplied: u128 },

    // External dependencies
    #[error("bridge submission failed: {0}")]
    BridgeSubmit(String),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Internal error: {0}")]
    InternalError(#[from] Box<dyn std::error::Error + Send + Sync>),
    #[error("Command error: {0}")]
    CommandError(String),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for PayrollError {
    fn from(err: rocksdb::Error) -> Self {
        PayrollError::InternalError(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, PayrollError>;
