//! Ledger error kinds.

use grid_world::PlaceRejection;

/// Errors raised by [`crate::CreditLedger`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The acting agent's balance is below the required cost.
    #[error("[LEDGER_INSUFFICIENT_CREDITS] balance {balance} is below required {required}")]
    InsufficientCredits {
        /// Current balance.
        balance: u64,
        /// Amount required.
        required: u64,
    },
    /// The candidate primitive overlapped existing geometry.
    #[error("[LEDGER_OVERLAP] candidate primitive overlaps existing geometry")]
    Overlap,
    /// The candidate primitive failed a non-overlap validity check.
    #[error("[LEDGER_INVALID] {0}")]
    Invalid(String),
    /// A transfer's `from` and `to` were the same account.
    #[error("[LEDGER_SELF_TRANSFER] cannot transfer to the same account")]
    SelfTransfer,
    /// A transfer amount was zero.
    #[error("[LEDGER_ZERO_AMOUNT] transfer amount must be at least 1")]
    ZeroAmount,
    /// The named account has never held a ledger balance.
    #[error("[LEDGER_UNKNOWN_ACCOUNT] {0} has no ledger account")]
    UnknownAccount(String),
}

impl From<PlaceRejection> for LedgerError {
    fn from(value: PlaceRejection) -> Self {
        match value {
            PlaceRejection::Overlap => LedgerError::Overlap,
            PlaceRejection::Invalid(reason) => LedgerError::Invalid(reason),
        }
    }
}
