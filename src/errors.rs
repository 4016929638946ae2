use thiserror::Error;

/// Failure kinds for treasury operations.
///
/// Every operation either completes in full or returns one of these with no
/// state changed. `SpendingLimitExceeded` and `NotWhitelisted` are produced
/// only by the advisory policy evaluation; no engine operation raises them.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreasuryError {
    #[error("caller lacks the required role or the action is invalid for the current status")]
    NotAuthorized,

    #[error("signature count is below the treasury threshold")]
    InsufficientSignatures,

    #[error("proposal is still time locked")]
    TimeLockActive,

    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("treasury is frozen")]
    Frozen,

    #[error("threshold must satisfy 1 <= threshold <= signer count")]
    InvalidThreshold,

    #[error("signer has already signed this proposal")]
    DuplicateSignature,

    #[error("emergency cooldown has not elapsed")]
    CooldownActive,

    #[error("spend would exceed a spending limit for this category")]
    SpendingLimitExceeded,

    #[error("recipient is not on the whitelist for this category")]
    NotWhitelisted,

    #[error("treasury balance does not cover the requested amount")]
    InsufficientBalance,

    #[error("no entity is registered under the given id")]
    UnknownEntity,
}

/// Shorthand for results produced by treasury operations.
pub type TreasuryResult<T> = Result<T, TreasuryError>;
