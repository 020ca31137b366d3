// Path: crates/types/src/error/mod.rs
//! Core error types for the DEIP chain core.
//!
//! The taxonomy follows the stage at which a defect is detected:
//! static validation, authority coverage, evaluation against ledger state,
//! object store constraints and observer delivery. Lower layers convert into
//! higher ones through `From` so `?` carries an error to the undo-session
//! boundary that owns it.

use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// A static, state-free defect in an operation's own fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// An account name does not satisfy the naming rules.
    #[error("Account name '{name}' is invalid: {reason}")]
    InvalidAccountName {
        /// The offending name.
        name: String,
        /// Which rule was broken.
        reason: &'static str,
    },
    /// A fixed-width hexadecimal string has the wrong length.
    #[error("'{field}' must be a {bits}-bit hexadecimal string of {expected} characters, got {actual}")]
    HexWidth {
        /// The field being validated.
        field: &'static str,
        /// The required width in bits.
        bits: u16,
        /// The required number of characters.
        expected: usize,
        /// The number of characters provided.
        actual: usize,
    },
    /// A fixed-width hexadecimal string contains characters outside `[0-9a-f]`.
    #[error("'{field}' must contain only lowercase hexadecimal characters")]
    HexCharset {
        /// The field being validated.
        field: &'static str,
    },
    /// A value-level rule on one or more fields was violated.
    #[error("{0}")]
    Constraint(String),
}

impl ErrorCode for ValidationError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidAccountName { .. } => "VALIDATION_INVALID_ACCOUNT_NAME",
            Self::HexWidth { .. } => "VALIDATION_HEX_WIDTH",
            Self::HexCharset { .. } => "VALIDATION_HEX_CHARSET",
            Self::Constraint(_) => "VALIDATION_CONSTRAINT",
        }
    }
}

/// The signature set of a transaction does not cover a required authority.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorityError {
    /// Active (or stronger) authority of an account is missing.
    #[error("Missing active authority of '{0}'")]
    MissingActive(String),
    /// Owner authority of an account is missing.
    #[error("Missing owner authority of '{0}'")]
    MissingOwner(String),
    /// A required key signature is missing.
    #[error("Missing signature of key '{0}'")]
    MissingKey(String),
}

impl ErrorCode for AuthorityError {
    fn code(&self) -> &'static str {
        match self {
            Self::MissingActive(_) => "AUTHORITY_MISSING_ACTIVE",
            Self::MissingOwner(_) => "AUTHORITY_MISSING_OWNER",
            Self::MissingKey(_) => "AUTHORITY_MISSING_KEY",
        }
    }
}

/// Errors raised by the object store and its undo journal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record exists for the requested key.
    #[error("{table} record not found for {key}")]
    NotFound {
        /// The record kind.
        table: &'static str,
        /// The key that was looked up, rendered for diagnostics.
        key: String,
    },
    /// A unique secondary index already holds the key.
    #[error("Duplicate key in {table}.{index}: {key}")]
    DuplicateKey {
        /// The record kind.
        table: &'static str,
        /// The unique index that collided.
        index: &'static str,
        /// The colliding key, rendered for diagnostics.
        key: String,
    },
    /// A mutation broke a store-level constraint.
    #[error("Invariant violation in {table}: {reason}")]
    InvariantViolation {
        /// The record kind.
        table: &'static str,
        /// What went wrong.
        reason: String,
    },
    /// A stored value could not be decoded.
    #[error("Failed to decode stored value: {0}")]
    Decode(String),
    /// An index entry points at a record that does not exist.
    #[error("Corrupted index {table}.{index}: {reason}")]
    CorruptIndex {
        /// The record kind.
        table: &'static str,
        /// The index that is inconsistent.
        index: &'static str,
        /// What is inconsistent.
        reason: String,
    },
    /// An undo session handle was released out of order.
    #[error("Undo session released out of order: expected depth {expected}, got {got}")]
    SessionOrder {
        /// The depth of the innermost open session.
        expected: usize,
        /// The depth recorded in the released handle.
        got: usize,
    },
    /// There is no retained session to undo.
    #[error("No undo session to pop")]
    NoUndoSession,
}

impl StoreError {
    /// Corruption of stored data cannot be recovered from by rolling back a
    /// transaction and must halt block processing.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::CorruptIndex { .. })
    }
}

impl ErrorCode for StoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "STORE_NOT_FOUND",
            Self::DuplicateKey { .. } => "STORE_DUPLICATE_KEY",
            Self::InvariantViolation { .. } => "STORE_INVARIANT_VIOLATION",
            Self::Decode(_) => "STORE_DECODE_ERROR",
            Self::CorruptIndex { .. } => "STORE_CORRUPT_INDEX",
            Self::SessionOrder { .. } => "STORE_SESSION_ORDER",
            Self::NoUndoSession => "STORE_NO_UNDO_SESSION",
        }
    }
}

/// A dynamic precondition violated given the current ledger state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// An object store constraint failed underneath a facade.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A state-dependent rule of the operation was not satisfied.
    #[error("{0}")]
    Precondition(String),
    /// An account does not hold enough of an asset.
    #[error("Account '{account}' has insufficient balance: {available} available, {required} required")]
    InsufficientBalance {
        /// The account being debited.
        account: String,
        /// The balance held, formatted with its symbol.
        available: String,
        /// The amount requested, formatted with its symbol.
        required: String,
    },
    /// A custom operation names an interpreter that is not registered.
    #[error("No interpreter is registered for custom operation '{0}'")]
    UnknownCustomOperation(String),
    /// A registered custom interpreter rejected its payload.
    #[error("Custom operation '{id}' failed: {reason}")]
    Interpreter {
        /// The custom operation identifier.
        id: String,
        /// The interpreter's failure message.
        reason: String,
    },
    /// A nested operation (inside a proposal) failed static validation.
    #[error("Nested operation is invalid: {0}")]
    Validation(#[from] ValidationError),
    /// The operation kind has no evaluator; it is only ever synthesized by the core.
    #[error("Operation '{0}' cannot be evaluated")]
    NotEvaluable(&'static str),
}

impl EvaluationError {
    /// Whether this failure must halt block processing instead of
    /// rejecting only the enclosing transaction.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Store(e) => e.is_fatal(),
            Self::NotEvaluable(_) => true,
            _ => false,
        }
    }
}

impl ErrorCode for EvaluationError {
    fn code(&self) -> &'static str {
        match self {
            Self::Store(e) => e.code(),
            Self::Precondition(_) => "EVAL_PRECONDITION_FAILED",
            Self::InsufficientBalance { .. } => "EVAL_INSUFFICIENT_BALANCE",
            Self::UnknownCustomOperation(_) => "EVAL_UNKNOWN_CUSTOM_OPERATION",
            Self::Interpreter { .. } => "EVAL_INTERPRETER_FAILED",
            Self::Validation(_) => "EVAL_NESTED_VALIDATION",
            Self::NotEvaluable(_) => "EVAL_NOT_EVALUABLE",
        }
    }
}

/// A failure inside a notification subscriber. Reported, never rolled back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Observer '{observer}' failed: {reason}")]
pub struct ObserverError {
    /// The subscriber's registered name.
    pub observer: String,
    /// The failure message.
    pub reason: String,
}

impl ErrorCode for ObserverError {
    fn code(&self) -> &'static str {
        "OBSERVER_FAILED"
    }
}

/// A custom operation interpreter could not apply a payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct InterpreterError(pub String);

/// Errors that reject a whole transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// The transaction carries no operations.
    #[error("Transaction must contain at least one operation")]
    Empty,
    /// A user submitted an operation the core only synthesizes.
    #[error("Operation {index} is virtual and cannot be submitted")]
    VirtualOperation {
        /// Position of the operation in the transaction.
        index: usize,
    },
    /// An operation failed static validation.
    #[error("Operation {index} is invalid: {source}")]
    Validation {
        /// Position of the operation in the transaction.
        index: usize,
        /// The validation failure.
        #[source]
        source: ValidationError,
    },
    /// Required authorities are not covered by the signatures.
    #[error("Authority check failed: {0}")]
    Authority(#[from] AuthorityError),
    /// The transaction expired before it could be included.
    #[error("Transaction expired at {expiration}, head block time is {now}")]
    Expired {
        /// The transaction's expiration, seconds since epoch.
        expiration: u32,
        /// The head block time, seconds since epoch.
        now: u32,
    },
    /// The expiration is further in the future than the chain allows.
    #[error("Transaction expiration {expiration} exceeds the maximum of {max}")]
    ExpirationTooFar {
        /// The transaction's expiration, seconds since epoch.
        expiration: u32,
        /// The latest acceptable expiration, seconds since epoch.
        max: u32,
    },
    /// The same transaction was already applied.
    #[error("Duplicate transaction {0}")]
    Duplicate(String),
    /// The reference block does not match a recent block on this chain.
    #[error("Transaction references unknown block {ref_block_num} with prefix {ref_block_prefix}")]
    Tapos {
        /// Low 16 bits of the referenced block number.
        ref_block_num: u16,
        /// Second 32-bit word of the referenced block id.
        ref_block_prefix: u32,
    },
    /// An operation failed against ledger state.
    #[error("Operation {index} failed: {source}")]
    Evaluation {
        /// Position of the operation in the transaction.
        index: usize,
        /// The evaluation failure.
        #[source]
        source: EvaluationError,
    },
}

impl ErrorCode for TransactionError {
    fn code(&self) -> &'static str {
        match self {
            Self::Empty => "TX_EMPTY",
            Self::VirtualOperation { .. } => "TX_VIRTUAL_OPERATION",
            Self::Validation { .. } => "TX_INVALID",
            Self::Authority(_) => "TX_AUTHORITY",
            Self::Expired { .. } => "TX_EXPIRED",
            Self::ExpirationTooFar { .. } => "TX_EXPIRATION_TOO_FAR",
            Self::Duplicate(_) => "TX_DUPLICATE",
            Self::Tapos { .. } => "TX_TAPOS",
            Self::Evaluation { .. } => "TX_EVALUATION_FAILED",
        }
    }
}

/// Errors that reject a block.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockError {
    /// The block does not link to the current head.
    #[error("Block does not link to head. Expected previous {expected}, got {got}")]
    Unlinkable {
        /// The current head block id.
        expected: String,
        /// The block's `previous` field.
        got: String,
    },
    /// The block timestamp does not advance past the head.
    #[error("Block timestamp {got} must be after head block time {head}")]
    InvalidTimestamp {
        /// The head block time.
        head: u32,
        /// The block's timestamp.
        got: u32,
    },
    /// The header's merkle root does not match its transactions.
    #[error("Merkle check failed. Header has {expected}, computed {computed}")]
    MerkleMismatch {
        /// The root claimed by the header.
        expected: String,
        /// The root computed from the transaction ids.
        computed: String,
    },
    /// A transaction inside the block was rejected.
    #[error("Transaction {index} in block failed: {source}")]
    TransactionFailed {
        /// Position of the transaction in the block.
        index: usize,
        /// Why it was rejected.
        #[source]
        source: TransactionError,
    },
    /// There is no applied block that can still be undone.
    #[error("No reversible block to pop")]
    NothingToPop,
}

impl ErrorCode for BlockError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unlinkable { .. } => "BLOCK_UNLINKABLE",
            Self::InvalidTimestamp { .. } => "BLOCK_INVALID_TIMESTAMP",
            Self::MerkleMismatch { .. } => "BLOCK_MERKLE_MISMATCH",
            Self::TransactionFailed { .. } => "BLOCK_TRANSACTION_FAILED",
            Self::NothingToPop => "BLOCK_NOTHING_TO_POP",
        }
    }
}

/// Top-level errors surfaced by the chain pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// A transaction was rejected.
    #[error("Transaction rejected: {0}")]
    Transaction(#[from] TransactionError),
    /// A block was rejected.
    #[error("Block rejected: {0}")]
    Block(#[from] BlockError),
    /// Block-boundary processing failed against ledger state.
    #[error("Block processing failed: {0}")]
    Evaluation(#[from] EvaluationError),
    /// A store operation outside any evaluator failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    /// Ledger determinism cannot be guaranteed; block processing must halt.
    #[error("Fatal: {0}")]
    Fatal(String),
}

impl ErrorCode for ChainError {
    fn code(&self) -> &'static str {
        match self {
            Self::Transaction(e) => e.code(),
            Self::Block(e) => e.code(),
            Self::Evaluation(e) => e.code(),
            Self::Store(e) => e.code(),
            Self::Fatal(_) => "CHAIN_FATAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_wrap_into_evaluation_errors() {
        let err: EvaluationError = StoreError::DuplicateKey {
            table: "assessment",
            index: "by_external_id",
            key: "ab".into(),
        }
        .into();
        assert_eq!(err.code(), "STORE_DUPLICATE_KEY");
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "Duplicate key in assessment.by_external_id: ab");
    }

    #[test]
    fn corruption_is_fatal() {
        let err = EvaluationError::Store(StoreError::CorruptIndex {
            table: "account",
            index: "by_name",
            reason: "dangling id 4".into(),
        });
        assert!(err.is_fatal());
        assert!(EvaluationError::NotEvaluable("producer_reward").is_fatal());
        assert!(!EvaluationError::Precondition("nope".into()).is_fatal());
    }

    #[test]
    fn nested_codes_surface_through_chain_error() {
        let err = ChainError::from(TransactionError::Evaluation {
            index: 0,
            source: EvaluationError::UnknownCustomOperation("follow".into()),
        });
        assert_eq!(err.code(), "TX_EVALUATION_FAILED");
        let err = ChainError::from(BlockError::NothingToPop);
        assert_eq!(err.code(), "BLOCK_NOTHING_TO_POP");
    }
}
