//! Error types for the VeilRoute confidential batch router.
//!
//! All errors use the `VR_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Authorization errors
//! - 2xx: Lifecycle errors
//! - 3xx: Rate-limit errors
//! - 4xx: Decryption-integrity errors
//! - 5xx: Oracle boundary errors
//! - 9xx: General / internal errors
//!
//! Every failing operation aborts with no state change. Callers branch on
//! the variant (or on [`VeilrouteError::category`]), never on message text.

use std::fmt;

use thiserror::Error;

use crate::{AccountId, BatchId, RequestId};

/// Which kind of call was throttled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CooldownKind {
    /// `submit_encrypted_trade_request`.
    Submission,
    /// `request_decryption_for_batch`.
    DecryptionRequest,
}

impl fmt::Display for CooldownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submission => write!(f, "SUBMISSION"),
            Self::DecryptionRequest => write!(f, "DECRYPTION_REQUEST"),
        }
    }
}

/// Coarse error grouping, one per code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Authorization,
    Lifecycle,
    RateLimit,
    DecryptionIntegrity,
    Oracle,
    Internal,
}

/// Central error enum for all VeilRoute operations.
#[derive(Debug, Error)]
pub enum VeilrouteError {
    // =================================================================
    // Authorization Errors (1xx)
    // =================================================================
    /// The caller is not the current owner.
    #[error("VR_ERR_100: Caller {0} is not the owner")]
    NotOwner(AccountId),

    /// The caller does not hold the provider role.
    #[error("VR_ERR_101: Caller {0} is not a provider")]
    NotProvider(AccountId),

    /// Only the configured decryption oracle may deliver callbacks.
    #[error("VR_ERR_102: Caller {0} is not the decryption oracle")]
    NotOracle(AccountId),

    /// The zero account cannot be granted ownership or roles.
    #[error("VR_ERR_103: Zero account is not allowed")]
    ZeroAccount,

    // =================================================================
    // Lifecycle Errors (2xx)
    // =================================================================
    /// The router is paused.
    #[error("VR_ERR_200: Router is paused")]
    Paused,

    /// `unpause` was called while running.
    #[error("VR_ERR_201: Router is not paused")]
    NotPaused,

    /// A submission arrived while no batch is open.
    #[error("VR_ERR_202: Batch {0} is not open")]
    BatchNotOpen(BatchId),

    /// `open_batch` was called while a batch is already open.
    #[error("VR_ERR_203: Batch {0} is already open")]
    BatchAlreadyOpen(BatchId),

    /// `close_batch` was called while no batch is open.
    #[error("VR_ERR_204: Batch {0} is already closed")]
    BatchAlreadyClosed(BatchId),

    /// Decryption may only be requested for the current batch.
    #[error("VR_ERR_205: Invalid batch id: requested {requested}, current {current}")]
    InvalidBatchId { requested: BatchId, current: BatchId },

    // =================================================================
    // Rate-Limit Errors (3xx)
    // =================================================================
    /// The caller's cooldown window has not elapsed yet.
    #[error("VR_ERR_300: Cooldown active for {kind}: retry at {retry_at}")]
    CooldownActive { kind: CooldownKind, retry_at: u64 },

    // =================================================================
    // Decryption-Integrity Errors (4xx)
    // =================================================================
    /// No decryption context exists for this request id.
    #[error("VR_ERR_400: Unknown decryption request {0}")]
    UnknownRequest(RequestId),

    /// The decryption context was already processed.
    #[error("VR_ERR_401: Replay attempt for decryption request {0}")]
    ReplayAttempt(RequestId),

    /// The batch ciphertext changed between request and callback.
    #[error("VR_ERR_402: State mismatch for decryption request {request_id} (batch {batch_id})")]
    StateMismatch {
        request_id: RequestId,
        batch_id: BatchId,
    },

    /// The oracle signatures over `(request_id, cleartexts)` did not verify.
    #[error("VR_ERR_403: Invalid decryption proof for request {0}")]
    InvalidProof(RequestId),

    /// A ciphertext required by the operation was never initialized.
    #[error("VR_ERR_404: Ciphertext not initialized for batch {0}")]
    CiphertextNotInitialized(BatchId),

    /// The cleartext payload does not match the expected encoding.
    #[error("VR_ERR_405: Malformed cleartext: {reason}")]
    MalformedCleartext { reason: String },

    // =================================================================
    // Oracle Boundary Errors (5xx)
    // =================================================================
    /// The oracle could not accept a decryption request.
    #[error("VR_ERR_500: Oracle unavailable: {reason}")]
    OracleUnavailable { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("VR_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("VR_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("VR_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error (disk, network).
    #[error("VR_ERR_903: I/O error: {0}")]
    Io(String),
}

impl VeilrouteError {
    /// The code range this error belongs to.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotOwner(_) | Self::NotProvider(_) | Self::NotOracle(_) | Self::ZeroAccount => {
                ErrorCategory::Authorization
            }
            Self::Paused
            | Self::NotPaused
            | Self::BatchNotOpen(_)
            | Self::BatchAlreadyOpen(_)
            | Self::BatchAlreadyClosed(_)
            | Self::InvalidBatchId { .. } => ErrorCategory::Lifecycle,
            Self::CooldownActive { .. } => ErrorCategory::RateLimit,
            Self::UnknownRequest(_)
            | Self::ReplayAttempt(_)
            | Self::StateMismatch { .. }
            | Self::InvalidProof(_)
            | Self::CiphertextNotInitialized(_)
            | Self::MalformedCleartext { .. } => ErrorCategory::DecryptionIntegrity,
            Self::OracleUnavailable { .. } => ErrorCategory::Oracle,
            Self::Internal(_) | Self::Serialization(_) | Self::Configuration(_) | Self::Io(_) => {
                ErrorCategory::Internal
            }
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, VeilrouteError>;

impl From<std::io::Error> for VeilrouteError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for VeilrouteError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
