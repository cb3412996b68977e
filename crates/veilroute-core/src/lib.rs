//! # veilroute-core
//!
//! The confidential batch router state machine for **VeilRoute**.
//!
//! Providers submit encrypted trade requests into numbered batches; a
//! pluggable strategy derives an encrypted best path per batch; an external
//! oracle decrypts it asynchronously and calls back with a signed result.
//!
//! - [`AccessController`]: owner and provider roles, pause switch, cooldown
//! - [`BatchLifecycle`]: CLOSED/OPEN alternation and batch ids
//! - [`CiphertextStore`]: per-batch ciphertext storage
//! - [`SubmissionGate`]: admits encrypted requests, derives the best path
//! - [`DecryptionProtocol`]: request/callback with replay and state binding
//! - [`RateBoard`]: encrypted rate key-value board for front ends
//! - [`EventLog`]: append-only record of every accepted transition
//! - [`ConfidentialRouter`]: composes all of the above
//! - [`SharedRouter`]: one lock around a router for concurrent callers
//!
//! ## Request flow
//!
//! ```text
//!  owner: open_batch ──▶ OPEN(batch n)
//!  provider: submit ──▶ store[n] = request, best_path = strategy(request)
//!  owner: close_batch ──▶ CLOSED(batch n)
//!  provider: request_decryption(n) ──▶ oracle  (context PENDING)
//!  oracle: callback(id, cleartext, proof) ──▶ checks ──▶ COMPLETED, event
//! ```

pub mod access;
pub mod batch_lifecycle;
pub mod ciphertext_store;
pub mod cooldown;
pub mod decryption;
pub mod events;
pub mod rate_board;
pub mod router;
pub mod shared;
pub mod submission;

pub use access::AccessController;
pub use batch_lifecycle::BatchLifecycle;
pub use ciphertext_store::CiphertextStore;
pub use cooldown::CooldownTracker;
pub use decryption::{DecryptionProtocol, canonical_ciphertexts, compute_state_hash};
pub use events::EventLog;
pub use rate_board::{RateBoard, RateEntry};
pub use router::ConfidentialRouter;
pub use shared::SharedRouter;
pub use submission::{BestPathStrategy, PassThroughStrategy, SubmissionGate};
