//! # veilroute-types
//!
//! Shared types, errors, and capability traits for the **VeilRoute**
//! confidential batch router.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`ContractId`], [`BatchId`], [`RequestId`], [`EventId`]
//! - **Ciphertexts**: [`Ciphertext`], [`EncryptedTradeRequest`]
//! - **Batch model**: [`BatchPhase`], [`BatchRecord`]
//! - **Decryption model**: [`DecryptionContext`], [`ContextStatus`], [`DecryptionProof`],
//!   [`DecryptionJob`], [`DecryptionOutcome`], [`CallbackTarget`]
//! - **Events**: [`RouterEvent`], [`EventRecord`]
//! - **External capabilities**: [`HomomorphicBackend`], [`DecryptionOracle`]
//! - **Call context**: [`CallContext`]
//! - **Configuration**: [`RouterConfig`], [`OracleConfig`], [`CallbackFailurePolicy`]
//! - **Errors**: [`VeilrouteError`] with `VR_ERR_` prefix codes
//! - **Constants**: system-wide defaults and hashing domains

pub mod batch;
pub mod capability;
pub mod ciphertext;
pub mod cleartext;
pub mod config;
pub mod constants;
pub mod context;
pub mod decryption;
pub mod error;
pub mod event;
pub mod ids;

pub use batch::*;
pub use capability::*;
pub use ciphertext::*;
pub use config::*;
pub use context::*;
pub use decryption::*;
pub use error::*;
pub use event::*;
pub use ids::*;

// `cleartext` and `constants` are accessed by path
// (`veilroute_types::cleartext::decode_single`) to avoid name collisions.
