//! # veilroute-oracle
//!
//! **Oracle side** of the decryption protocol: everything the router treats
//! as an external collaborator.
//!
//! ## Components
//!
//! 1. **MockFheBackend**: stand-in homomorphic library. Ciphertexts are
//!    random handles; cleartexts live in a shared [`PlaintextVault`]
//! 2. **OracleKeySet**: trusted ed25519 signer keys plus a threshold
//! 3. **OracleGateway**: the on-ledger half. Allocates request ids and
//!    queues [`DecryptionJob`](veilroute_types::DecryptionJob)s
//! 4. **DecryptionRelayer**: the off-ledger half. Decrypts jobs and signs
//!    the cleartexts
//!
//! ## Flow
//!
//! ```text
//! Router → OracleGateway.request_decryption() → job channel
//!        → DecryptionRelayer.fulfil() → CallbackPayload → Router.callback()
//!                                                        → OracleGateway.check_signatures()
//! ```

pub mod gateway;
pub mod keyset;
pub mod mock_fhe;
pub mod relayer;

pub use gateway::OracleGateway;
pub use keyset::{OracleKeySet, committee};
pub use mock_fhe::{MockFheBackend, PlaintextVault};
pub use relayer::DecryptionRelayer;
