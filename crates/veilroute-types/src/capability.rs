//! External capabilities the router depends on but does not implement.
//!
//! - [`HomomorphicBackend`]: the encrypted-scalar library.
//! - [`DecryptionOracle`]: the asynchronous decryption service.
//!
//! The router only ever sees these traits. Concrete implementations live
//! outside the core (see `veilroute-oracle`).

use crate::{CallbackTarget, Ciphertext, DecryptionProof, RequestId, Result};

/// Opaque encrypted-scalar capability set.
pub trait HomomorphicBackend: Send + Sync {
    /// Encrypt a cleartext scalar.
    fn encrypt(&self, value: u64) -> Ciphertext;

    /// Canonical byte form of a ciphertext, as fed into state hashes and
    /// decryption requests.
    fn to_canonical_bytes(&self, ciphertext: &Ciphertext) -> [u8; 32];

    /// Whether the ciphertext was produced by this backend (as opposed to
    /// an unset storage slot).
    fn is_initialized(&self, ciphertext: &Ciphertext) -> bool;
}

/// Decryption oracle boundary.
pub trait DecryptionOracle: Send {
    /// The id the next successful [`Self::request_decryption`] will return.
    /// Lets the caller refuse a reused id before anything is queued.
    fn peek_request_id(&self) -> RequestId;

    /// Queue a decryption of `ciphertexts`. Fire-and-forget: the answer
    /// arrives later through `callback`. Returns a request id unique for
    /// this oracle.
    fn request_decryption(
        &mut self,
        ciphertexts: &[Ciphertext],
        callback: &CallbackTarget,
    ) -> Result<RequestId>;

    /// Verify the oracle proof over `(request_id, cleartexts)`.
    fn check_signatures(
        &self,
        request_id: RequestId,
        cleartexts: &[u8],
        proof: &DecryptionProof,
    ) -> bool;
}
