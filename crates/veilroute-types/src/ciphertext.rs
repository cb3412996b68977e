//! Opaque encrypted scalars.
//!
//! The router never looks inside a ciphertext. It only stores handles,
//! asks the [`HomomorphicBackend`](crate::HomomorphicBackend) for their
//! canonical bytes, and checks whether they were ever initialized.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::hex32;

/// Handle to an encrypted scalar held by the homomorphic backend.
///
/// The all-zero handle is the uninitialized value (the default of an
/// unset storage slot).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ciphertext(#[serde(with = "hex32")] pub [u8; 32]);

impl Ciphertext {
    pub const UNINITIALIZED: Self = Self([0u8; 32]);

    #[must_use]
    pub fn from_handle(handle: [u8; 32]) -> Self {
        Self(handle)
    }

    #[must_use]
    pub fn handle(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ct:{}", hex::encode(&self.0[..8]))
    }
}

/// An encrypted trade request: token pair and amount, each an opaque scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedTradeRequest {
    pub token_a: Ciphertext,
    pub token_b: Ciphertext,
    pub amount: Ciphertext,
}

impl EncryptedTradeRequest {
    #[must_use]
    pub fn new(token_a: Ciphertext, token_b: Ciphertext, amount: Ciphertext) -> Self {
        Self {
            token_a,
            token_b,
            amount,
        }
    }

    /// The three ciphertexts in argument order.
    #[must_use]
    pub fn ciphertexts(&self) -> [Ciphertext; 3] {
        [self.token_a, self.token_b, self.amount]
    }
}

/// Dummy ciphertexts for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl Ciphertext {
    /// A random, non-zero handle.
    pub fn dummy() -> Self {
        let mut handle: [u8; 32] = rand::random();
        handle[0] |= 1;
        Self(handle)
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl EncryptedTradeRequest {
    pub fn dummy() -> Self {
        Self::new(Ciphertext::dummy(), Ciphertext::dummy(), Ciphertext::dummy())
    }
}
