//! Mock homomorphic backend.
//!
//! Ciphertext handles are SHA-256 commitments over a counter, the value and
//! a random nonce, so two encryptions of the same value never collide. The
//! cleartext behind each handle is kept in a [`PlaintextVault`] that only
//! the relayer reads.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use veilroute_types::{Ciphertext, HomomorphicBackend, constants};

/// Shared handle → cleartext table.
#[derive(Debug, Clone, Default)]
pub struct PlaintextVault {
    inner: Arc<RwLock<HashMap<[u8; 32], u64>>>,
}

impl PlaintextVault {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, handle: [u8; 32], value: u64) {
        self.inner.write().insert(handle, value);
    }

    /// Cleartext behind a handle, if it was produced by this vault's backend.
    #[must_use]
    pub fn reveal(&self, ciphertext: &Ciphertext) -> Option<u64> {
        self.inner.read().get(ciphertext.handle()).copied()
    }

    #[must_use]
    pub fn contains(&self, ciphertext: &Ciphertext) -> bool {
        self.inner.read().contains_key(ciphertext.handle())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

/// In-process stand-in for the homomorphic library.
#[derive(Debug, Default)]
pub struct MockFheBackend {
    vault: PlaintextVault,
    counter: AtomicU64,
}

impl MockFheBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend writing into an existing vault.
    #[must_use]
    pub fn with_vault(vault: PlaintextVault) -> Self {
        Self {
            vault,
            counter: AtomicU64::new(0),
        }
    }

    /// The vault to hand to the relayer.
    #[must_use]
    pub fn vault(&self) -> PlaintextVault {
        self.vault.clone()
    }

    fn fresh_handle(&self, value: u64) -> [u8; 32] {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        let nonce: u64 = rand::random();
        let mut hasher = Sha256::new();
        hasher.update(constants::CIPHERTEXT_HANDLE_DOMAIN);
        hasher.update(seq.to_le_bytes());
        hasher.update(value.to_le_bytes());
        hasher.update(nonce.to_le_bytes());
        hasher.finalize().into()
    }
}

impl HomomorphicBackend for MockFheBackend {
    fn encrypt(&self, value: u64) -> Ciphertext {
        let mut handle = self.fresh_handle(value);
        // Zero is reserved for "uninitialized".
        while handle == [0u8; 32] {
            handle = self.fresh_handle(value);
        }
        self.vault.insert(handle, value);
        Ciphertext::from_handle(handle)
    }

    fn to_canonical_bytes(&self, ciphertext: &Ciphertext) -> [u8; 32] {
        *ciphertext.handle()
    }

    fn is_initialized(&self, ciphertext: &Ciphertext) -> bool {
        !ciphertext.is_zero() && self.vault.contains(ciphertext)
    }
}
