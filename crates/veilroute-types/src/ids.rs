//! Identifiers used throughout VeilRoute.
//!
//! Account and contract identities are raw 32-byte keys (hex on the wire).
//! Batch and request identifiers are monotonically increasing integers;
//! event records use UUIDv7 for time-ordered sorting.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::VeilrouteError;

/// Serde adapter: `[u8; 32]` as a 64-character lowercase hex string.
pub mod hex32 {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_hex32(&s).map_err(D::Error::custom)
    }
}

fn parse_hex32(s: &str) -> Result<[u8; 32], String> {
    let raw = hex::decode(s.trim_start_matches("0x")).map_err(|e| e.to_string())?;
    raw.as_slice()
        .try_into()
        .map_err(|_| format!("expected 32 bytes, got {}", raw.len()))
}

fn derive32(domain: &[u8], label: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(label.as_bytes());
    hasher.finalize().into()
}

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// Identity of a caller (owner, provider, oracle). Raw 32-byte key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AccountId(#[serde(with = "hex32")] pub [u8; 32]);

impl AccountId {
    /// The zero account. Never a valid owner or provider.
    pub const ZERO: Self = Self([0u8; 32]);

    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Deterministic account from a human label (fixtures, simulator).
    #[must_use]
    pub fn derive(label: &str) -> Self {
        Self(derive32(b"veilroute:account:v1:", label))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acct:{}", hex::encode(&self.0[..8]))
    }
}

impl FromStr for AccountId {
    type Err = VeilrouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex32(s)
            .map(Self)
            .map_err(|e| VeilrouteError::Configuration(format!("invalid account id: {e}")))
    }
}

// ---------------------------------------------------------------------------
// ContractId
// ---------------------------------------------------------------------------

/// Identity of one router instance. Bound into every state hash so a
/// decryption context can never be replayed against another instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ContractId(#[serde(with = "hex32")] pub [u8; 32]);

impl ContractId {
    #[must_use]
    pub fn derive(label: &str) -> Self {
        Self(derive32(b"veilroute:contract:v1:", label))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contract:{}", hex::encode(&self.0[..8]))
    }
}

impl FromStr for ContractId {
    type Err = VeilrouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex32(s)
            .map(Self)
            .map_err(|e| VeilrouteError::Configuration(format!("invalid contract id: {e}")))
    }
}

// ---------------------------------------------------------------------------
// BatchId
// ---------------------------------------------------------------------------

/// Monotonically increasing batch identifier. `BatchId(1)` is reserved at
/// construction; every `open_batch` allocates the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct BatchId(pub u64);

impl BatchId {
    /// The reserved, never-opened initial identifier.
    pub const INITIAL: Self = Self(1);

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "batch:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// RequestId
// ---------------------------------------------------------------------------

/// Decryption request identifier, allocated by the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// EventId
// ---------------------------------------------------------------------------

/// Unique identifier of an emitted event record (UUIDv7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "evt:{}", self.0)
    }
}
