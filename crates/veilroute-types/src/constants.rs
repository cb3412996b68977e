//! System-wide constants for the VeilRoute router.

/// Default cooldown between two calls of the same kind from one account.
pub const DEFAULT_COOLDOWN_SECS: u64 = 10;

/// Default bound on distinct keys in the rate board.
pub const DEFAULT_MAX_RATE_ENTRIES: usize = 1_024;

/// Default number of oracle signers.
pub const DEFAULT_ORACLE_SIGNERS: usize = 3;

/// Default number of valid, distinct signatures a proof needs.
pub const DEFAULT_ORACLE_THRESHOLD: usize = 2;

/// Width of one encoded cleartext word (big-endian).
pub const CLEARTEXT_WORD_BYTES: usize = 32;

/// Name of the router entrypoint the oracle calls back into.
pub const DECRYPTION_CALLBACK_ENTRYPOINT: &str = "callback";

/// Domain separator for decryption state hashes.
pub const STATE_HASH_DOMAIN: &[u8] = b"veilroute:state:v1:";

/// Domain separator for oracle signing payloads.
pub const DECRYPTION_DOMAIN: &[u8] = b"veilroute:decryption:v1:";

/// Domain separator for mock ciphertext handles.
pub const CIPHERTEXT_HANDLE_DOMAIN: &[u8] = b"veilroute:ct:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "VeilRoute";
