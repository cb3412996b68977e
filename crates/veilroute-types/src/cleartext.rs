//! Fixed-width cleartext codec.
//!
//! The oracle returns one 32-byte big-endian word per ciphertext, in the
//! order the canonical ciphertext list was built. Values must fit in `u64`.

use crate::{Result, VeilrouteError, constants::CLEARTEXT_WORD_BYTES};

/// Encode values as consecutive 32-byte big-endian words.
#[must_use]
pub fn encode_words(values: &[u64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * CLEARTEXT_WORD_BYTES);
    for value in values {
        out.extend_from_slice(&[0u8; CLEARTEXT_WORD_BYTES - 8]);
        out.extend_from_slice(&value.to_be_bytes());
    }
    out
}

/// Decode a payload that must contain exactly `expected` words.
///
/// # Errors
/// Returns `MalformedCleartext` on a length mismatch or a word wider than 64 bits.
pub fn decode_words(bytes: &[u8], expected: usize) -> Result<Vec<u64>> {
    if bytes.len() != expected * CLEARTEXT_WORD_BYTES {
        return Err(VeilrouteError::MalformedCleartext {
            reason: format!(
                "expected {} bytes for {expected} word(s), got {}",
                expected * CLEARTEXT_WORD_BYTES,
                bytes.len()
            ),
        });
    }
    bytes
        .chunks_exact(CLEARTEXT_WORD_BYTES)
        .enumerate()
        .map(|(i, word)| {
            let (high, low) = word.split_at(CLEARTEXT_WORD_BYTES - 8);
            if high.iter().any(|b| *b != 0) {
                return Err(VeilrouteError::MalformedCleartext {
                    reason: format!("word {i} does not fit in 64 bits"),
                });
            }
            let mut buf = [0u8; 8];
            buf.copy_from_slice(low);
            Ok(u64::from_be_bytes(buf))
        })
        .collect()
}

/// Decode a single-scalar payload.
///
/// # Errors
/// Returns `MalformedCleartext` unless `bytes` is exactly one valid word.
pub fn decode_single(bytes: &[u8]) -> Result<u64> {
    Ok(decode_words(bytes, 1)?[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_word_layout() {
        let bytes = encode_words(&[5]);
        assert_eq!(bytes.len(), 32);
        assert_eq!(bytes[31], 5);
        assert!(bytes[..31].iter().all(|b| *b == 0));
        assert_eq!(decode_single(&bytes).unwrap(), 5);
    }

    #[test]
    fn multiple_words_keep_order() {
        let bytes = encode_words(&[5, 9, 100]);
        assert_eq!(decode_words(&bytes, 3).unwrap(), vec![5, 9, 100]);
    }

    #[test]
    fn wrong_length_rejected() {
        let err = decode_single(&[0u8; 31]).unwrap_err();
        assert!(matches!(err, VeilrouteError::MalformedCleartext { .. }));
        assert!(decode_single(&encode_words(&[1, 2])).is_err());
        assert!(decode_single(&[]).is_err());
    }

    #[test]
    fn oversized_word_rejected() {
        let mut bytes = encode_words(&[1]);
        bytes[0] = 0x01;
        let err = decode_single(&bytes).unwrap_err();
        assert!(matches!(err, VeilrouteError::MalformedCleartext { .. }));
    }

    #[test]
    fn max_value_roundtrips() {
        let bytes = encode_words(&[u64::MAX]);
        assert_eq!(decode_single(&bytes).unwrap(), u64::MAX);
    }
}
