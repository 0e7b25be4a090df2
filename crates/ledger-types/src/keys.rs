//! # Composite Key Encodings
//!
//! Two encodings address pair-keyed state with a single comparable value:
//!
//! - [`EntityNumPair`]: two 32-bit entity numbers packed big-endian into one
//!   `u64`. Numeric ordering of the packed word equals lexicographic ordering
//!   on `(high, low)`. Used for token relationships and allowance map keys,
//!   where cardinality is bounded by associations per account.
//! - [`NftId`]: a (collection, serial) pair with a variable-length codec of
//!   1-17 bytes. Under massive NFT cardinality the compact form matters more
//!   than fixed width, so each number is stored as its minimal big-endian
//!   byte run behind a two-nibble length header.

use crate::errors::LedgerError;
use serde::{Deserialize, Serialize};

/// Entity numbers are 64-bit in APIs, but fixed-width pair packing requires
/// them to fit in 32 bits.
pub type EntityNum = u64;

/// Version tag for the serialized form of the variable-length key.
/// Decoding any other version is rejected as unsupported.
pub const KEY_CODEC_VERSION: u8 = 1;

/// Two 32-bit entity numbers packed into one comparable `u64`.
///
/// The high half is the owning entity (account for relationships, token for
/// allowance keys); the low half is the counterparty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityNumPair(u64);

impl EntityNumPair {
    /// Pack `(high, low)` into a single word.
    ///
    /// Panics if either number exceeds the 32-bit packing range; entity
    /// numbers that large never reach this core.
    pub fn from_nums(high: EntityNum, low: EntityNum) -> Self {
        assert!(
            high <= u32::MAX as u64 && low <= u32::MAX as u64,
            "entity number exceeds 32-bit packing range: ({high}, {low})"
        );
        Self((high << 32) | low)
    }

    /// Key for an (account, token) relationship.
    pub fn account_token(account: EntityNum, token: EntityNum) -> Self {
        Self::from_nums(account, token)
    }

    /// Key for a (token, spender) allowance entry.
    pub fn token_spender(token: EntityNum, spender: EntityNum) -> Self {
        Self::from_nums(token, spender)
    }

    pub fn high(self) -> EntityNum {
        self.0 >> 32
    }

    pub fn low(self) -> EntityNum {
        self.0 & 0xFFFF_FFFF
    }

    /// The raw packed word.
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Identity of a single NFT: the collection's entity number plus the serial
/// number within the collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NftId {
    pub token_num: u64,
    pub serial: u64,
}

impl NftId {
    /// Worst case: header byte plus two full 8-byte runs.
    pub const MAX_ENCODED_LEN: usize = 17;

    pub fn new(token_num: u64, serial: u64) -> Self {
        Self { token_num, serial }
    }

    /// Encode as 1-17 bytes.
    ///
    /// Byte 0 holds two 4-bit length nibbles: the token number's byte count
    /// in the high nibble, the serial's in the low nibble. The minimal
    /// big-endian byte runs of each number follow in that order. Zero
    /// encodes as an empty run.
    pub fn encode(&self) -> Vec<u8> {
        let token_len = min_be_len(self.token_num);
        let serial_len = min_be_len(self.serial);
        let mut out = Vec::with_capacity(1 + token_len + serial_len);
        out.push(((token_len as u8) << 4) | serial_len as u8);
        out.extend_from_slice(&self.token_num.to_be_bytes()[8 - token_len..]);
        out.extend_from_slice(&self.serial.to_be_bytes()[8 - serial_len..]);
        out
    }

    /// Decode bytes produced by [`NftId::encode`].
    ///
    /// Rejects unsupported codec versions and malformed buffers. A version
    /// this node cannot decode means state written by incompatible software,
    /// which is fatal rather than recoverable.
    pub fn decode(version: u8, bytes: &[u8]) -> Result<Self, LedgerError> {
        if version != KEY_CODEC_VERSION {
            return Err(LedgerError::UnsupportedKeyVersion {
                found: version,
                expected: KEY_CODEC_VERSION,
            });
        }
        let header = *bytes.first().ok_or_else(|| {
            LedgerError::InternalConsistency("empty NFT key buffer".to_string())
        })?;
        let token_len = (header >> 4) as usize;
        let serial_len = (header & 0x0F) as usize;
        if token_len > 8 || serial_len > 8 {
            return Err(LedgerError::InternalConsistency(format!(
                "NFT key length nibble out of range: header {header:#04x}"
            )));
        }
        if bytes.len() != 1 + token_len + serial_len {
            return Err(LedgerError::InternalConsistency(format!(
                "NFT key buffer length {} does not match header {header:#04x}",
                bytes.len()
            )));
        }
        let token_num = read_be(&bytes[1..1 + token_len]);
        let serial = read_be(&bytes[1 + token_len..]);
        Ok(Self { token_num, serial })
    }
}

/// Count of bytes in the minimal big-endian run of `value` (0 for zero).
fn min_be_len(value: u64) -> usize {
    ((64 - value.leading_zeros() as usize) + 7) / 8
}

/// Big-endian read of a run of at most 8 bytes.
fn read_be(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_pair_packs_and_unpacks() {
        let pair = EntityNumPair::from_nums(1001, 2002);
        assert_eq!(pair.high(), 1001);
        assert_eq!(pair.low(), 2002);
        assert_eq!(pair.value(), (1001u64 << 32) | 2002);
    }

    #[test]
    fn test_pair_order_matches_lexicographic_order() {
        let pairs = [
            (0u64, 0u64),
            (0, 1),
            (0, u32::MAX as u64),
            (1, 0),
            (1, 1),
            (7, 100),
            (8, 0),
            (u32::MAX as u64, u32::MAX as u64),
        ];
        for window in pairs.windows(2) {
            let a = EntityNumPair::from_nums(window[0].0, window[0].1);
            let b = EntityNumPair::from_nums(window[1].0, window[1].1);
            assert!(a < b, "{window:?} should be strictly increasing");
        }
    }

    #[test]
    #[should_panic(expected = "exceeds 32-bit packing range")]
    fn test_pair_rejects_oversized_number() {
        EntityNumPair::from_nums(u32::MAX as u64 + 1, 0);
    }

    #[test]
    fn test_nft_key_round_trips_boundary_values() {
        let interesting = [
            0u64,
            1,
            254,
            255,
            256,
            65_534,
            65_535,
            65_536,
            u32::MAX as u64 - 1,
            u32::MAX as u64,
            u32::MAX as u64 + 1,
            u64::MAX - 1,
            u64::MAX,
        ];
        for &token in &interesting {
            for &serial in &interesting {
                let id = NftId::new(token, serial);
                let bytes = id.encode();
                assert!(bytes.len() <= NftId::MAX_ENCODED_LEN);
                let decoded = NftId::decode(KEY_CODEC_VERSION, &bytes).unwrap();
                assert_eq!(decoded, id, "round trip failed for ({token}, {serial})");
            }
        }
    }

    #[test]
    fn test_nft_key_round_trips_random_values() {
        let mut rng = rand::thread_rng();
        for _ in 0..2000 {
            let id = NftId::new(rng.gen(), rng.gen());
            let decoded = NftId::decode(KEY_CODEC_VERSION, &id.encode()).unwrap();
            assert_eq!(decoded, id);
        }
    }

    #[test]
    fn test_nft_key_length_grows_with_wider_numbers() {
        let widths = [0u64, 255, 65_535, u32::MAX as u64, u64::MAX];
        let mut last_len = 0;
        for &w in &widths {
            let len = NftId::new(w, w).encode().len();
            assert!(len >= last_len, "encoding shrank between widths");
            last_len = len;
        }
        // With the serial fixed, length is driven by the token number alone.
        let mut last_len = 0;
        for &w in &widths {
            let len = NftId::new(w, 3).encode().len();
            assert!(len >= last_len);
            last_len = len;
        }
    }

    #[test]
    fn test_nft_key_zero_is_single_byte() {
        let bytes = NftId::new(0, 0).encode();
        assert_eq!(bytes, vec![0x00]);
    }

    #[test]
    fn test_nft_key_rejects_unsupported_version() {
        let bytes = NftId::new(7, 9).encode();
        let err = NftId::decode(KEY_CODEC_VERSION + 1, &bytes).unwrap_err();
        assert!(matches!(err, LedgerError::UnsupportedKeyVersion { found, .. } if found == 2));
    }

    #[test]
    fn test_nft_key_rejects_malformed_buffers() {
        assert!(NftId::decode(KEY_CODEC_VERSION, &[]).is_err());
        // Header claims a 9-byte token run.
        assert!(NftId::decode(KEY_CODEC_VERSION, &[0x90, 0, 0, 0, 0, 0, 0, 0, 0, 1]).is_err());
        // Header claims more bytes than the buffer holds.
        assert!(NftId::decode(KEY_CODEC_VERSION, &[0x21, 0xAB]).is_err());
        // Trailing garbage.
        assert!(NftId::decode(KEY_CODEC_VERSION, &[0x11, 0xAB, 0xCD, 0xEF]).is_err());
    }
}
