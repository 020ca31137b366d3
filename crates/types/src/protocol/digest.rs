// Path: crates/types/src/protocol/digest.rs
//! Content-derived identifiers: transaction ids, block ids and merkle roots.

use parity_scale_codec::{Decode, Encode};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 of `bytes`.
pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

fn truncate_20(digest: [u8; 32]) -> [u8; 20] {
    let mut out = [0u8; 20];
    out.iter_mut().zip(digest.iter()).for_each(|(o, d)| *o = *d);
    out
}

macro_rules! hex_digest {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Encode, Decode, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// The raw bytes.
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(self.0))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_str(&hex::encode(self.0))
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let s = String::deserialize(d)?;
                let mut out = [0u8; $len];
                hex::decode_to_slice(&s, &mut out).map_err(de::Error::custom)?;
                Ok(Self(out))
            }
        }
    };
}

hex_digest!(
    /// The content-derived id of a transaction: the first 20 bytes of the
    /// SHA-256 of its canonical encoding, signatures excluded.
    TransactionId,
    20
);

hex_digest!(
    /// A block id. The first four bytes carry the block number (big-endian);
    /// the rest come from the header digest.
    BlockId,
    20
);

hex_digest!(
    /// The merkle root over a block's transaction ids.
    MerkleRoot,
    32
);

impl TransactionId {
    /// Derives a transaction id from a canonical encoding.
    pub fn from_encoded(bytes: &[u8]) -> Self {
        Self(truncate_20(sha256(bytes)))
    }
}

impl BlockId {
    /// Derives a block id from the canonical header encoding and the block number.
    pub fn from_header(num: u32, header_bytes: &[u8]) -> Self {
        let mut id = truncate_20(sha256(header_bytes));
        id.iter_mut()
            .zip(num.to_be_bytes())
            .for_each(|(o, b)| *o = b);
        Self(id)
    }

    /// The block number embedded in the id. Zero is the genesis (empty) id.
    pub fn num(&self) -> u32 {
        let [a, b, c, d, ..] = self.0;
        u32::from_be_bytes([a, b, c, d])
    }

    /// The second 32-bit word of the id, referenced by transactions for TaPoS.
    pub fn prefix(&self) -> u32 {
        let [_, _, _, _, a, b, c, d, ..] = self.0;
        u32::from_le_bytes([a, b, c, d])
    }
}

/// Computes the merkle root over `ids`.
///
/// Leaves are the SHA-256 of each id. Each level hashes adjacent pairs; an
/// unpaired last node is carried up unchanged. An empty list has the
/// all-zero root.
pub fn merkle_root(ids: &[TransactionId]) -> MerkleRoot {
    let mut level: Vec<[u8; 32]> = ids.iter().map(|id| sha256(id.as_bytes())).collect();
    if level.is_empty() {
        return MerkleRoot::default();
    }
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => {
                    let mut joined = Vec::with_capacity(64);
                    joined.extend_from_slice(left);
                    joined.extend_from_slice(right);
                    sha256(&joined)
                }
                [single] => *single,
                _ => [0u8; 32],
            })
            .collect();
    }
    MerkleRoot(level.first().copied().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tid(n: u8) -> TransactionId {
        TransactionId([n; 20])
    }

    #[test]
    fn merkle_root_is_order_sensitive_and_pure() {
        let ids = [tid(1), tid(2), tid(3)];
        let a = merkle_root(&ids);
        assert_eq!(a, merkle_root(&ids));
        let swapped = [tid(2), tid(1), tid(3)];
        assert_ne!(a, merkle_root(&swapped));
        assert_eq!(merkle_root(&[]), MerkleRoot::default());
        assert_eq!(merkle_root(&[tid(9)]).0, sha256(&[9u8; 20]));
    }

    #[test]
    fn block_ids_embed_their_number() {
        let id = BlockId::from_header(42, b"header");
        assert_eq!(id.num(), 42);
        assert_eq!(BlockId::default().num(), 0);
    }

    #[test]
    fn ids_serialize_as_hex() {
        let json = serde_json::to_string(&tid(0xab)).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(20)));
        let back: TransactionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tid(0xab));
    }
}
