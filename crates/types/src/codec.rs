// Path: crates/types/src/codec.rs

//! The canonical, deterministic binary codec for all consensus-critical data.
//!
//! Thin wrappers around `parity-scale-codec` (SCALE). Records in the object
//! store, transaction ids and block ids are all derived from these bytes, so
//! every component must go through here rather than encoding ad hoc.
//! SCALE keeps field order as declared and tags `Option` fields explicitly,
//! which is the shape the serialized formats must preserve.

use parity_scale_codec::{Decode, DecodeAll, Encode};

/// Encodes a value into its canonical byte representation.
pub fn to_bytes_canonical<T: Encode>(v: &T) -> Result<Vec<u8>, String> {
    Ok(v.encode())
}

/// Decodes a value from its canonical byte representation.
///
/// Fails on any decoding error, including trailing bytes.
pub fn from_bytes_canonical<T: Decode>(b: &[u8]) -> Result<T, String> {
    T::decode_all(&mut &*b).map_err(|e| format!("canonical decode failed: {}", e))
}
