//! Blake2b-256 over raw octets.

use blake2b_simd::Params as Blake2bParams;

use crate::types::{Hash, HASH_LEN};

/// Blake2b with a 32-octet digest and no personalization.
pub fn blake2b_256(data: &[u8]) -> Hash {
    let hash = Blake2bParams::new().hash_length(HASH_LEN).hash(data);
    let mut out = [0u8; HASH_LEN];
    out.copy_from_slice(hash.as_bytes());
    Hash(out)
}

/// Blake2b-256 over the concatenation of two octet strings, without an
/// intermediate allocation.
pub fn blake2b_256_pair(a: &[u8], b: &[u8]) -> Hash {
    let mut params = Blake2bParams::new();
    params.hash_length(HASH_LEN);
    let mut state = params.to_state();
    state.update(a);
    state.update(b);
    let mut out = [0u8; HASH_LEN];
    out.copy_from_slice(state.finalize().as_bytes());
    Hash(out)
}
