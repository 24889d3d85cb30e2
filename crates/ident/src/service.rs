//! Fresh service-index allocation.

use std::collections::HashSet;

use primitives::{blake2b_256, Hash, JamVersion, ProtocolConfig};

const RESERVED_LOW: u32 = 1 << 8;

/// Allocate a fresh service index from the parent service, the current
/// entropy, and the timeslot. Deterministic for identical inputs; indices
/// already present in `accounts` are skipped by stepping within the range.
pub fn derive_service_id(
    cfg: &ProtocolConfig,
    parent: u32,
    entropy: &Hash,
    timeslot: u64,
    accounts: &HashSet<u32>,
) -> u32 {
    let mut seed = Vec::with_capacity(40);
    codec::encode_natural(parent as u64, &mut seed);
    seed.extend_from_slice(&entropy.0);
    codec::encode_natural(timeslot, &mut seed);
    let digest = blake2b_256(&seed);
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&digest.0[..4]);
    let r = u32::from_le_bytes(raw) as u64;

    let (base, span) = if cfg.version >= JamVersion::new(0, 7, 1) {
        let base = cfg.min_public_index as u64;
        (base, (1u64 << 32) - base - RESERVED_LOW as u64)
    } else {
        (RESERVED_LOW as u64, (1u64 << 32) - 2 * RESERVED_LOW as u64)
    };

    let mut id = ((r % span) + base) as u32;
    while accounts.contains(&id) {
        id = (((id as u64 - base + 1) % span) + base) as u32;
    }
    id
}
