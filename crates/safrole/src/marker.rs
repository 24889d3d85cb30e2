//! Winners-marker derivation from a filled ticket accumulator.

use blake2b_simd::Params as Blake2bParams;

use primitives::{Hash, ProtocolConfig, HASH_LEN};

use crate::state::SafroleTicket;

/// Outside-in sequencing: first, last, second, second-to-last, ...
///
/// `Z([a,b,c,d,e]) = [a,e,b,d,c]`.
pub fn outside_in<T: Clone>(seq: &[T]) -> Vec<T> {
    let n = seq.len();
    (0..n)
        .map(|i| {
            if i % 2 == 0 {
                seq[i / 2].clone()
            } else {
                seq[n - 1 - i / 2].clone()
            }
        })
        .collect()
}

/// Compute the winners marker for a transition from `current_slot` to
/// `next_slot`, or `None` unless all four gating predicates hold:
/// an epoch boundary is crossed, the closing slot sits before the contest
/// tail, the new slot sits in or past the tail, and the contest filled the
/// accumulator.
pub fn winners_marker(
    cfg: &ProtocolConfig,
    current_slot: u64,
    next_slot: u64,
    accumulator: &[SafroleTicket],
) -> Option<Hash> {
    let crossing = next_slot / cfg.epoch_duration > current_slot / cfg.epoch_duration;
    let before_tail = current_slot % cfg.epoch_duration < cfg.contest_duration;
    let past_tail = next_slot % cfg.epoch_duration >= cfg.contest_duration;
    let filled = accumulator.len() as u64 == cfg.epoch_duration;
    if !(crossing && before_tail && past_tail && filled) {
        return None;
    }

    let sequenced = outside_in(accumulator);
    let mut params = Blake2bParams::new();
    params.hash_length(HASH_LEN);
    let mut state = params.to_state();
    for ticket in &sequenced {
        state.update(&ticket.id.0);
    }
    let mut out = [0u8; HASH_LEN];
    out.copy_from_slice(state.finalize().as_bytes());
    Some(Hash(out))
}
