//! Ticket admission: VRF verification and per-epoch uniqueness.

use std::collections::HashSet;

use primitives::{Hash, ProtocolConfig};
use vrf::{is_valid, output_hash, PublicKey, VrfOutput};

use crate::state::{SafroleTicket, TicketEnvelope};

/// Context string of the epoch ticket transcript.
pub const TICKET_CONTEXT: &[u8] = b"jam/safrole/ticket/v1";

/// The signed message of a ticket: the epoch's sealing entropy followed by
/// the compact-encoded attempt index.
pub fn ticket_message(sealing_entropy: &Hash, attempt: u64) -> Vec<u8> {
    let mut msg = Vec::with_capacity(40);
    msg.extend_from_slice(&sealing_entropy.0);
    codec::encode_natural(attempt, &mut msg);
    msg
}

/// Admit tickets from an extrinsic into the accumulator, in input order.
///
/// A ticket is admitted iff its VRF signature verifies under the
/// validator's key over the epoch transcript, the validator is in the
/// active set, the attempt index is in range, and `(validator, attempt)`
/// is unseen this epoch. Anything else is silently dropped, as are
/// tickets beyond the accumulator's capacity.
pub fn admit_tickets(
    cfg: &ProtocolConfig,
    active_set: &[Hash],
    sealing_entropy: &Hash,
    accumulator: &mut Vec<SafroleTicket>,
    envelopes: &[TicketEnvelope],
) -> Vec<VrfOutput> {
    let mut seen: HashSet<(Hash, u64)> = accumulator
        .iter()
        .map(|t| (t.validator, t.attempt))
        .collect();
    let capacity = cfg.epoch_duration as usize;
    let mut admitted = Vec::new();

    for envelope in envelopes {
        if accumulator.len() >= capacity {
            break;
        }
        if envelope.attempt >= cfg.tickets_per_slot {
            continue;
        }
        if !active_set.contains(&envelope.validator) {
            continue;
        }
        if seen.contains(&(envelope.validator, envelope.attempt)) {
            continue;
        }
        let public = match PublicKey::from_bytes(&envelope.validator.0) {
            Ok(public) => public,
            Err(_) => continue,
        };
        let message = ticket_message(sealing_entropy, envelope.attempt);
        if !is_valid(&public, TICKET_CONTEXT, &message, &envelope.signature) {
            continue;
        }
        seen.insert((envelope.validator, envelope.attempt));
        accumulator.push(SafroleTicket {
            id: output_hash(&envelope.signature),
            attempt: envelope.attempt,
            signature: envelope.signature.to_bytes().to_vec(),
            validator: envelope.validator,
        });
        admitted.push(envelope.signature);
    }
    admitted
}
