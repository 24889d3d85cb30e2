//! The Safrole state transition.

use std::collections::HashSet;

use primitives::{
    blake2b_256_pair, Hash, ProtocolConfig, ValidatorChange, ValidatorChangeKind,
};

use crate::marker::winners_marker;
use crate::state::{SafroleError, SafroleInput, SafroleOutput, SafroleState};
use crate::tickets::admit_tickets;

/// Apply one block's input to the state, yielding the successor state and
/// the transition's emissions. Pure: the given state is never mutated, and
/// an error leaves it untouched by construction.
pub fn apply_input(
    state: &SafroleState,
    cfg: &ProtocolConfig,
    input: &SafroleInput,
) -> Result<(SafroleState, SafroleOutput), SafroleError> {
    if input.slot < state.slot {
        return Err(SafroleError::NonMonotonicSlot {
            input: input.slot,
            state: state.slot,
        });
    }
    let next_epoch = input.slot / cfg.epoch_duration;
    if next_epoch > state.epoch + 1 {
        return Err(SafroleError::MalformedInput(
            "transition skips more than one epoch boundary",
        ));
    }

    // The marker is judged against the closing epoch's accumulator.
    let marker = winners_marker(cfg, state.slot, input.slot, &state.ticket_accumulator);

    let mut next = state.clone();
    let mut changes = Vec::new();
    next.slot = input.slot;

    if next_epoch > state.epoch {
        let announced = input
            .announced_validators
            .as_ref()
            .ok_or(SafroleError::MalformedInput(
                "epoch boundary without an announced validator set",
            ))?;
        if announced.len() < cfg.min_validators || announced.len() > cfg.max_validators {
            return Err(SafroleError::MalformedInput(
                "announced validator set size out of bounds",
            ));
        }

        // Entropy history rotates before the new slot's contribution mixes
        // in, so η₁ seals the closing epoch.
        next.entropy[3] = next.entropy[2];
        next.entropy[2] = next.entropy[1];
        next.entropy[1] = next.entropy[0];

        let outgoing: HashSet<Hash> = state.active_set.iter().copied().collect();
        let incoming: HashSet<Hash> = state.pending_set.iter().copied().collect();
        for validator in state.pending_set.iter() {
            if !outgoing.contains(validator) {
                changes.push(ValidatorChange {
                    validator: *validator,
                    kind: ValidatorChangeKind::Added,
                    slot: input.slot,
                });
            }
        }
        for validator in state.active_set.iter() {
            if !incoming.contains(validator) {
                changes.push(ValidatorChange {
                    validator: *validator,
                    kind: ValidatorChangeKind::Removed,
                    slot: input.slot,
                });
            }
        }

        next.active_set = state.pending_set.clone();
        next.pending_set = announced.clone();
        next.ticket_accumulator.clear();
        next.lambda = state.kappa;
        next.kappa = state.gamma;
        next.gamma = next_epoch;
        next.epoch = next_epoch;
    }

    for offender in &input.offenders {
        changes.push(ValidatorChange {
            validator: *offender,
            kind: ValidatorChangeKind::Slashed,
            slot: input.slot,
        });
    }

    next.entropy[0] = blake2b_256_pair(&next.entropy[0].0, &input.entropy_source.0);

    let sealing_entropy = next.entropy[2];
    let active_set = next.active_set.clone();
    let admitted = admit_tickets(
        cfg,
        &active_set,
        &sealing_entropy,
        &mut next.ticket_accumulator,
        &input.tickets,
    );

    Ok((
        next,
        SafroleOutput {
            winners_marker: marker,
            validator_changes: changes,
            admitted,
        },
    ))
}
