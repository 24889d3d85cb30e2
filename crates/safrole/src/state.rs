//! Safrole state, inputs, outputs, and errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use primitives::{Hash, ValidatorChange};
use vrf::VrfOutput;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SafroleError {
    #[error("input slot {input} precedes state slot {state}")]
    NonMonotonicSlot { input: u64, state: u64 },
    #[error("malformed input: {0}")]
    MalformedInput(&'static str),
}

/// A ticket retained in the accumulator. The signature is the 96-octet
/// wire form of the VRF evaluation it was admitted with.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct SafroleTicket {
    /// The VRF output hash; doubles as the ticket's identity.
    pub id: Hash,
    pub attempt: u64,
    #[serde(with = "serde_bytes")]
    pub signature: Vec<u8>,
    /// Compressed Bandersnatch public key of the submitting validator.
    pub validator: Hash,
}

/// A ticket as submitted in an extrinsic, before admission.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct TicketEnvelope {
    pub attempt: u64,
    pub validator: Hash,
    pub signature: VrfOutput,
}

/// The full Safrole state. Transitions never mutate in place; `apply_input`
/// returns a fresh value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct SafroleState {
    /// Current slot; monotone non-decreasing.
    pub slot: u64,
    /// `slot / epoch_duration`.
    pub epoch: u64,
    /// Rolling entropy values η₀…η₃.
    pub entropy: [Hash; 4],
    /// Validator keys for the current epoch.
    pub active_set: Vec<Hash>,
    /// Validator keys announced for the next epoch.
    pub pending_set: Vec<Hash>,
    /// Admitted tickets, at most `epoch_duration` of them.
    pub ticket_accumulator: Vec<SafroleTicket>,
    pub gamma: u64,
    pub lambda: u64,
    pub kappa: u64,
}

impl SafroleState {
    /// Genesis state at slot zero with the given initial validator sets.
    pub fn genesis(active_set: Vec<Hash>, pending_set: Vec<Hash>) -> Self {
        Self {
            slot: 0,
            epoch: 0,
            entropy: [Hash::default(); 4],
            active_set,
            pending_set,
            ticket_accumulator: Vec::new(),
            gamma: 0,
            lambda: 0,
            kappa: 0,
        }
    }
}

/// One block's worth of Safrole inputs, decoded upstream.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct SafroleInput {
    /// The slot being transitioned to.
    pub slot: u64,
    /// VRF output of the slot leader, folded into η₀.
    pub entropy_source: Hash,
    pub tickets: Vec<TicketEnvelope>,
    /// Validator set announced for the next epoch; required whenever the
    /// transition crosses an epoch boundary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announced_validators: Option<Vec<Hash>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub offenders: Vec<Hash>,
}

impl SafroleInput {
    /// A bare slot advance with no extrinsic content.
    pub fn tick(slot: u64, entropy_source: Hash) -> Self {
        Self {
            slot,
            entropy_source,
            tickets: Vec::new(),
            announced_validators: None,
            offenders: Vec::new(),
        }
    }
}

/// Everything a transition emits beyond the new state.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug, Default)]
pub struct SafroleOutput {
    /// Blake2b-256 over the outside-in ticket-id sequence, present only on
    /// a gated epoch boundary.
    pub winners_marker: Option<Hash>,
    pub validator_changes: Vec<ValidatorChange>,
    /// VRF evaluations of the tickets admitted by this transition.
    pub admitted: Vec<VrfOutput>,
}
