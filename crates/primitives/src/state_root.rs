//! Deterministic merkle root over an unordered key-value set, plus the
//! JSON test-vector containers it is checked against.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::hash::blake2b_256_pair;
use crate::types::Hash;

/// One state entry. Keys and values are raw octets internally; the JSON
/// form carries them as hex strings (with or without a `0x` prefix).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct KeyVal {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl Serialize for KeyVal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("KeyVal", 2)?;
        s.serialize_field("key", &format!("0x{}", hex::encode(&self.key)))?;
        s.serialize_field("value", &format!("0x{}", hex::encode(&self.value)))?;
        s.end()
    }
}

impl<'de> Deserialize<'de> for KeyVal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            key: String,
            value: String,
        }
        let raw = Raw::deserialize(deserializer)?;
        let decode = |s: &str| hex::decode(s.strip_prefix("0x").unwrap_or(s));
        Ok(KeyVal {
            key: decode(&raw.key).map_err(serde::de::Error::custom)?,
            value: decode(&raw.value).map_err(serde::de::Error::custom)?,
        })
    }
}

/// Merkle root of a key-value set.
///
/// Pairs are sorted lexicographically by key octets, each leaf is
/// `H(key ++ value)`, adjacent nodes pair up into `H(left ++ right)`, and
/// an odd-count level duplicates its last node. The result is invariant
/// under the insertion order of the input. An empty set hashes to zero.
pub fn state_root(pairs: &[KeyVal]) -> Hash {
    let mut sorted: Vec<&KeyVal> = pairs.iter().collect();
    sorted.sort_by(|a, b| a.key.cmp(&b.key));

    let mut level: Vec<Hash> = sorted
        .iter()
        .map(|kv| blake2b_256_pair(&kv.key, &kv.value))
        .collect();
    if level.is_empty() {
        return Hash::default();
    }
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            let last = level[level.len() - 1];
            level.push(last);
        }
        level = level
            .chunks(2)
            .map(|pair| blake2b_256_pair(&pair[0].0, &pair[1].0))
            .collect();
    }
    level[0]
}

/// A `keyvals` container as found in the on-disk vectors.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug, Default)]
pub struct StateSnapshot {
    pub keyvals: Vec<KeyVal>,
}

impl StateSnapshot {
    pub fn root(&self) -> Hash {
        state_root(&self.keyvals)
    }
}

/// An on-disk test vector. The state may appear under any of the three
/// container spellings; `state_root` records the expected root.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug, Default)]
pub struct TestVector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<StateSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_state: Option<StateSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_state: Option<StateSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_root: Option<Hash>,
}

impl TestVector {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The snapshot the vector's `state_root` refers to: `state` when
    /// present, otherwise `post_state`, otherwise `pre_state`.
    pub fn snapshot(&self) -> Result<&StateSnapshot> {
        self.state
            .as_ref()
            .or(self.post_state.as_ref())
            .or(self.pre_state.as_ref())
            .ok_or_else(|| anyhow!("vector carries no state container"))
    }

    /// Recompute the root and compare it against the recorded one.
    pub fn check_root(&self) -> Result<Hash> {
        let computed = self.snapshot()?.root();
        if let Some(expected) = self.state_root {
            if computed != expected {
                return Err(anyhow!(
                    "state root mismatch: computed {computed}, vector says {expected}"
                ));
            }
        }
        Ok(computed)
    }
}
