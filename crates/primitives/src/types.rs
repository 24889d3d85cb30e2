//! Core entity types shared across the protocol kernel.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

pub const HASH_LEN: usize = 32;

/// A 32-octet content hash. Canonical textual form is `0x` followed by 64
/// lowercase hex characters; that form is also the JSON representation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Hash(pub [u8; HASH_LEN]);

impl Hash {
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        if bytes.len() != HASH_LEN {
            return Err(anyhow!("expected {} octets, got {}", HASH_LEN, bytes.len()));
        }
        let mut out = [0u8; HASH_LEN];
        out.copy_from_slice(&bytes);
        Ok(Hash(out))
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Debug for Hash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Hash(0x{}..)", hex::encode(&self.0[..4]))
    }
}

impl core::fmt::Display for Hash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; HASH_LEN]> for Hash {
    fn from(bytes: [u8; HASH_LEN]) -> Self {
        Hash(bytes)
    }
}

impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct HashVisitor;
        impl serde::de::Visitor<'_> for HashVisitor {
            type Value = Hash;
            fn expecting(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                write!(f, "a 0x-prefixed 64-character hex string")
            }
            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Hash::from_hex(v).map_err(E::custom)
            }
        }
        deserializer.deserialize_str(HashVisitor)
    }
}

/// Identifies the work-package a report was computed from.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug, Default)]
pub struct PackageSpec {
    pub hash: Hash,
}

/// A work-report as seen by the scheduling layer: everything except the
/// package hash and its prerequisite set is opaque here.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug, Default)]
pub struct WorkReport {
    pub package_spec: PackageSpec,
    /// Package hashes that must be accumulated before this report may be.
    pub prerequisites: Vec<Hash>,
}

impl WorkReport {
    pub fn new(hash: Hash, prerequisites: Vec<Hash>) -> Self {
        Self {
            package_spec: PackageSpec { hash },
            prerequisites,
        }
    }

    pub fn package_hash(&self) -> Hash {
        self.package_spec.hash
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorChangeKind {
    Added,
    Removed,
    Slashed,
}

/// An emitted, never mutated record of a validator-set membership event.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct ValidatorChange {
    pub validator: Hash,
    pub kind: ValidatorChangeKind,
    pub slot: u64,
}
