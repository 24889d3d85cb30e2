//! Protocol parameters, supplied by the embedding node.

use serde::{Deserialize, Serialize};

/// Protocol version, ordered lexicographically.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Debug)]
pub struct JamVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl JamVersion {
    pub const fn new(major: u8, minor: u8, patch: u8) -> Self {
        Self { major, minor, patch }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct ProtocolConfig {
    /// Slots per epoch.
    pub epoch_duration: u64,
    /// Slots before the epoch tail in which the ticket contest runs.
    pub contest_duration: u64,
    /// Ticket attempts permitted per validator per contest.
    pub tickets_per_slot: u64,
    pub max_validators: usize,
    pub min_validators: usize,
    /// Lowest service index handed out to public services (v0.7.1+).
    pub min_public_index: u32,
    pub version: JamVersion,
}

impl ProtocolConfig {
    /// The small-network parameter set used throughout the test suites.
    pub fn tiny() -> Self {
        Self {
            epoch_duration: 12,
            contest_duration: 10,
            tickets_per_slot: 2,
            max_validators: 6,
            min_validators: 3,
            min_public_index: 1 << 16,
            version: JamVersion::new(0, 7, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_ordering() {
        assert!(JamVersion::new(0, 7, 1) > JamVersion::new(0, 7, 0));
        assert!(JamVersion::new(0, 8, 0) > JamVersion::new(0, 7, 9));
        assert!(JamVersion::new(1, 0, 0) >= JamVersion::new(0, 7, 1));
    }

    #[test]
    fn config_json_roundtrip() {
        let cfg = ProtocolConfig::tiny();
        let json = serde_json::to_string(&cfg).unwrap();
        assert_eq!(serde_json::from_str::<ProtocolConfig>(&json).unwrap(), cfg);
    }
}
