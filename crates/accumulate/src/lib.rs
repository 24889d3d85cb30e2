//! Dependency-aware scheduling of work-reports for accumulation.
//!
//! The engine is a pure function of its inputs: it never fails, and the
//! order of emitted reports is decided only by the order of the input
//! queue and the rounds in which dependencies resolve.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use primitives::{Hash, WorkReport};

/// A work-report waiting in the ready queue together with the package
/// hashes it still depends on.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct ReadyItem {
    pub report: WorkReport,
    pub dependencies: HashSet<Hash>,
}

impl ReadyItem {
    /// Queue a report; its prerequisite set becomes the dependency set.
    pub fn new(report: WorkReport) -> Self {
        let dependencies = report.prerequisites.iter().copied().collect();
        Self {
            report,
            dependencies,
        }
    }

    /// Queue a report with extra dependencies beyond its prerequisites.
    pub fn with_extra_dependencies(report: WorkReport, extra: &[Hash]) -> Self {
        let mut item = Self::new(report);
        item.dependencies.extend(extra.iter().copied());
        item
    }

    pub fn package_hash(&self) -> Hash {
        self.report.package_hash()
    }
}

/// Queue editing `E`: drop items whose own package hash is in `removed`
/// and strip `removed` entries from the dependency sets of the rest.
pub fn edit_queue(items: Vec<ReadyItem>, removed: &HashSet<Hash>) -> Vec<ReadyItem> {
    items
        .into_iter()
        .filter(|item| !removed.contains(&item.package_hash()))
        .map(|mut item| {
            item.dependencies.retain(|dep| !removed.contains(dep));
            item
        })
        .collect()
}

/// Accumulatable selection `Q`: the maximal sequence of items whose
/// dependencies are all already accumulated.
///
/// Each round takes every item with an empty dependency set, in queue
/// order, then re-edits the remainder against the newly accumulated
/// hashes. A report naming its own package hash can never resolve and is
/// never emitted.
pub fn accumulatable(items: &[ReadyItem], history: &AccumulatedHistory) -> Vec<ReadyItem> {
    let already = history.flattened();
    let mut queue = edit_queue(items.to_vec(), &already);
    let mut out = Vec::new();
    loop {
        let (ready, blocked): (Vec<ReadyItem>, Vec<ReadyItem>) = queue
            .into_iter()
            .partition(|item| item.dependencies.is_empty());
        if ready.is_empty() {
            break;
        }
        let emitted: HashSet<Hash> = ready.iter().map(|item| item.package_hash()).collect();
        out.extend(ready);
        queue = edit_queue(blocked, &emitted);
    }
    out
}

/// Per-slot sets of accumulated package hashes. Append-only; sealed slots
/// are immutable, and the window discards the oldest slot once full.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct AccumulatedHistory {
    slots: VecDeque<HashSet<Hash>>,
    window: usize,
}

impl AccumulatedHistory {
    pub fn new(window: usize) -> Self {
        Self {
            slots: VecDeque::with_capacity(window),
            window,
        }
    }

    /// Seal one slot's accumulated set.
    pub fn record_slot(&mut self, hashes: HashSet<Hash>) {
        if self.slots.len() == self.window {
            self.slots.pop_front();
        }
        self.slots.push_back(hashes);
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.slots.iter().any(|slot| slot.contains(hash))
    }

    /// Union of every recorded slot.
    pub fn flattened(&self) -> HashSet<Hash> {
        self.slots.iter().flatten().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(n: u8) -> Hash {
        Hash([n; 32])
    }

    fn item(package: u8, deps: &[u8]) -> ReadyItem {
        ReadyItem::new(WorkReport::new(
            h(package),
            deps.iter().map(|&d| h(d)).collect(),
        ))
    }

    fn hashes(items: &[ReadyItem]) -> Vec<Hash> {
        items.iter().map(|i| i.package_hash()).collect()
    }

    #[test]
    fn edit_drops_removed_packages_and_satisfied_deps() {
        let removed: HashSet<Hash> = [h(1), h(9)].into_iter().collect();
        let edited = edit_queue(
            vec![item(1, &[]), item(2, &[1, 3]), item(3, &[9])],
            &removed,
        );
        assert_eq!(hashes(&edited), vec![h(2), h(3)]);
        assert_eq!(edited[0].dependencies, [h(3)].into_iter().collect());
        assert!(edited[1].dependencies.is_empty());
    }

    #[test]
    fn no_dependencies_passes_through_in_order() {
        let items = vec![item(1, &[]), item(2, &[]), item(3, &[])];
        let out = accumulatable(&items, &AccumulatedHistory::new(8));
        assert_eq!(hashes(&out), vec![h(1), h(2), h(3)]);
    }

    #[test]
    fn chains_resolve_round_by_round() {
        // 3 depends on 2 depends on 1
        let items = vec![item(1, &[]), item(2, &[1]), item(3, &[2]), item(4, &[])];
        let out = accumulatable(&items, &AccumulatedHistory::new(8));
        assert_eq!(hashes(&out), vec![h(1), h(4), h(2), h(3)]);
    }

    #[test]
    fn unsatisfied_dependencies_never_emit() {
        let items = vec![item(1, &[42]), item(2, &[1])];
        let out = accumulatable(&items, &AccumulatedHistory::new(8));
        assert!(out.is_empty());
    }

    #[test]
    fn history_satisfies_dependencies() {
        let mut history = AccumulatedHistory::new(8);
        history.record_slot([h(42)].into_iter().collect());
        let items = vec![item(1, &[42]), item(2, &[1])];
        let out = accumulatable(&items, &history);
        assert_eq!(hashes(&out), vec![h(1), h(2)]);
    }

    #[test]
    fn already_accumulated_packages_are_dropped() {
        let mut history = AccumulatedHistory::new(8);
        history.record_slot([h(1)].into_iter().collect());
        let items = vec![item(1, &[]), item(2, &[1])];
        let out = accumulatable(&items, &history);
        assert_eq!(hashes(&out), vec![h(2)]);
    }

    #[test]
    fn self_dependency_is_never_satisfied() {
        let items = vec![item(1, &[1]), item(2, &[])];
        let out = accumulatable(&items, &AccumulatedHistory::new(8));
        assert_eq!(hashes(&out), vec![h(2)]);
    }

    #[test]
    fn output_is_a_subsequence_of_the_input() {
        let items = vec![
            item(1, &[]),
            item(2, &[40]),
            item(3, &[]),
            item(4, &[1, 3]),
        ];
        let out = accumulatable(&items, &AccumulatedHistory::new(8));
        let input = hashes(&items);
        let output = hashes(&out);
        let mut cursor = input.iter();
        for emitted in &output {
            assert!(
                cursor.any(|original| original == emitted),
                "{emitted:?} out of order"
            );
        }
        assert_eq!(output, vec![h(1), h(3), h(4)]);
    }

    #[test]
    fn selection_is_idempotent() {
        let history = AccumulatedHistory::new(8);
        let items = vec![item(1, &[]), item(2, &[1]), item(3, &[7])];
        let first = accumulatable(&items, &history);
        let again = accumulatable(&first, &history);
        assert_eq!(first, again);
    }

    #[test]
    fn ready_item_json_roundtrip() {
        let item = item(1, &[2, 3]);
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(serde_json::from_str::<ReadyItem>(&json).unwrap(), item);
    }

    #[test]
    fn history_window_evicts_oldest() {
        let mut history = AccumulatedHistory::new(2);
        history.record_slot([h(1)].into_iter().collect());
        history.record_slot([h(2)].into_iter().collect());
        history.record_slot([h(3)].into_iter().collect());
        assert_eq!(history.len(), 2);
        assert!(!history.contains(&h(1)));
        assert!(history.contains(&h(2)));
        assert!(history.contains(&h(3)));
    }
}
