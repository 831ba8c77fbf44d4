use std::collections::{BTreeMap, HashSet};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::sample::item::SampleItem;

/// Sampled items grouped by type.
///
/// Each group holds at most the cap it was drawn with, and no path appears
/// twice in the set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleSet {
    groups: BTreeMap<String, Vec<SampleItem>>,
}

impl SampleSet {
    pub fn groups(&self) -> &BTreeMap<String, Vec<SampleItem>> {
        &self.groups
    }

    pub fn get(&self, kind: &str) -> Option<&[SampleItem]> {
        self.groups.get(kind).map(|g| g.as_slice())
    }

    /// All items, grouped by type in type order.
    pub fn items(&self) -> impl Iterator<Item = &SampleItem> {
        self.groups.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.groups.values().map(|g| g.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All items in a seeded random order, mixing types.
    pub fn shuffled(&self, seed: u64) -> Vec<SampleItem> {
        let mut all: Vec<SampleItem> = self.items().cloned().collect();
        all.shuffle(&mut StdRng::seed_from_u64(seed));
        all
    }
}

/// Draws up to `per_type_cap` items per type, uniformly without replacement.
///
/// # Arguments
/// - `items`        : classified files; a path listed twice counts once
/// - `per_type_cap` : most items kept per type; smaller types keep everything
/// - `seed`         : RNG seed
///
/// # Returns
/// A [`SampleSet`] grouped by type. Groups are visited in type order with a
/// single RNG seeded from `seed`, so the same input and seed always give the
/// same set.
pub fn stratified_sample(items: &[SampleItem], per_type_cap: usize, seed: u64) -> SampleSet {
    let mut by_kind: BTreeMap<&str, Vec<&SampleItem>> = BTreeMap::new();
    for item in items {
        by_kind.entry(item.kind.as_str()).or_default().push(item);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut seen = HashSet::new();
    let mut groups = BTreeMap::new();

    for (kind, mut members) in by_kind {
        members.retain(|m| seen.insert(m.path.clone()));
        let take = per_type_cap.min(members.len());
        let picked: Vec<SampleItem> = members
            .choose_multiple(&mut rng, take)
            .map(|m| (*m).clone())
            .collect();
        log::debug!("type {}: sampled {} of {}", kind, picked.len(), members.len());
        if !picked.is_empty() {
            groups.insert(kind.to_owned(), picked);
        }
    }

    SampleSet { groups }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::GridShape;
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn item(path: &str, kind: &str) -> SampleItem {
        SampleItem {
            path: PathBuf::from(path),
            pattern: ".*".into(),
            kind: kind.into(),
            expected_shape: vec![GridShape::new(1, 1)],
        }
    }

    fn corpus() -> Vec<SampleItem> {
        let mut items: Vec<SampleItem> = (0..20).map(|i| item(&format!("a/{}", i), "A")).collect();
        items.extend((0..3).map(|i| item(&format!("b/{}", i), "B")));
        items
    }

    #[test]
    fn caps_large_groups_and_keeps_small_ones() {
        let set = stratified_sample(&corpus(), 5, 7);
        assert_eq!(set.get("A").unwrap().len(), 5);
        assert_eq!(set.get("B").unwrap().len(), 3);
        assert_eq!(set.len(), 8);
    }

    #[test]
    fn same_seed_same_sample() {
        assert_eq!(stratified_sample(&corpus(), 5, 42), stratified_sample(&corpus(), 5, 42));
    }

    #[test]
    fn different_seeds_usually_differ() {
        let draws: HashSet<Vec<PathBuf>> = (0..8)
            .map(|seed| {
                stratified_sample(&corpus(), 5, seed)
                    .items()
                    .map(|i| i.path.clone())
                    .collect()
            })
            .collect();
        assert!(draws.len() > 1);
    }

    #[test]
    fn duplicate_paths_are_sampled_once() {
        let items = vec![item("x", "A"), item("x", "A"), item("y", "A")];
        let set = stratified_sample(&items, 10, 0);
        assert_eq!(set.get("A").unwrap().len(), 2);
    }

    #[test]
    fn zero_cap_yields_empty_set() {
        assert!(stratified_sample(&corpus(), 0, 1).is_empty());
    }

    #[test]
    fn shuffled_keeps_every_item() {
        let set = stratified_sample(&corpus(), 5, 3);
        let mut shuffled: Vec<PathBuf> = set.shuffled(3).into_iter().map(|i| i.path).collect();
        let mut grouped: Vec<PathBuf> = set.items().map(|i| i.path.clone()).collect();
        shuffled.sort();
        grouped.sort();
        assert_eq!(shuffled, grouped);
    }

    proptest! {
        #[test]
        fn groups_respect_cap_and_input(
            kinds in prop::collection::vec(0u8..4, 0..60),
            cap in 0usize..10,
            seed in any::<u64>(),
        ) {
            let items: Vec<SampleItem> = kinds
                .iter()
                .enumerate()
                .map(|(i, k)| item(&format!("p{}", i), &format!("T{}", k)))
                .collect();
            let set = stratified_sample(&items, cap, seed);

            let mut seen = HashSet::new();
            for (kind, group) in set.groups() {
                prop_assert!(group.len() <= cap);
                for member in group {
                    prop_assert_eq!(&member.kind, kind);
                    prop_assert!(items.contains(member));
                    prop_assert!(seen.insert(member.path.clone()));
                }
            }
        }
    }
}
