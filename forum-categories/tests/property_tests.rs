//! Property-based tests for the ordering index and ancestor resolution.

use forum_categories::{
    AncestorResolver, AncestryStrategy, Category, CategoryId, OrderingIndex, Resolution,
};
use proptest::prelude::*;
use std::collections::HashSet;

/// Levels a stored record may carry, including corrupted ones
fn level_strategy() -> impl Strategy<Value = u32> {
    prop_oneof![
        6 => 0u32..8,
        1 => Just(u32::MAX),
        1 => any::<u32>(),
    ]
}

/// Flat record lists over a small id space so that duplicates, the root id,
/// orphans and parent cycles all show up regularly
fn records_strategy() -> impl Strategy<Value = Vec<Category>> {
    prop::collection::vec((0u64..30, 0u64..36, level_strategy()), 0..48).prop_map(|rows| {
        rows.into_iter()
            .map(|(id, parent, level)| Category::child(id, parent, level, format!("C{id}")))
            .collect()
    })
}

proptest! {
    #[test]
    fn test_every_id_lands_in_exactly_one_group(records in records_strategy()) {
        let index = OrderingIndex::build(&records);

        let mut seen = HashSet::new();
        for (_, members) in index.groups() {
            prop_assert!(!members.is_empty());
            for member in members {
                prop_assert!(seen.insert(*member), "{} listed twice", member);
            }
        }

        let expected: HashSet<CategoryId> = records
            .iter()
            .map(|c| c.id)
            .filter(|id| !id.is_root())
            .collect();
        prop_assert_eq!(&seen, &expected);
        prop_assert_eq!(index.len(), expected.len());
        prop_assert!(!index.contains(CategoryId::ROOT));
    }

    #[test]
    fn test_build_is_idempotent(records in records_strategy()) {
        let first = OrderingIndex::build(&records);
        prop_assert_eq!(&first, &OrderingIndex::build(&records));

        // Rebuilding from the rows the index kept gives the same index
        let mut kept = HashSet::new();
        let deduped: Vec<&Category> = records
            .iter()
            .filter(|c| !c.id.is_root() && kept.insert(c.id))
            .collect();
        prop_assert_eq!(&first, &OrderingIndex::build(deduped));
    }

    #[test]
    fn test_resolve_stays_within_level(records in records_strategy()) {
        let index = OrderingIndex::build(&records);
        let resolver = AncestorResolver::default();

        for record in &records {
            let ancestry = resolver.resolve(record, &index);
            prop_assert!(ancestry.chain.len() <= record.level as usize);
            prop_assert!(ancestry.chain.len() <= index.len() + 1);
            if record.level == 0 {
                prop_assert!(ancestry.chain.is_empty());
                prop_assert_eq!(ancestry.resolution, Resolution::Complete);
            }
        }
    }

    #[test]
    fn test_strategies_agree(records in records_strategy()) {
        let index = OrderingIndex::build(&records);
        let scan = AncestorResolver::new(AncestryStrategy::MembershipScan);
        let indexed = AncestorResolver::new(AncestryStrategy::Indexed);

        for record in &records {
            prop_assert_eq!(scan.resolve(record, &index), indexed.resolve(record, &index));
        }
    }
}
