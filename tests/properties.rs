use collection_reconciler::*;
use proptest::prelude::*;
use std::collections::BTreeMap;

fn path() -> impl Strategy<Value = IndexPath> {
    (0usize..6, 0usize..5).prop_map(IndexPath::from)
}

fn item_move() -> impl Strategy<Value = ItemMove> {
    (path(), path()).prop_map(|(from, to)| ItemMove { from, to })
}

fn item_change() -> impl Strategy<Value = ItemChange> {
    prop_oneof![
        path().prop_map(|to| ItemChange::Insert { to }),
        path().prop_map(|from| ItemChange::Delete { from }),
        path().prop_map(|at| ItemChange::Update { at }),
        item_move().prop_map(|m| ItemChange::Move { from: m.from, to: m.to }),
    ]
}

/// Section index -> inserted (true) or deleted (false); one kind per index.
fn section_changes() -> impl Strategy<Value = BTreeMap<usize, bool>> {
    prop::collection::btree_map(0usize..6, any::<bool>(), 0..4)
}

fn record(reconciler: &mut ChangeSetReconciler, sections: &BTreeMap<usize, bool>, items: &[ItemChange]) {
    reconciler.begin_cycle();
    for (&index, &inserted) in sections {
        let kind = if inserted { ChangeKind::Insert } else { ChangeKind::Delete };
        reconciler.record_section_change(index, kind).unwrap();
    }
    for change in items {
        let (source, target) = match *change {
            ItemChange::Insert { to } => (None, Some(to)),
            ItemChange::Delete { from } => (Some(from), None),
            ItemChange::Update { at } => (Some(at), None),
            ItemChange::Move { from, to } => (Some(from), Some(to)),
        };
        reconciler.record_item_change(change.kind(), source, target).unwrap();
    }
}

fn commit_batch(sections: &BTreeMap<usize, bool>, items: &[ItemChange]) -> EditBatch {
    let mut reconciler = ChangeSetReconciler::new();
    record(&mut reconciler, sections, items);
    reconciler.commit(true).into_batch().unwrap()
}

fn is_inserted(sections: &BTreeMap<usize, bool>, section: usize) -> bool {
    sections.get(&section) == Some(&true)
}

fn is_deleted(sections: &BTreeMap<usize, bool>, section: usize) -> bool {
    sections.get(&section) == Some(&false)
}

fn sorted(mut paths: Vec<IndexPath>) -> Vec<IndexPath> {
    paths.sort();
    paths
}

proptest! {
    #[test]
    fn without_section_changes_items_pass_through(items in prop::collection::vec(item_change(), 0..24)) {
        let batch = commit_batch(&BTreeMap::new(), &items);

        let inserted: Vec<_> = items.iter().filter_map(|c| match *c { ItemChange::Insert { to } => Some(to), _ => None }).collect();
        let deleted: Vec<_> = items.iter().filter_map(|c| match *c { ItemChange::Delete { from } => Some(from), _ => None }).collect();
        let updated: Vec<_> = items.iter().filter_map(|c| match *c { ItemChange::Update { at } => Some(at), _ => None }).collect();
        let moved: Vec<_> = items.iter().filter_map(|c| match *c { ItemChange::Move { from, to } => Some(ItemMove { from, to }), _ => None }).collect();

        prop_assert!(batch.deleted_sections.is_empty());
        prop_assert!(batch.inserted_sections.is_empty());
        prop_assert_eq!(batch.inserted_items, inserted);
        prop_assert_eq!(batch.deleted_items, deleted);
        prop_assert_eq!(batch.reloaded_items, updated);
        prop_assert_eq!(batch.moves, moved);
    }

    #[test]
    fn moves_out_of_deleted_sections_become_target_inserts(
        sections in section_changes(),
        moves in prop::collection::vec(item_move(), 0..16),
    ) {
        let items: Vec<_> = moves.iter().map(|m| ItemChange::Move { from: m.from, to: m.to }).collect();
        let batch = commit_batch(&sections, &items);

        let rewritten: Vec<_> = moves
            .iter()
            .filter(|m| is_deleted(&sections, m.from.section) && !is_inserted(&sections, m.to.section))
            .collect();

        for m in &rewritten {
            prop_assert!(!batch.moves.contains(*m));
        }
        prop_assert_eq!(
            sorted(batch.inserted_items.clone()),
            sorted(rewritten.iter().map(|m| m.to).collect())
        );
    }

    #[test]
    fn moves_into_inserted_sections_become_source_deletes(
        sections in section_changes(),
        moves in prop::collection::vec(item_move(), 0..16),
    ) {
        let items: Vec<_> = moves.iter().map(|m| ItemChange::Move { from: m.from, to: m.to }).collect();
        let batch = commit_batch(&sections, &items);

        let rewritten: Vec<_> = moves
            .iter()
            .filter(|m| is_inserted(&sections, m.to.section) && !is_deleted(&sections, m.from.section))
            .collect();

        for m in &rewritten {
            prop_assert!(!batch.moves.contains(*m));
        }
        prop_assert_eq!(
            sorted(batch.deleted_items.clone()),
            sorted(rewritten.iter().map(|m| m.from).collect())
        );

        let kept: Vec<_> = moves
            .iter()
            .filter(|m| is_deleted(&sections, m.from.section) == is_inserted(&sections, m.to.section))
            .copied()
            .collect();
        prop_assert_eq!(batch.moves, kept);
    }

    #[test]
    fn no_item_edit_lands_in_a_changed_section(
        sections in section_changes(),
        items in prop::collection::vec(item_change(), 0..24),
    ) {
        let batch = commit_batch(&sections, &items);

        for path in &batch.deleted_items {
            prop_assert!(!batch.deleted_sections.contains(&path.section));
        }
        for path in &batch.inserted_items {
            prop_assert!(!batch.inserted_sections.contains(&path.section));
        }
    }

    #[test]
    fn detached_commit_always_reloads_and_clears(
        sections in section_changes(),
        items in prop::collection::vec(item_change(), 0..24),
    ) {
        let mut reconciler = ChangeSetReconciler::new();
        record(&mut reconciler, &sections, &items);

        prop_assert_eq!(reconciler.commit(false), CommitResult::Reload);
        prop_assert!(reconciler.is_empty());
        prop_assert!(!reconciler.is_cycle_open());
    }

    #[test]
    fn begin_cycle_twice_equals_once(
        sections in section_changes(),
        items in prop::collection::vec(item_change(), 0..24),
    ) {
        let mut once = ChangeSetReconciler::new();
        record(&mut once, &sections, &items);
        once.begin_cycle();

        let mut twice = ChangeSetReconciler::new();
        record(&mut twice, &sections, &items);
        twice.begin_cycle();
        twice.begin_cycle();

        prop_assert_eq!(once.summary(), twice.summary());
        prop_assert!(twice.is_empty());
        prop_assert_eq!(once.commit(true), twice.commit(true));
    }
}
