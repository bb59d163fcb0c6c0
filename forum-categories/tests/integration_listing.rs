//! Integration tests for rendering the category listing

use forum_categories::{
    AncestorResolver, AncestryStrategy, Category, CategoryContext, CategoryId,
    CategoryListPresenter, CategoryStore, DragHandle, EngineConfig, Filters, ListState,
    OrderingIndex, Pagination, RecordLocks, Resolution, UserId, Viewer,
};
use tempfile::TempDir;

fn id(n: u64) -> CategoryId {
    CategoryId::new(n)
}

fn scenario() -> Vec<Category> {
    vec![
        Category::section(1, "Main"),
        Category::child(2, 1, 1, "Welcome").with_ordering(0),
        Category::child(3, 1, 1, "Suggestions").with_ordering(1),
        Category::child(4, 2, 2, "Introductions"),
    ]
}

#[test]
fn test_concrete_scenario() {
    let records = scenario();
    let index = OrderingIndex::build(&records);

    assert_eq!(index.group(id(0)), Some(&[id(1)][..]));
    assert_eq!(index.group(id(1)), Some(&[id(2), id(3)][..]));
    assert_eq!(index.group(id(2)), Some(&[id(4)][..]));

    for strategy in [AncestryStrategy::MembershipScan, AncestryStrategy::Indexed] {
        let ancestry = AncestorResolver::new(strategy).resolve(&records[3], &index);
        assert_eq!(ancestry.chain, vec![id(1), id(0)]);
        assert_eq!(ancestry.resolution, Resolution::Complete);
        assert_eq!(ancestry.parents_attribute(), " 2 1 0");
    }
}

#[tokio::test]
async fn test_listing_from_store() {
    let temp = TempDir::new().unwrap();
    let ctx = CategoryContext::new(temp.path().join("categories"));
    let mut records = scenario();
    records.push(Category::section(5, "Staff").with_ordering(1));
    records[2] = records[2].clone().checked_out_by(9);
    ctx.init(records).await.unwrap();

    let snapshot = ctx.load().await.unwrap();
    let rows: Vec<Category> = snapshot.in_tree_order().into_iter().cloned().collect();
    let presenter = CategoryListPresenter::new(&EngineConfig::default());
    let viewer = Viewer::new(7).with_can_edit(true);

    let view = presenter.present(
        &rows,
        &snapshot.versions,
        &ListState::default(),
        &RecordLocks::from_records(&rows),
        &viewer,
    );

    let ids: Vec<_> = view.rows.iter().map(|r| r.record.id.get()).collect();
    assert_eq!(ids, vec![1, 2, 4, 3, 5]);
    assert!(view.ordering_enabled);
    assert!(view.empty_state.is_none());

    let suggestions = &view.rows[3];
    assert_eq!(suggestions.handle, DragHandle::Locked);
    assert_eq!(suggestions.checked_out_by, Some(UserId::new(9)));
    assert!(!suggestions.can_move_up);

    let welcome = &view.rows[1];
    assert_eq!(welcome.handle, DragHandle::Active);
    assert_eq!(welcome.drag_group_id, id(1));
    assert!(welcome.can_move_down);

    let staff = &view.rows[4];
    assert_eq!(staff.display_rank, 1);
    assert!(staff.is_section);
    assert_eq!(staff.parents, "");
}

#[test]
fn test_filtered_listing_tolerates_missing_parents() {
    // A title search that only matched the grandchild
    let records = vec![Category::child(4, 2, 2, "Introductions")];
    let state = ListState {
        filters: Filters {
            title: Some("intro".into()),
            ..Default::default()
        },
        ..Default::default()
    };

    let view = CategoryListPresenter::new(&EngineConfig::default()).present(
        &records,
        &Default::default(),
        &state,
        &RecordLocks::from_records(&records),
        &Viewer::new(1).with_can_edit(true),
    );

    assert!(!view.ordering_enabled);
    let row = &view.rows[0];
    assert_eq!(row.handle, DragHandle::Inactive);
    assert!(row.ancestor_chain.is_empty());
    assert_eq!(row.resolution, Resolution::Gap { missing: id(2) });
    assert_eq!(row.parents, " 2");
}

#[test]
fn test_second_page_disables_ordering() {
    let records = scenario();
    let state = ListState {
        pagination: Pagination {
            limit: 2,
            offset: 2,
            total: 4,
        },
        ..Default::default()
    };

    let view = CategoryListPresenter::new(&EngineConfig::default()).present(
        &records[2..],
        &Default::default(),
        &state,
        &RecordLocks::from_records(&records),
        &Viewer::new(1).with_can_edit(true),
    );

    assert!(!view.ordering_enabled);
    assert!(view
        .rows
        .iter()
        .all(|row| row.handle == DragHandle::Inactive && !row.can_move_down));
}
