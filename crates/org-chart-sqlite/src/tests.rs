//! Repository Integration Tests
//!
//! Tests for SqliteHierarchyRepository with in-memory SQLite database.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use org_chart_core::{
        Capabilities, ChartDesigner, DesignerConfig, DomainError, DraftCreate, DraftId, DraftPatch, HierarchyBackend,
        ItemId, LoadFilter, NodeId, ParentUpdate, Position, PositionUpdate, SaveStatus,
    };
    use tokio::sync::Mutex;

    use crate::{init_db, SqliteHierarchyRepository};

    fn setup_test_db() -> SqliteHierarchyRepository {
        let conn = init_db(":memory:").expect("Failed to init test DB");
        SqliteHierarchyRepository::new(Arc::new(Mutex::new(conn)))
    }

    /// CEO -> (CTO -> Engineer), CFO
    async fn seed(repo: &SqliteHierarchyRepository) -> [ItemId; 4] {
        let ceo = repo.create_item("CEO", None, None, Some(1)).await.unwrap();
        let cto = repo.create_item("CTO", Some("Technology"), Some(ceo.id), Some(1)).await.unwrap();
        let cfo = repo.create_item("CFO", None, Some(ceo.id), None).await.unwrap();
        let eng = repo.create_item("Engineer", None, Some(cto.id), Some(4)).await.unwrap();
        [ceo.id, cto.id, cfo.id, eng.id]
    }

    fn draft(id: u32, name: &str, parent: Option<NodeId>) -> DraftCreate {
        DraftCreate {
            draft_id: DraftId(id),
            name: name.to_string(),
            description: None,
            parent_id: parent,
            level: 0,
            position_x: 10,
            position_y: 20,
        }
    }

    #[tokio::test]
    async fn test_create_item_levels_and_order() {
        let repo = setup_test_db();
        let [ceo, cto, cfo, eng] = seed(&repo).await;

        let cto = repo.find_by_id(cto).await.unwrap().unwrap();
        assert_eq!(cto.parent_id, Some(ceo));
        assert_eq!(cto.level, 1);
        assert_eq!(cto.sort_order, 0);
        assert_eq!(cto.description.as_deref(), Some("Technology"));
        assert_eq!(repo.find_by_id(cfo).await.unwrap().unwrap().sort_order, 1);
        assert_eq!(repo.find_by_id(eng).await.unwrap().unwrap().level, 2);
    }

    #[tokio::test]
    async fn test_load_with_counts() {
        let repo = setup_test_db();
        let [ceo, cto, ..] = seed(&repo).await;

        let loaded = repo.load(&LoadFilter::default()).await.unwrap();
        assert_eq!(loaded.len(), 4);
        assert_eq!(loaded[0].item.id, ceo);
        assert_eq!(loaded[0].child_count, Some(2));
        let cto_row = loaded.iter().find(|l| l.item.id == cto).unwrap();
        assert_eq!(cto_row.child_count, Some(1));
        assert_eq!(cto_row.holder_count, Some(1));
        // ordered by level
        let levels: Vec<u32> = loaded.iter().map(|l| l.item.level).collect();
        assert_eq!(levels, vec![0, 1, 1, 2]);
    }

    #[tokio::test]
    async fn test_load_subtree_and_search() {
        let repo = setup_test_db();
        let [_, cto, _, eng] = seed(&repo).await;

        let subtree = repo
            .load(&LoadFilter { root: Some(cto), search: None })
            .await
            .unwrap();
        let ids: Vec<ItemId> = subtree.iter().map(|l| l.item.id).collect();
        assert_eq!(ids, vec![cto, eng]);

        let found = repo
            .load(&LoadFilter { root: None, search: Some("engin".to_string()) })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].item.name, "Engineer");
    }

    #[tokio::test]
    async fn test_bulk_update_positions() {
        let repo = setup_test_db();
        let [ceo, cto, ..] = seed(&repo).await;

        repo.bulk_update_positions(&[
            PositionUpdate { id: ceo, position_x: 100, position_y: 0, level: None },
            PositionUpdate { id: cto, position_x: -30, position_y: 160, level: Some(1) },
        ])
        .await
        .unwrap();

        let ceo = repo.find_by_id(ceo).await.unwrap().unwrap();
        assert_eq!((ceo.position_x, ceo.position_y), (100, 0));
        assert_eq!(ceo.level, 0);
    }

    #[tokio::test]
    async fn test_bulk_update_unknown_id_rolls_back() {
        let repo = setup_test_db();
        let [ceo, ..] = seed(&repo).await;

        let result = repo
            .bulk_update_positions(&[
                PositionUpdate { id: ceo, position_x: 500, position_y: 500, level: None },
                PositionUpdate { id: ItemId(999), position_x: 1, position_y: 1, level: None },
            ])
            .await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));

        let ceo = repo.find_by_id(ceo).await.unwrap().unwrap();
        assert_eq!((ceo.position_x, ceo.position_y), (0, 0));
    }

    #[tokio::test]
    async fn test_bulk_create_resolves_draft_parents() {
        let repo = setup_test_db();
        let [_, cto, ..] = seed(&repo).await;

        let created = repo
            .bulk_create(&[
                draft(1, "Platform Lead", Some(NodeId::Persisted(cto))),
                draft(2, "SRE", Some(NodeId::Draft(DraftId(1)))),
            ])
            .await
            .unwrap();

        assert_eq!(created.len(), 2);
        assert_eq!(created[0].parent_id, Some(cto));
        assert_eq!(created[0].level, 2);
        assert_eq!(created[0].sort_order, 1);
        assert_eq!(created[1].parent_id, Some(created[0].id));
        assert_eq!(created[1].level, 3);
        assert_eq!((created[1].position_x, created[1].position_y), (10, 20));
    }

    #[tokio::test]
    async fn test_bulk_create_forward_reference_is_rejected() {
        let repo = setup_test_db();
        seed(&repo).await;

        let result = repo
            .bulk_create(&[
                draft(1, "Orphan", Some(NodeId::Draft(DraftId(2)))),
                draft(2, "Later", None),
            ])
            .await;
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
        assert_eq!(repo.load(&LoadFilter::default()).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_update_parent_shifts_subtree() {
        let repo = setup_test_db();
        let [_, cto, cfo, eng] = seed(&repo).await;

        repo.update_parent(&ParentUpdate { id: cto, new_parent_id: Some(cfo) }).await.unwrap();

        let cto_item = repo.find_by_id(cto).await.unwrap().unwrap();
        assert_eq!(cto_item.parent_id, Some(cfo));
        assert_eq!(cto_item.level, 2);
        assert_eq!(repo.find_by_id(eng).await.unwrap().unwrap().level, 3);

        repo.update_parent(&ParentUpdate { id: cto, new_parent_id: None }).await.unwrap();
        assert_eq!(repo.find_by_id(cto).await.unwrap().unwrap().level, 0);
        assert_eq!(repo.find_by_id(eng).await.unwrap().unwrap().level, 1);
    }

    #[tokio::test]
    async fn test_update_parent_rejects_cycles() {
        let repo = setup_test_db();
        let [ceo, cto, _, eng] = seed(&repo).await;

        let own = repo.update_parent(&ParentUpdate { id: cto, new_parent_id: Some(cto) }).await;
        assert!(matches!(own, Err(DomainError::Conflict(_))));

        let below = repo.update_parent(&ParentUpdate { id: ceo, new_parent_id: Some(eng) }).await;
        assert!(matches!(below, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_lifts_children() {
        let repo = setup_test_db();
        let [ceo, cto, _, eng] = seed(&repo).await;

        repo.delete_item(cto).await.unwrap();

        assert!(repo.find_by_id(cto).await.unwrap().is_none());
        let eng = repo.find_by_id(eng).await.unwrap().unwrap();
        assert_eq!(eng.parent_id, Some(ceo));
        assert_eq!(eng.level, 1);

        let missing = repo.delete_item(ItemId(999)).await;
        assert!(matches!(missing, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_designer_save_round_trip() {
        let repo = setup_test_db();
        let [ceo, ..] = seed(&repo).await;

        let mut designer = ChartDesigner::new(DesignerConfig::default(), Capabilities::all());
        designer.reload(&repo, &LoadFilter::default()).await.unwrap();

        let lead = designer.add_node(Some(NodeId::Persisted(ceo))).unwrap();
        designer.edit_draft(lead, DraftPatch::name("COO")).unwrap();
        let deputy = designer.add_node(Some(NodeId::Draft(lead))).unwrap();
        designer.edit_draft(deputy, DraftPatch::name("Deputy COO")).unwrap();

        let report = designer.save(&repo).await.unwrap();
        assert_eq!(report.created.len(), 2);
        assert_eq!(designer.save_status(), SaveStatus::Clean);

        designer.reload(&repo, &LoadFilter::default()).await.unwrap();
        let store = designer.store();
        assert!(store.drafts().is_empty());
        assert_eq!(store.persisted().count(), 6);
        let deputy = store.persisted().find(|item| item.name == "Deputy COO").unwrap();
        let coo = store.persisted().find(|item| item.name == "COO").unwrap();
        assert_eq!(deputy.parent_id, Some(coo.id));
        assert_eq!(deputy.level, 2);
    }

    #[tokio::test]
    async fn test_saving_scoped_view_keeps_levels() {
        let repo = setup_test_db();
        let [ceo, cto, _, eng] = seed(&repo).await;

        // CTO's subtree only: CTO is a forest root here but not in storage
        let mut designer = ChartDesigner::new(DesignerConfig::default(), Capabilities::all());
        let filter = LoadFilter { root: Some(cto), search: None };
        designer.reload(&repo, &filter).await.unwrap();

        designer.drag_node(NodeId::Persisted(eng), Position::new(300, 300), true);
        assert!(designer.drag_node(NodeId::Persisted(eng), Position::new(320, 340), false));
        designer.save(&repo).await.unwrap();

        let cto_item = repo.find_by_id(cto).await.unwrap().unwrap();
        assert_eq!(cto_item.parent_id, Some(ceo));
        assert_eq!(cto_item.level, 1);
        let eng_item = repo.find_by_id(eng).await.unwrap().unwrap();
        assert_eq!(eng_item.level, 2);
        assert_eq!((eng_item.position_x, eng_item.position_y), (320, 340));
    }

    #[tokio::test]
    async fn test_saving_search_view_keeps_levels() {
        let repo = setup_test_db();
        let [_, _, _, eng] = seed(&repo).await;

        let mut designer = ChartDesigner::new(DesignerConfig::default(), Capabilities::all());
        let filter = LoadFilter { root: None, search: Some("engineer".into()) };
        designer.reload(&repo, &filter).await.unwrap();

        designer.drag_node(NodeId::Persisted(eng), Position::new(40, 40), true);
        designer.drag_node(NodeId::Persisted(eng), Position::new(60, 80), false);
        designer.save(&repo).await.unwrap();

        let eng_item = repo.find_by_id(eng).await.unwrap().unwrap();
        assert_eq!(eng_item.level, 2);
        assert_eq!((eng_item.position_x, eng_item.position_y), (60, 80));
    }
}
