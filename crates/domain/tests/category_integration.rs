//! Integration tests for categories and the category tree.

use document_store::InMemoryDocumentStore;
use domain::{
    AttributeDefinition, AttributeKind, Category, CategoryError, CategoryNode, CategoryService,
    CreateCategory, DomainError, Repository, TreeStrategy, UpdateCategory,
};

fn create_service() -> (CategoryService<InMemoryDocumentStore>, InMemoryDocumentStore) {
    let store = InMemoryDocumentStore::new();
    (CategoryService::new(store.clone()), store)
}

fn names(nodes: &[CategoryNode]) -> Vec<String> {
    nodes.iter().map(|n| n.category.name.clone()).collect()
}

#[tokio::test]
async fn tree_strategies_over_stored_categories() {
    let (service, _) = create_service();

    let home = service
        .create_category(CreateCategory::new("Home").with_display_order(1))
        .await
        .unwrap();
    let garden = service
        .create_category(CreateCategory::new("Garden").with_display_order(2))
        .await
        .unwrap();
    let kitchen = service
        .create_category(CreateCategory::new("Kitchen").with_parent(home.id))
        .await
        .unwrap();
    service
        .create_category(CreateCategory::new("Knives").with_parent(kitchen.id))
        .await
        .unwrap();
    service
        .create_category(CreateCategory::new("Tools").with_parent(garden.id))
        .await
        .unwrap();

    let flat = service.list_tree(TreeStrategy::RootsOnly).await.unwrap();
    assert_eq!(names(&flat), vec!["Home", "Garden"]);
    assert_eq!(names(&flat[0].subcategories), vec!["Kitchen"]);
    assert!(flat[0].subcategories[0].subcategories.is_empty());
    assert_eq!(names(&flat[1].subcategories), vec!["Tools"]);

    let nested = service.list_tree(TreeStrategy::Nested).await.unwrap();
    assert_eq!(names(&nested[0].subcategories[0].subcategories), vec!["Knives"]);
    assert_eq!(
        nested.iter().map(CategoryNode::node_count).sum::<usize>(),
        5
    );
}

#[tokio::test]
async fn tree_serializes_with_category_fields_inline() {
    let (service, _) = create_service();
    let root = service
        .create_category(CreateCategory {
            attributes: vec![AttributeDefinition::new("size", AttributeKind::Select)],
            ..CreateCategory::new("Apparel")
        })
        .await
        .unwrap();
    service
        .create_category(CreateCategory::new("Hats").with_parent(root.id))
        .await
        .unwrap();

    let tree = service.list_tree(TreeStrategy::default()).await.unwrap();
    let json = serde_json::to_value(&tree).unwrap();

    assert_eq!(json[0]["slug"], "apparel");
    assert_eq!(json[0]["attributes"][0]["type"], "select");
    assert!(json[0]["parent"].is_null());
    assert_eq!(json[0]["subcategories"][0]["name"], "Hats");
    assert_eq!(json[0]["subcategories"][0]["parent_summary"]["slug"], "apparel");
}

#[tokio::test]
async fn moving_a_category_keeps_the_forest() {
    let (service, _) = create_service();
    let a = service
        .create_category(CreateCategory::new("A"))
        .await
        .unwrap();
    let b = service
        .create_category(CreateCategory::new("B"))
        .await
        .unwrap();
    let c = service
        .create_category(CreateCategory::new("C").with_parent(a.id))
        .await
        .unwrap();

    service
        .update_category(
            b.id,
            UpdateCategory {
                parent: Some(c.id),
                ..UpdateCategory::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(service.full_path(b.id).await.unwrap(), "A > C > B");

    let result = service
        .update_category(
            a.id,
            UpdateCategory {
                parent: Some(b.id),
                ..UpdateCategory::default()
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(DomainError::Category(CategoryError::InvalidParent { .. }))
    ));
}

#[tokio::test]
async fn full_path_refuses_stored_cycles() {
    let (service, store) = create_service();
    let x = service
        .create_category(CreateCategory::new("X"))
        .await
        .unwrap();
    let y = service
        .create_category(CreateCategory::new("Y").with_parent(x.id))
        .await
        .unwrap();

    // Only a direct write can produce a cycle.
    let repo: Repository<_, Category> = Repository::new(store);
    let mut looped = x.clone();
    looped.parent = Some(y.id);
    repo.save(&looped).await.unwrap();

    let result = service.full_path(y.id).await;
    assert!(matches!(
        result,
        Err(DomainError::Category(CategoryError::CycleDetected { .. }))
    ));

    let tree = service.list_tree(TreeStrategy::Nested).await.unwrap();
    assert!(tree.is_empty());
}

#[tokio::test]
async fn full_path_stops_at_missing_ancestor() {
    let (service, store) = create_service();
    let a = service
        .create_category(CreateCategory::new("A"))
        .await
        .unwrap();
    let b = service
        .create_category(CreateCategory::new("B").with_parent(a.id))
        .await
        .unwrap();

    let repo: Repository<_, Category> = Repository::new(store);
    repo.delete(a.id).await.unwrap();

    assert_eq!(service.full_path(b.id).await.unwrap(), "B");
    let detail = service.get_by_slug("b").await.unwrap().unwrap();
    assert!(detail.parent_summary.is_none());
}
