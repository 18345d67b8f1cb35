use doctree_core::tree::{
    add_item_to_tree, count_nodes, delete_item_from_tree, find_item, find_parent,
    move_item_in_tree, nodes, try_add_item_to_tree,
};
use doctree_core::{
    ClientConfig, ConfigError, DocRef, ExpressionItem, Op, PermissionInheritance, TreeError,
    TreeNode,
};

fn explorer_tree() -> DocRef {
    DocRef::new_folder("root", "System")
        .with_child(
            DocRef::new_folder("feeds", "Feeds")
                .with_child(DocRef::new_document("feed-a", "Feed", "FEED_A"))
                .with_child(DocRef::new_document("feed-b", "Feed", "FEED_B")),
        )
        .with_child(DocRef::new_folder("dictionaries", "Dictionaries"))
}

#[test]
fn test_add_term_to_empty_operator() {
    let tree = ExpressionItem::operator(Op::And, vec![]).with_uuid("root");
    let before = tree.clone();

    let (new_tree, added) =
        try_add_item_to_tree(&tree, "root", &ExpressionItem::new_term()).unwrap();

    assert_eq!(tree, before);
    let children = new_tree.children().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].uuid(), Some(added.as_str()));
    assert!(children[0].is_term());
    assert!(children[0].enabled());
}

#[test]
fn test_added_operator_gets_fresh_ids_each_time() {
    let tree = ExpressionItem::operator(Op::And, vec![]).with_uuid("root");
    let template = ExpressionItem::new_operator();

    let once = add_item_to_tree(&tree, "root", &template);
    let twice = add_item_to_tree(&once, "root", &template);

    let ids: Vec<_> = twice.children().unwrap().iter().map(|c| c.uuid()).collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

#[test]
fn test_add_to_unknown_parent_is_not_found() {
    let tree = explorer_tree();
    let err = try_add_item_to_tree(&tree, "nowhere", &DocRef::new_folder("", "New")).unwrap_err();
    assert_eq!(err, TreeError::not_found("nowhere"));
}

#[test]
fn test_move_document_between_folders() {
    let tree = explorer_tree();
    let feed = find_item(&tree, "feed-a").unwrap().clone();
    let dictionaries = find_item(&tree, "dictionaries").unwrap().clone();

    let moved = move_item_in_tree(&tree, &feed, &dictionaries);

    assert_eq!(find_parent(&moved, "feed-a").unwrap().uuid, "dictionaries");
    assert_eq!(find_parent(&tree, "feed-a").unwrap().uuid, "feeds");
    assert_eq!(count_nodes(&moved), count_nodes(&tree));
}

#[test]
fn test_move_into_document_is_rejected() {
    let tree = explorer_tree();
    let feed_a = find_item(&tree, "feed-a").unwrap().clone();
    let feed_b = find_item(&tree, "feed-b").unwrap().clone();
    assert_eq!(move_item_in_tree(&tree, &feed_a, &feed_b), tree);
}

#[test]
fn test_delete_unknown_is_noop() {
    let tree = explorer_tree();
    assert_eq!(delete_item_from_tree(&tree, "nope"), tree);
}

#[test]
fn test_nodes_preorder() {
    let tree = explorer_tree();
    let order: Vec<_> = nodes(&tree).map(|n| n.uuid.as_str()).collect();
    assert_eq!(
        order,
        vec!["root", "feeds", "feed-a", "feed-b", "dictionaries"]
    );
}

#[test]
fn test_config_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doctree.toml");
    std::fs::write(
        &path,
        r#"
explorer_service_url = "http://localhost:8080/api/explorer/v1"
permission_inheritance = "COMBINED"
"#,
    )
    .unwrap();

    let config = ClientConfig::load(&path).unwrap();
    assert_eq!(config.request_timeout_secs, 30);
    assert_eq!(config.permission_inheritance, PermissionInheritance::Combined);
    assert!(config.user_agent.starts_with("doctree/"));
}

#[test]
fn test_config_load_rejects_bad_url() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doctree.toml");
    std::fs::write(&path, "explorer_service_url = \"localhost\"\n").unwrap();

    assert!(matches!(
        ClientConfig::load(&path),
        Err(ConfigError::Invalid { .. })
    ));
}

#[test]
fn test_config_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        ClientConfig::load(dir.path().join("absent.toml")),
        Err(ConfigError::Io { .. })
    ));
}
