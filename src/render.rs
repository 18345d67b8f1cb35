//! Plain-text rendering for the command line.

use itertools::Itertools;

use doctree_core::tree::{count_nodes, iterate_nodes};
use doctree_core::{DocRef, DocRefInfo};
use doctree_store::ExplorerState;

/// Render the nodes an explorer shows, indented by depth.
pub fn render_tree(tree: &DocRef, explorer: &ExplorerState, max_depth: Option<usize>) -> String {
    let mut lines = Vec::new();
    iterate_nodes(tree, |lineage, node| {
        let depth = lineage.len();
        if max_depth.is_some_and(|max| depth > max) || !explorer.is_visible(&node.uuid) {
            return;
        }
        lines.push(format_node(node, depth));
    });

    let shown = lines.len();
    let total = count_nodes(tree);
    let mut out = lines.into_iter().join("\n");
    out.push('\n');
    if shown < total {
        out.push_str(&format!("({shown} of {total} items shown)\n"));
    }
    out
}

fn format_node(node: &DocRef, depth: usize) -> String {
    let indent = "  ".repeat(depth);
    let marker = if node.is_folder() { "▼ " } else { "  " };
    format!(
        "{indent}{marker}{:<40} {:<14} {}",
        truncate(&node.name, 40),
        node.doc_type,
        node.uuid
    )
}

/// Render a list of document types, one per line, sorted.
pub fn render_types(types: &[String]) -> String {
    let mut out = types.iter().sorted().dedup().join("\n");
    out.push('\n');
    out
}

/// Render audit information for a document.
pub fn render_info(info: &DocRefInfo) -> String {
    let field = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
    [
        ("UUID", info.doc_ref.uuid.clone()),
        ("Type", info.doc_ref.doc_type.to_string()),
        ("Name", info.doc_ref.name.to_string()),
        ("Created", field(info.created_at().map(|t| t.to_rfc3339()))),
        ("Created by", field(info.create_user.clone())),
        ("Updated", field(info.updated_at().map(|t| t.to_rfc3339()))),
        ("Updated by", field(info.update_user.clone())),
        ("Other", field(info.other_info.clone())),
    ]
    .iter()
    .map(|(label, value)| format!("{label:<11} {value}\n"))
    .collect()
}

/// Truncate a string to max length.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 1).collect();
        format!("{head}…")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn tree() -> DocRef {
        DocRef::new_folder("root", "System")
            .with_child(
                DocRef::new_folder("feeds", "Feeds")
                    .with_child(DocRef::new_document("a", "Feed", "RAW_EVENTS")),
            )
            .with_child(DocRef::new_document("x", "XSLT", "Transform"))
    }

    #[test]
    fn test_render_search_result() {
        let tree = tree();
        let mut explorer = ExplorerState::new(false, false, None);
        explorer.set_search_term("raw", Some(&tree));

        let out = render_tree(&tree, &explorer, None);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("▼ System"));
        assert!(lines[1].starts_with("  ▼ Feeds"));
        assert!(lines[2].starts_with("      RAW_EVENTS"));
        assert_eq!(lines[3], "(3 of 4 items shown)");
    }

    #[test]
    fn test_render_depth_and_filter() {
        let tree = tree();
        let filter = BTreeSet::from(["Folder".to_string()]);
        let mut explorer = ExplorerState::new(false, false, Some(filter));
        explorer.recompute_visibility(Some(&tree));

        let out = render_tree(&tree, &explorer, Some(0));
        assert_eq!(out.lines().count(), 2);
        assert!(out.ends_with("(1 of 4 items shown)\n"));
    }

    #[test]
    fn test_render_types_sorted() {
        let types = vec!["XSLT".to_string(), "Feed".to_string(), "Feed".to_string()];
        assert_eq!(render_types(&types), "Feed\nXSLT\n");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
