//! Per-explorer view state.

use std::collections::{BTreeSet, HashMap, HashSet};

use indexmap::IndexSet;

use doctree_core::DocRef;
use doctree_core::tree::nodes;

/// View state of one explorer onto the shared document tree.
///
/// Open folders and selection belong to the explorer; visibility is derived
/// from the tree, the search term and the type filter, and only changes
/// through [`ExplorerState::recompute_visibility`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplorerState {
    search_term: String,
    is_folder_open: HashMap<String, bool>,
    selected: IndexSet<String>,
    is_visible: HashMap<String, bool>,
    allow_multi_select: bool,
    allow_drag_and_drop: bool,
    type_filter: Option<BTreeSet<String>>,
}

impl ExplorerState {
    /// Create the state of a freshly opened explorer.
    pub fn new(
        allow_multi_select: bool,
        allow_drag_and_drop: bool,
        type_filter: Option<BTreeSet<String>>,
    ) -> Self {
        Self {
            allow_multi_select,
            allow_drag_and_drop,
            type_filter,
            ..Default::default()
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn allow_multi_select(&self) -> bool {
        self.allow_multi_select
    }

    pub fn allow_drag_and_drop(&self) -> bool {
        self.allow_drag_and_drop
    }

    pub fn type_filter(&self) -> Option<&BTreeSet<String>> {
        self.type_filter.as_ref()
    }

    /// Check if a folder is expanded in this explorer.
    pub fn is_folder_open(&self, uuid: &str) -> bool {
        self.is_folder_open.get(uuid).copied().unwrap_or(false)
    }

    /// Check if any folder has been opened or closed in this explorer.
    pub fn has_open_state(&self) -> bool {
        !self.is_folder_open.is_empty()
    }

    /// Check if a node passes the current search and type filter.
    pub fn is_visible(&self, uuid: &str) -> bool {
        self.is_visible.get(uuid).copied().unwrap_or(false)
    }

    pub fn is_selected(&self, uuid: &str) -> bool {
        self.selected.contains(uuid)
    }

    /// The selected node in single-select explorers, or the most recently
    /// selected one in multi-select explorers.
    pub fn selected_uuid(&self) -> Option<&str> {
        self.selected.last().map(String::as_str)
    }

    /// All selected nodes in selection order.
    pub fn selected_uuids(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    /// Flip the open state of a folder.
    pub fn toggle_folder(&mut self, uuid: &str) {
        let open = self.is_folder_open.entry(uuid.to_string()).or_insert(false);
        *open = !*open;
    }

    /// Expand a folder.
    pub fn open_folder(&mut self, uuid: &str) {
        self.is_folder_open.insert(uuid.to_string(), true);
    }

    /// Select a node. Single-select explorers replace the selection,
    /// multi-select explorers toggle membership.
    pub fn select(&mut self, uuid: &str) {
        if self.allow_multi_select {
            if !self.selected.shift_remove(uuid) {
                self.selected.insert(uuid.to_string());
            }
        } else {
            self.selected.clear();
            self.selected.insert(uuid.to_string());
        }
    }

    /// Set the search term and refresh visibility.
    pub fn set_search_term(&mut self, search_term: impl Into<String>, tree: Option<&DocRef>) {
        self.search_term = search_term.into();
        self.recompute_visibility(tree);
    }

    /// Rebuild the visibility map from the tree, search term and type filter.
    pub fn recompute_visibility(&mut self, tree: Option<&DocRef>) {
        self.is_visible = match tree {
            Some(tree) => compute_visibility(tree, &self.search_term, self.type_filter.as_ref()),
            None => HashMap::new(),
        };
    }

    /// Drop open and selected entries for nodes no longer in the tree.
    pub fn prune(&mut self, tree: &DocRef) {
        let alive: HashSet<&str> = nodes(tree).map(|n| n.uuid.as_str()).collect();
        self.is_folder_open
            .retain(|uuid, _| alive.contains(uuid.as_str()));
        self.selected.retain(|uuid| alive.contains(uuid.as_str()));
    }
}

/// Visibility of every node for a search term and optional type filter.
///
/// A node is visible when its name contains the search term (ignoring case)
/// and its type is in the filter, or when any of its descendants is visible
/// so the path down to a match stays navigable. An empty term or filter
/// matches everything.
pub fn compute_visibility(
    tree: &DocRef,
    search_term: &str,
    type_filter: Option<&BTreeSet<String>>,
) -> HashMap<String, bool> {
    fn walk(
        node: &DocRef,
        term: &str,
        type_filter: Option<&BTreeSet<String>>,
        visible: &mut HashMap<String, bool>,
    ) -> bool {
        let mut any_child_visible = false;
        for child in node.children.iter().flatten() {
            // No short-circuit: every child needs an entry.
            any_child_visible |= walk(child, term, type_filter, visible);
        }

        let type_matches = type_filter
            .is_none_or(|types| types.is_empty() || types.contains(node.doc_type.as_str()));
        let term_matches = term.is_empty() || node.name.to_lowercase().contains(term);

        let is_visible = (type_matches && term_matches) || any_child_visible;
        visible.insert(node.uuid.clone(), is_visible);
        is_visible
    }

    let term = search_term.trim().to_lowercase();
    let mut visible = HashMap::new();
    walk(tree, &term, type_filter, &mut visible);
    visible
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> DocRef {
        DocRef::new_folder("root", "Root")
            .with_child(
                DocRef::new_folder("feeds", "Feeds")
                    .with_child(DocRef::new_document("f1", "Feed", "RAW_EVENTS")),
            )
            .with_child(DocRef::new_document("d1", "Dictionary", "Colours"))
    }

    #[test]
    fn test_type_filter_folder_only() {
        let tree = DocRef::new_folder("root", "Root")
            .with_child(DocRef::new_document("doc", "XSLT", "Transform"));
        let filter = BTreeSet::from(["Folder".to_string()]);
        let visible = compute_visibility(&tree, "", Some(&filter));

        assert_eq!(visible.get("root"), Some(&true));
        assert_eq!(visible.get("doc"), Some(&false));
    }

    #[test]
    fn test_search_keeps_ancestors_visible() {
        let visible = compute_visibility(&tree(), "raw", None);
        assert!(visible["f1"]);
        assert!(visible["feeds"]);
        assert!(visible["root"]);
        assert!(!visible["d1"]);
    }

    #[test]
    fn test_empty_term_shows_everything() {
        let visible = compute_visibility(&tree(), "  ", None);
        assert!(visible.values().all(|v| *v));
        assert_eq!(visible.len(), 4);
    }

    #[test]
    fn test_single_select_replaces() {
        let mut state = ExplorerState::new(false, false, None);
        state.select("a");
        state.select("b");
        assert_eq!(state.selected_uuid(), Some("b"));
        assert!(!state.is_selected("a"));
    }

    #[test]
    fn test_multi_select_toggles() {
        let mut state = ExplorerState::new(true, false, None);
        state.select("a");
        state.select("b");
        state.select("a");
        assert_eq!(state.selected_uuids().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_toggle_and_prune() {
        let mut state = ExplorerState::new(false, false, None);
        state.toggle_folder("feeds");
        state.toggle_folder("gone");
        state.select("gone");
        assert!(state.is_folder_open("feeds"));

        state.prune(&tree());
        assert!(state.is_folder_open("feeds"));
        assert!(!state.is_folder_open("gone"));
        assert!(state.selected_uuid().is_none());

        state.toggle_folder("feeds");
        assert!(!state.is_folder_open("feeds"));
    }

    #[test]
    fn test_search_term_recomputes() {
        let tree = tree();
        let mut state = ExplorerState::new(false, false, None);
        state.recompute_visibility(Some(&tree));
        assert!(state.is_visible("d1"));

        state.set_search_term("events", Some(&tree));
        assert!(!state.is_visible("d1"));
        assert!(state.is_visible("f1"));
    }
}
