//! Structural utilities over immutable trees.
//!
//! Every editing function borrows the current tree and returns a new one;
//! the input is never touched, so callers can keep the previous value for
//! comparison or restoration. The `try_*` variants report why an edit was
//! refused, the plain variants log the refusal and hand back an unchanged
//! copy.

use uuid::Uuid;

use crate::error::TreeError;

/// A node of an editable tree.
///
/// Containers expose `children`, leaves return `None`.
pub trait TreeNode: Clone {
    /// Shallow patch type accepted by [`update_item_in_tree`].
    type Update;

    /// Identifier of this node, if one has been assigned.
    fn uuid(&self) -> Option<&str>;

    /// Replace the identifier of this node.
    fn set_uuid(&mut self, uuid: Option<String>);

    /// Ordered children, or `None` for leaves.
    fn children(&self) -> Option<&[Self]>;

    /// Mutable ordered children, or `None` for leaves.
    fn children_mut(&mut self) -> Option<&mut Vec<Self>>;

    /// Merge a patch onto this node.
    fn apply_update(&mut self, update: &Self::Update);

    /// Check if this node may hold children.
    fn is_container(&self) -> bool {
        self.children().is_some()
    }
}

/// Generate a fresh node identifier.
pub fn new_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Depth-first search returning the first node, in children order, that
/// satisfies `predicate`. The root itself is checked first.
pub fn find_node<'a, T, P>(tree: &'a T, predicate: P) -> Option<&'a T>
where
    T: TreeNode,
    P: Fn(&T) -> bool,
{
    nodes(tree).find(|node| predicate(node))
}

/// Find the node with the given identifier.
pub fn find_item<'a, T: TreeNode>(tree: &'a T, uuid: &str) -> Option<&'a T> {
    find_node(tree, |node| node.uuid() == Some(uuid))
}

/// Path from the root down to the node with the given identifier, both ends
/// included.
pub fn find_lineage<'a, T: TreeNode>(tree: &'a T, uuid: &str) -> Option<Vec<&'a T>> {
    fn walk<'a, T: TreeNode>(node: &'a T, uuid: &str, path: &mut Vec<&'a T>) -> bool {
        path.push(node);
        if node.uuid() == Some(uuid) {
            return true;
        }
        for child in node.children().unwrap_or_default() {
            if walk(child, uuid, path) {
                return true;
            }
        }
        path.pop();
        false
    }

    let mut path = Vec::new();
    walk(tree, uuid, &mut path).then_some(path)
}

/// Parent of the node with the given identifier. `None` for the root or
/// unknown identifiers.
pub fn find_parent<'a, T: TreeNode>(tree: &'a T, uuid: &str) -> Option<&'a T> {
    let lineage = find_lineage(tree, uuid)?;
    lineage.len().checked_sub(2).map(|i| lineage[i])
}

/// Check if a strict descendant of `ancestor` carries the given identifier.
pub fn is_descendant<T: TreeNode>(ancestor: &T, uuid: &str) -> bool {
    ancestor
        .children()
        .unwrap_or_default()
        .iter()
        .any(|child| find_item(child, uuid).is_some())
}

/// Check if `item` may be dropped into `target`.
///
/// Refused when the target is not a container, is the item itself, or lies
/// inside the item's subtree. Moving an item into its current parent is
/// allowed.
pub fn can_move<T: TreeNode>(item: &T, target: &T) -> bool {
    if !target.is_container() {
        return false;
    }
    match (item.uuid(), target.uuid()) {
        (Some(item_uuid), Some(target_uuid)) => {
            item_uuid != target_uuid && !is_descendant(item, target_uuid)
        }
        _ => true,
    }
}

/// Append a copy of `template` under `parent_uuid` with freshly assigned
/// identifiers. Returns the new tree and the identifier of the added node.
pub fn try_add_item_to_tree<T: TreeNode>(
    tree: &T,
    parent_uuid: &str,
    template: &T,
) -> Result<(T, String), TreeError> {
    let mut item = template.clone();
    let uuid = new_uuid();
    item.set_uuid(Some(uuid.clone()));
    assign_missing(&mut item);

    let new_tree = try_insert_item_in_tree(tree, parent_uuid, item)?;
    Ok((new_tree, uuid))
}

/// Append `item` under `parent_uuid` keeping the identifiers it already
/// carries. Used for nodes whose identity was decided elsewhere, such as
/// copies created by the explorer service.
pub fn try_insert_item_in_tree<T: TreeNode>(
    tree: &T,
    parent_uuid: &str,
    item: T,
) -> Result<T, TreeError> {
    let mut new_tree = tree.clone();
    let parent = find_item_mut(&mut new_tree, parent_uuid)
        .ok_or_else(|| TreeError::not_found(parent_uuid))?;
    let children = parent
        .children_mut()
        .ok_or_else(|| TreeError::NotAFolder {
            uuid: parent_uuid.to_string(),
        })?;
    children.push(item);
    Ok(new_tree)
}

/// Total form of [`try_add_item_to_tree`].
pub fn add_item_to_tree<T: TreeNode>(tree: &T, parent_uuid: &str, template: &T) -> T {
    match try_add_item_to_tree(tree, parent_uuid, template) {
        Ok((new_tree, _)) => new_tree,
        Err(e) => {
            tracing::debug!(error = %e, "add ignored");
            tree.clone()
        }
    }
}

/// Merge `update` onto the node with the given identifier.
pub fn try_update_item_in_tree<T: TreeNode>(
    tree: &T,
    uuid: &str,
    update: &T::Update,
) -> Result<T, TreeError> {
    let mut new_tree = tree.clone();
    let item = find_item_mut(&mut new_tree, uuid).ok_or_else(|| TreeError::not_found(uuid))?;
    item.apply_update(update);
    Ok(new_tree)
}

/// Total form of [`try_update_item_in_tree`].
pub fn update_item_in_tree<T: TreeNode>(tree: &T, uuid: &str, update: &T::Update) -> T {
    try_update_item_in_tree(tree, uuid, update).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "update ignored");
        tree.clone()
    })
}

/// Remove the node with the given identifier along with its subtree.
pub fn try_delete_item_from_tree<T: TreeNode>(tree: &T, uuid: &str) -> Result<T, TreeError> {
    if tree.uuid() == Some(uuid) {
        return Err(TreeError::RootItem {
            uuid: uuid.to_string(),
        });
    }
    let mut new_tree = tree.clone();
    remove_item(&mut new_tree, uuid).ok_or_else(|| TreeError::not_found(uuid))?;
    Ok(new_tree)
}

/// Total form of [`try_delete_item_from_tree`].
pub fn delete_item_from_tree<T: TreeNode>(tree: &T, uuid: &str) -> T {
    try_delete_item_from_tree(tree, uuid).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "delete ignored");
        tree.clone()
    })
}

/// Detach `item` from its parent and append it to `destination`.
///
/// Both nodes are resolved by identifier against `tree`, so stale copies
/// held by the caller are fine. The legality check is [`can_move`] applied
/// to the resolved nodes.
pub fn try_move_item_in_tree<T: TreeNode>(
    tree: &T,
    item: &T,
    destination: &T,
) -> Result<T, TreeError> {
    let item_uuid = item.uuid().ok_or_else(|| TreeError::not_found(""))?;
    let destination_uuid = destination
        .uuid()
        .ok_or_else(|| TreeError::not_found(""))?;

    let current_item =
        find_item(tree, item_uuid).ok_or_else(|| TreeError::not_found(item_uuid))?;
    let current_destination =
        find_item(tree, destination_uuid).ok_or_else(|| TreeError::not_found(destination_uuid))?;

    if !current_destination.is_container() {
        return Err(TreeError::NotAFolder {
            uuid: destination_uuid.to_string(),
        });
    }
    if !can_move(current_item, current_destination) {
        return Err(TreeError::IllegalMove {
            item: item_uuid.to_string(),
            target: destination_uuid.to_string(),
        });
    }

    let mut new_tree = try_delete_item_from_tree(tree, item_uuid)?;
    let moved = current_item.clone();
    // The destination is not inside the moved subtree, so it survived the removal.
    let children = find_item_mut(&mut new_tree, destination_uuid)
        .and_then(|node| node.children_mut())
        .ok_or_else(|| TreeError::not_found(destination_uuid))?;
    children.push(moved);

    Ok(new_tree)
}

/// Total form of [`try_move_item_in_tree`].
pub fn move_item_in_tree<T: TreeNode>(tree: &T, item: &T, destination: &T) -> T {
    try_move_item_in_tree(tree, item, destination).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "move rejected");
        tree.clone()
    })
}

/// Give every node lacking an identifier a fresh one. Existing identifiers
/// are kept, so applying this twice changes nothing the second time.
pub fn assign_random_uuids<T: TreeNode>(tree: &T) -> T {
    let mut new_tree = tree.clone();
    assign_missing(&mut new_tree);
    new_tree
}

/// Copy of `tree` with fresh identifiers on every node, used when
/// duplicating a subtree.
pub fn reassign_uuids<T: TreeNode>(tree: &T) -> T {
    let mut new_tree = strip_uuids(tree);
    assign_missing(&mut new_tree);
    new_tree
}

/// Copy of `tree` with every identifier removed.
pub fn strip_uuids<T: TreeNode>(tree: &T) -> T {
    fn strip<T: TreeNode>(node: &mut T) {
        node.set_uuid(None);
        for child in node.children_mut().into_iter().flatten() {
            strip(child);
        }
    }

    let mut new_tree = tree.clone();
    strip(&mut new_tree);
    new_tree
}

/// Visit every node depth first. The callback receives the ancestors of the
/// node (root first) and the node itself.
pub fn iterate_nodes<T, F>(tree: &T, mut callback: F)
where
    T: TreeNode,
    F: FnMut(&[&T], &T),
{
    fn walk<'a, T: TreeNode, F: FnMut(&[&T], &T)>(
        node: &'a T,
        lineage: &mut Vec<&'a T>,
        callback: &mut F,
    ) {
        callback(lineage.as_slice(), node);
        lineage.push(node);
        for child in node.children().unwrap_or_default() {
            walk(child, lineage, callback);
        }
        lineage.pop();
    }

    walk(tree, &mut Vec::new(), &mut callback);
}

/// Depth-first pre-order iterator over a tree.
pub fn nodes<T: TreeNode>(tree: &T) -> Nodes<'_, T> {
    Nodes { stack: vec![tree] }
}

/// Total number of nodes, root included.
pub fn count_nodes<T: TreeNode>(tree: &T) -> usize {
    nodes(tree).count()
}

/// Iterator returned by [`nodes`].
#[derive(Debug)]
pub struct Nodes<'a, T> {
    stack: Vec<&'a T>,
}

impl<'a, T: TreeNode> Iterator for Nodes<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let Some(children) = node.children() {
            self.stack.extend(children.iter().rev());
        }
        Some(node)
    }
}

fn find_item_mut<'a, T: TreeNode>(node: &'a mut T, uuid: &str) -> Option<&'a mut T> {
    if node.uuid() == Some(uuid) {
        return Some(node);
    }
    node.children_mut()?
        .iter_mut()
        .find_map(|child| find_item_mut(child, uuid))
}

fn remove_item<T: TreeNode>(node: &mut T, uuid: &str) -> Option<T> {
    let children = node.children_mut()?;
    if let Some(pos) = children.iter().position(|c| c.uuid() == Some(uuid)) {
        return Some(children.remove(pos));
    }
    children
        .iter_mut()
        .find_map(|child| remove_item(child, uuid))
}

fn assign_missing<T: TreeNode>(node: &mut T) {
    if node.uuid().is_none() {
        node.set_uuid(Some(new_uuid()));
    }
    for child in node.children_mut().into_iter().flatten() {
        assign_missing(child);
    }
}
