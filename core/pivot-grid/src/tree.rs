//! FILENAME: core/pivot-grid/src/tree.rs
//! Generic depth-first helpers over ordered trees.
//!
//! Nodes own their children as ordered vectors; there are no parent links,
//! every walk goes downward from a root.

use std::ptr;

/// A node exposing its ordered children. No children means leaf.
pub trait TreeNode: Sized {
    fn children(&self) -> &[Self];

    fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }
}

// ============================================================================
// LEAVES
// ============================================================================

/// Leaves of a tree, depth-first and left to right. A leaf root yields itself.
pub fn get_tree_leaves<T: TreeNode>(root: &T) -> Vec<&T> {
    let mut leaves = Vec::new();
    collect_leaves(root, &mut leaves);
    leaves
}

/// Leaves of a forest, treating the roots as children of an implicit super-root.
pub fn get_forest_leaves<T: TreeNode>(roots: &[T]) -> Vec<&T> {
    let mut leaves = Vec::new();
    for root in roots {
        collect_leaves(root, &mut leaves);
    }
    leaves
}

fn collect_leaves<'a, T: TreeNode>(node: &'a T, leaves: &mut Vec<&'a T>) {
    if node.is_leaf() {
        leaves.push(node);
        return;
    }
    for child in node.children() {
        collect_leaves(child, leaves);
    }
}

// ============================================================================
// PATH LOOKUP
// ============================================================================

/// Path of child indices from `root` to `target`, matched by identity.
///
/// Empty path when `target` is the root itself, `None` when absent.
pub fn index_of_tree_node<T: TreeNode>(target: &T, root: &T) -> Option<Vec<usize>> {
    index_of_tree_node_by(target, root, |candidate, target| ptr::eq(candidate, target))
}

/// Like [`index_of_tree_node`] with a custom predicate `(candidate, target)`.
///
/// The first match in depth-first, left-to-right order wins; later matches
/// of a non-unique predicate are never reported.
pub fn index_of_tree_node_by<T, F>(target: &T, root: &T, matches: F) -> Option<Vec<usize>>
where
    T: TreeNode,
    F: Fn(&T, &T) -> bool,
{
    let mut path = Vec::new();
    if find_path(target, root, &matches, &mut path) {
        Some(path)
    } else {
        None
    }
}

/// Path into a forest: the first index selects the root.
pub fn index_of_forest_node<T: TreeNode>(target: &T, roots: &[T]) -> Option<Vec<usize>> {
    index_of_forest_node_by(target, roots, |candidate, target| ptr::eq(candidate, target))
}

pub fn index_of_forest_node_by<T, F>(target: &T, roots: &[T], matches: F) -> Option<Vec<usize>>
where
    T: TreeNode,
    F: Fn(&T, &T) -> bool,
{
    let mut path = Vec::new();
    for (index, root) in roots.iter().enumerate() {
        path.push(index);
        if find_path(target, root, &matches, &mut path) {
            return Some(path);
        }
        path.pop();
    }
    None
}

fn find_path<T, F>(target: &T, node: &T, matches: &F, path: &mut Vec<usize>) -> bool
where
    T: TreeNode,
    F: Fn(&T, &T) -> bool,
{
    if matches(node, target) {
        return true;
    }
    for (index, child) in node.children().iter().enumerate() {
        path.push(index);
        if find_path(target, child, matches, path) {
            return true;
        }
        path.pop();
    }
    false
}

/// Resolves a path produced by [`index_of_tree_node`].
pub fn node_at_path<'a, T: TreeNode>(root: &'a T, path: &[usize]) -> Option<&'a T> {
    path.iter()
        .try_fold(root, |node, &index| node.children().get(index))
}

/// Resolves a path produced by [`index_of_forest_node`].
pub fn node_at_forest_path<'a, T: TreeNode>(roots: &'a [T], path: &[usize]) -> Option<&'a T> {
    let (first, rest) = path.split_first()?;
    node_at_path(roots.get(*first)?, rest)
}
