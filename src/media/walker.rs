//! Bounded depth-first discovery of photo leaves

use super::{MediaNode, PhotoCandidate};

/// Collect up to `limit` photo leaves from a media tree.
///
/// Depth-first, pre-order: a qualifying node is emitted before its children
/// are visited, children in the order the tree presents them. The traversal
/// short-circuits as soon as `limit` candidates are collected; subtrees past
/// that point are never visited, which matters on large trees.
///
/// An empty result is a normal outcome, not an error.
///
/// Precondition: the tree is acyclic. No cycle detection is performed; a
/// cyclic host tree diverges.
pub fn collect_photos(root: &dyn MediaNode, limit: usize) -> Vec<PhotoCandidate> {
    let mut found = Vec::new();
    if limit == 0 {
        return found;
    }
    visit(root, limit, &mut found);
    tracing::debug!(count = found.len(), limit, "photo discovery finished");
    found
}

fn visit(node: &dyn MediaNode, limit: usize, found: &mut Vec<PhotoCandidate>) {
    if node.is_photo_leaf() {
        tracing::debug!(title = node.title(), "found photo");
        found.push(PhotoCandidate {
            name: node.title().to_string(),
            content_id: node.content_id().to_string(),
        });
        if found.len() >= limit {
            return;
        }
    }

    for child in node.children() {
        visit(child, limit, found);
        if found.len() >= limit {
            return;
        }
    }
}
