//! Split/merge operations on the bintree, kept independent of `Patch`: a forced split can walk
//! into a neighboring patch's nodes, so these operate purely in terms of `NodeHandle`s against
//! the shared `NodePool`/`VertexSlotPool`, with no notion of which patch a node belongs to.

use crate::pool::{NodePool, VertexSlotPool};
use crate::tri_node::NodeHandle;

/// Forces `t` to have children, preserving the crack-free (diamond) invariant.
///
/// Mirrors the classic ROAM `CTriTreeNode::Split`: `t`'s own children are linked in *before* the
/// base-neighbor is forced to split (step 9), so that if the forced split recurses back into `t`
/// (because `t` is `bn`'s base neighbor too), it sees `t` already split and performs the
/// cross-wire itself instead of recursing forever.
pub fn split(pool: &mut NodePool, slots: &mut VertexSlotPool, t: NodeHandle) {
    if pool.get(t).left_child.is_some() {
        return;
    }

    // Step 2: not in a diamond with our base neighbor yet — force it to split first.
    if let Some(bn) = pool.get(t).base_neighbor {
        if pool.get(bn).base_neighbor != Some(t) {
            split(pool, slots, bn);
        }
    }

    // Step 3: allocate children, aborting cleanly if the pool is exhausted.
    let left = match pool.allocate() {
        Ok(h) => h,
        Err(_) => return,
    };
    let right = match pool.allocate() {
        Ok(h) => h,
        Err(_) => {
            pool.release(left);
            return;
        }
    };

    // Step 4: t is no longer a rendered leaf; release its slot and clear ancestors' is_rendered.
    if pool.get(t).is_rendered {
        if let Some(slot) = pool.get(t).vertex_slot {
            slots.release(slot);
        }
        let parent = pool.get(t).parent;
        let node = pool.get_mut(t);
        node.vertex_slot = None;
        node.is_rendered = false;
        clear_ancestors_rendered(pool, parent);
    }
    // Step 5: the subtree under t is no longer fully tessellated.
    let parent = pool.get(t).parent;
    clear_ancestors_tessellated(pool, parent);

    // Step 6: parentage and sibling cross-links.
    {
        let left_node = pool.get_mut(left);
        left_node.parent = Some(t);
        left_node.left_neighbor = Some(right);
    }
    {
        let right_node = pool.get_mut(right);
        right_node.parent = Some(t);
        right_node.right_neighbor = Some(left);
    }

    // Step 7: inherit legs from t's own leg neighbors.
    let t_left_neighbor = pool.get(t).left_neighbor;
    let t_right_neighbor = pool.get(t).right_neighbor;
    pool.get_mut(left).base_neighbor = t_left_neighbor;
    pool.get_mut(right).base_neighbor = t_right_neighbor;

    // Step 8: rewrite back-links on t's leg neighbors to point at the new children.
    if let Some(ln) = t_left_neighbor {
        rewrite_backlink(pool, ln, t, left);
    }
    if let Some(rn) = t_right_neighbor {
        rewrite_backlink(pool, rn, t, right);
    }

    // Link t to its new children now, before the base-neighbor cross-wire: a forced split of bn
    // (below) may check back on t's children, and they must already be visible.
    pool.get_mut(t).left_child = Some(left);
    pool.get_mut(t).right_child = Some(right);

    // Step 9/10: cross-wire along the shared hypotenuse with the base neighbor, if any.
    match pool.get(t).base_neighbor {
        Some(bn) => match pool.get(bn).left_child {
            Some(bn_left) => {
                let bn_right = pool.get(bn).right_child.expect("bintree shape invariant");
                pool.get_mut(bn_left).right_neighbor = Some(right);
                pool.get_mut(bn_right).left_neighbor = Some(left);
                pool.get_mut(left).right_neighbor = Some(bn_right);
                pool.get_mut(right).left_neighbor = Some(bn_left);
            }
            None => split(pool, slots, bn),
        },
        None => {
            pool.get_mut(left).right_neighbor = None;
            pool.get_mut(right).left_neighbor = None;
        }
    }
}

/// Replaces whichever of `neighbor`'s three neighbor slots equals `old` with `new`. Per the
/// neighbor-symmetry invariant, exactly one slot matches.
fn rewrite_backlink(pool: &mut NodePool, neighbor: NodeHandle, old: NodeHandle, new: NodeHandle) {
    let node = pool.get_mut(neighbor);
    if node.base_neighbor == Some(old) {
        node.base_neighbor = Some(new);
    } else if node.left_neighbor == Some(old) {
        node.left_neighbor = Some(new);
    } else if node.right_neighbor == Some(old) {
        node.right_neighbor = Some(new);
    }
}

/// Walks from `start` upward clearing `is_rendered`. Stops as soon as a node is already clear:
/// an internal node's `is_rendered` can only be true if both its children were, so once one is
/// false its ancestors must already have been cleared by a prior call.
fn clear_ancestors_rendered(pool: &mut NodePool, start: Option<NodeHandle>) {
    let mut cursor = start;
    while let Some(handle) = cursor {
        let node = pool.get_mut(handle);
        if !node.is_rendered {
            break;
        }
        node.is_rendered = false;
        cursor = node.parent;
    }
}

/// Same shape as `clear_ancestors_rendered`, for `is_tessellated`. Kept as a distinct function
/// rather than a shared helper with a flag argument: the two flags get cleared at different
/// points in `split` for different reasons, and a single helper that conflates them ends up
/// clearing the wrong flag on one of those call sites.
fn clear_ancestors_tessellated(pool: &mut NodePool, start: Option<NodeHandle>) {
    let mut cursor = start;
    while let Some(handle) = cursor {
        let node = pool.get_mut(handle);
        if !node.is_tessellated {
            break;
        }
        node.is_tessellated = false;
        cursor = node.parent;
    }
}

/// True iff `t` has children and neither child itself has children.
pub fn mergable(pool: &NodePool, t: NodeHandle) -> bool {
    match (pool.get(t).left_child, pool.get(t).right_child) {
        (Some(l), Some(r)) => pool.get(l).left_child.is_none() && pool.get(r).left_child.is_none(),
        _ => false,
    }
}

/// Collapses `t`'s two children back into `t`, releasing their vertex slots and pool handles.
pub fn merge(pool: &mut NodePool, slots: &mut VertexSlotPool, t: NodeHandle) {
    let left_child = pool.get(t).left_child.expect("merge requires children");
    let right_child = pool.get(t).right_child.expect("merge requires children");

    for (c, is_left) in [(left_child, true), (right_child, false)] {
        let Some(bn) = pool.get(c).base_neighbor else {
            continue;
        };
        let bn_was_base_of_c = pool.get(bn).base_neighbor == Some(c);
        repoint_neighbor_slots(pool, bn, c, t);
        if bn_was_base_of_c {
            if let Some(bp) = pool.get(bn).parent {
                // "t's corresponding side-neighbor": the leg that inherited this child's base
                // neighbor at split time (left_neighbor for the left child, right_neighbor for
                // the right child).
                let t_side = if is_left {
                    pool.get(t).left_neighbor
                } else {
                    pool.get(t).right_neighbor
                };
                if t_side == Some(bp) {
                    let t_node = pool.get_mut(t);
                    if is_left {
                        t_node.left_neighbor = Some(bn);
                    } else {
                        t_node.right_neighbor = Some(bn);
                    }
                }
                repoint_neighbor_slots(pool, bp, c, t);
            }
        }
    }

    for c in [left_child, right_child] {
        if pool.get(c).is_rendered {
            if let Some(slot) = pool.get(c).vertex_slot {
                slots.release(slot);
            }
            clear_ancestors_rendered(pool, Some(t));
        }
    }

    for c in [left_child, right_child] {
        pool.release(c);
    }
    let t_node = pool.get_mut(t);
    t_node.left_child = None;
    t_node.right_child = None;
}

/// Replaces any of `node`'s three neighbor slots equal to `from` with `to`.
fn repoint_neighbor_slots(pool: &mut NodePool, node: NodeHandle, from: NodeHandle, to: NodeHandle) {
    let n = pool.get_mut(node);
    if n.base_neighbor == Some(from) {
        n.base_neighbor = Some(to);
    }
    if n.left_neighbor == Some(from) {
        n.left_neighbor = Some(to);
    }
    if n.right_neighbor == Some(from) {
        n.right_neighbor = Some(to);
    }
}

/// Recursively merges the subtree rooted at `t` toward `t`, stopping wherever merging would
/// create a crack.
pub fn merge_down(pool: &mut NodePool, slots: &mut VertexSlotPool, t: NodeHandle) {
    if pool.get(t).left_child.is_none() {
        return;
    }

    if mergable(pool, t) {
        match pool.get(t).base_neighbor {
            None => merge(pool, slots, t),
            Some(bn) => {
                if mergable(pool, bn) {
                    merge(pool, slots, bn);
                    merge(pool, slots, t);
                }
                // Else: merging would crack the mesh against `bn`; leave both split.
            }
        }
        return;
    }

    let left = pool.get(t).left_child.expect("checked above");
    let right = pool.get(t).right_child.expect("checked above");
    merge_down(pool, slots, left);
    merge_down(pool, slots, right);
}
