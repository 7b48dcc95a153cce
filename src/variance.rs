//! Precomputed per-patch height variance, indexed as a complete binary tree over bintree nodes.

use crate::heightmap::Heightmap;
use crate::vector::GridPos;

/// One side's (left-root or right-root) variance array, `V[1..len)` indexed by bintree node
/// number; `V[0]` is unused. Computed once at `Patch` construction and never mutated again.
#[derive(Debug, Clone)]
pub struct VarianceTree {
    values: Vec<u8>,
}

impl VarianceTree {
    /// `depth` is `Config::variance_depth`; the tree holds `2^depth` slots.
    fn with_depth(depth: u32) -> Self {
        Self {
            values: vec![0u8; 1usize << depth],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `V[node]`, or `0` past the end of the precomputed array (node is deeper than
    /// `variance_depth`; `recurs_tessellate` treats that as "always split").
    pub fn get(&self, node: usize) -> u8 {
        self.values.get(node).copied().unwrap_or(0)
    }
}

/// Populates a `VarianceTree` of the given depth for one root triangle (`left`, `right`, `apex`
/// are its corners). The recursion is a free function (not a `VarianceTree` method) since it
/// needs mutable access to the array being built while reading `heightmap`, which reads cleaner
/// as a plain recursive helper than as a borrow-split method.
pub fn compute_variance(
    heightmap: &Heightmap,
    depth: u32,
    left: GridPos,
    right: GridPos,
    apex: GridPos,
) -> VarianceTree {
    let mut tree = VarianceTree::with_depth(depth);
    recurs_variance(heightmap, &mut tree, left, right, apex, 1);
    tree
}

/// Returns `local_var` for node `n`'s triangle and, for `n < tree.len()`, also stores
/// `V[n] = min(255, local_var + 1)`.
fn recurs_variance(
    heightmap: &Heightmap,
    tree: &mut VarianceTree,
    left: GridPos,
    right: GridPos,
    apex: GridPos,
    node: usize,
) -> u8 {
    let center = GridPos::midpoint(left, right);
    let center_z = heightmap.sample(center) as i32;
    let left_z = heightmap.sample(left) as i32;
    let right_z = heightmap.sample(right) as i32;
    let interpolated = (left_z + right_z) / 2;
    let mut local_var = (center_z - interpolated).unsigned_abs() as u8;

    if GridPos::abs_dx(left, right) >= 8 || GridPos::abs_dy(left, right) >= 8 {
        let left_child = recurs_variance(heightmap, tree, apex, left, center, 2 * node);
        let right_child = recurs_variance(heightmap, tree, right, apex, center, 2 * node + 1);
        local_var = local_var.max(left_child).max(right_child);
    }

    if node < tree.len() {
        tree.values[node] = local_var.saturating_add(1);
    }
    local_var
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corners(patch_size: u32) -> (GridPos, GridPos, GridPos) {
        (
            GridPos::new(0, patch_size),
            GridPos::new(patch_size, 0),
            GridPos::new(0, 0),
        )
    }

    #[test]
    fn flat_terrain_variance_is_always_one() {
        let hm = Heightmap::flat(64, 100);
        let (left, right, apex) = corners(64);
        let tree = compute_variance(&hm, 9, left, right, apex);
        for n in 1..tree.len() {
            assert_eq!(tree.get(n), 1, "V[{n}] should saturate at the +1 floor");
        }
    }

    #[test]
    fn repeated_computation_is_deterministic() {
        let mut bytes = vec![0u8; 64 * 64];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = (i % 256) as u8;
        }
        let hm = Heightmap::from_bytes(&bytes, 64).unwrap();
        let (left, right, apex) = corners(64);
        let a = compute_variance(&hm, 9, left, right, apex);
        let b = compute_variance(&hm, 9, left, right, apex);
        assert_eq!(a.values, b.values);
    }

    // Every internal V[n] - 1 >= max(V[2n], V[2n+1]) - 1: variance only grows toward the root.
    #[test]
    fn variance_is_monotone_up_the_tree() {
        let mut bytes = vec![0u8; 64 * 64];
        bytes[32 * 64 + 32] = 255;
        let hm = Heightmap::from_bytes(&bytes, 64).unwrap();
        let (left, right, apex) = corners(64);
        let tree = compute_variance(&hm, 9, left, right, apex);
        for n in 1..tree.len() / 2 {
            let parent = tree.get(n) as i32 - 1;
            let left_child = tree.get(2 * n) as i32 - 1;
            let right_child = tree.get(2 * n + 1) as i32 - 1;
            assert!(parent >= left_child.max(right_child));
        }
    }

    #[test]
    fn spike_raises_variance_only_along_its_path() {
        let size = 64;
        let mut bytes = vec![0u8; size * size];
        bytes[32 * size + 32] = 255;
        let hm = Heightmap::from_bytes(&bytes, size as u32).unwrap();
        let (left, right, apex) = corners(size as u32);
        let tree = compute_variance(&hm, 9, left, right, apex);
        assert!(tree.get(1) > 1, "root variance should see the spike");
    }

    // Forcing the root triangle's own three sampled corners to maximal contrast (both legs
    // interpolate to 255, the midpoint drops to 0) saturates V[1] at the +1 floor's ceiling.
    #[test]
    fn maximal_local_contrast_saturates_variance_at_255() {
        use rand::Rng;
        let size = 64usize;
        let mut rng = rand::thread_rng();
        let mut bytes: Vec<u8> = (0..size * size).map(|_| rng.gen()).collect();
        bytes[8 * size] = 255; // (x=0, y=8), the root's left corner
        bytes[8] = 255; // (x=8, y=0), the root's right corner
        bytes[4 * size + 4] = 0; // (x=4, y=4), the root's own midpoint sample
        let hm = Heightmap::from_bytes(&bytes, size as u32).unwrap();
        let (left, right, apex) = corners(8);
        let tree = compute_variance(&hm, 9, left, right, apex);
        assert_eq!(tree.get(1), 255);
    }
}
