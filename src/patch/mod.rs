//! A square sub-region of the heightmap, owning two root `TriNode`s (`LR`/`RR`) that share a
//! hypotenuse, plus the two precomputed variance trees that drive their split/merge decisions.

#[cfg(test)]
mod tests;

use crate::bintree::{merge_down, split};
use crate::config::Config;
use crate::heightmap::Heightmap;
use crate::pool::{NodePool, VertexSlotPool};
use crate::tri_node::NodeHandle;
use crate::variance::{self, VarianceTree};
use crate::vector::{GridPos, Vec3};
use crate::visibility;

/// One `PATCH_SIZE x PATCH_SIZE` tile of the landscape. `left_root`/`right_root` are the two
/// triangles making up the tile at its coarsest LOD; everything below them lives in the shared
/// `NodePool` the `Landscape` owns.
pub struct Patch {
    anchor: GridPos,
    patch_size: u32,
    pub(crate) left_root: NodeHandle,
    pub(crate) right_root: NodeHandle,
    variance_left: VarianceTree,
    variance_right: VarianceTree,
    visible: bool,
}

impl Patch {
    /// Allocates the patch's two (permanent) root nodes, cross-links them as a base-neighbor
    /// diamond, and computes both variance trees.
    pub fn new(
        pool: &mut NodePool,
        heightmap: &Heightmap,
        variance_depth: u32,
        anchor: GridPos,
        patch_size: u32,
    ) -> Self {
        let left_root = pool.allocate_permanent();
        let right_root = pool.allocate_permanent();
        pool.get_mut(left_root).base_neighbor = Some(right_root);
        pool.get_mut(right_root).base_neighbor = Some(left_root);

        let left = GridPos::new(anchor.x, anchor.y + patch_size);
        let right = GridPos::new(anchor.x + patch_size, anchor.y);
        let variance_left = variance::compute_variance(heightmap, variance_depth, left, right, anchor);
        let variance_right = variance::compute_variance(
            heightmap,
            variance_depth,
            right,
            left,
            GridPos::new(anchor.x + patch_size, anchor.y + patch_size),
        );

        Self {
            anchor,
            patch_size,
            left_root,
            right_root,
            variance_left,
            variance_right,
            visible: false,
        }
    }

    /// `(left, right, apex)` corners of the left-root triangle `LR`.
    fn left_corners(&self) -> (GridPos, GridPos, GridPos) {
        let (hx, hy, s) = (self.anchor.x, self.anchor.y, self.patch_size);
        (
            GridPos::new(hx, hy + s),
            GridPos::new(hx + s, hy),
            GridPos::new(hx, hy),
        )
    }

    /// `(left, right, apex)` corners of the right-root triangle `RR`.
    fn right_corners(&self) -> (GridPos, GridPos, GridPos) {
        let (hx, hy, s) = (self.anchor.x, self.anchor.y, self.patch_size);
        (
            GridPos::new(hx + s, hy),
            GridPos::new(hx, hy + s),
            GridPos::new(hx + s, hy + s),
        )
    }

    /// Heightmap-grid position of the patch's center, used by the visibility test.
    pub fn center(&self) -> GridPos {
        GridPos::new(
            self.anchor.x + self.patch_size / 2,
            self.anchor.y + self.patch_size / 2,
        )
    }

    pub fn anchor(&self) -> GridPos {
        self.anchor
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Recomputes both variance trees from `heightmap`. Pure function of `heightmap` and the
    /// patch's anchor: calling it twice yields identical trees.
    pub fn compute_variance(&mut self, heightmap: &Heightmap, variance_depth: u32) {
        let (left, right, apex) = self.left_corners();
        self.variance_left = variance::compute_variance(heightmap, variance_depth, left, right, apex);
        let (left, right, apex) = self.right_corners();
        self.variance_right = variance::compute_variance(heightmap, variance_depth, left, right, apex);
    }

    /// Clears `IsVisible`; `Landscape::reset` immediately follows this with `set_visibility`.
    pub fn reset(&mut self) {
        self.visible = false;
    }

    pub fn set_visibility(&mut self, heightmap: &Heightmap, camera_pos: Vec3<f32>, camera_forward: Vec3<f32>) {
        let center = self.center();
        let world_center = Vec3::new(
            center.x as f32,
            heightmap.sample(center) as f32,
            center.y as f32,
        );
        self.visible = visibility::is_visible(camera_pos, camera_forward, world_center);
    }

    /// Splits/merges both root bintrees toward the current `frame_variance`.
    #[allow(clippy::too_many_arguments)]
    pub fn tessellate(
        &mut self,
        pool: &mut NodePool,
        slots: &mut VertexSlotPool,
        heightmap: &Heightmap,
        config: &Config,
        camera_pos: Vec3<f32>,
        frame_variance: f32,
    ) {
        let (left, right, apex) = self.left_corners();
        recurs_tessellate(
            pool,
            slots,
            heightmap,
            &self.variance_left,
            config,
            camera_pos,
            frame_variance,
            self.left_root,
            left,
            right,
            apex,
            1,
        );
        let (left, right, apex) = self.right_corners();
        recurs_tessellate(
            pool,
            slots,
            heightmap,
            &self.variance_right,
            config,
            camera_pos,
            frame_variance,
            self.right_root,
            left,
            right,
            apex,
            1,
        );
    }

    /// Emits vertices for every unrendered leaf of both root bintrees.
    pub fn render(&mut self, pool: &mut NodePool, slots: &mut VertexSlotPool, heightmap: &Heightmap) {
        let (left, right, apex) = self.left_corners();
        recurs_render(pool, slots, heightmap, self.left_root, left, right, apex);
        let (left, right, apex) = self.right_corners();
        recurs_render(pool, slots, heightmap, self.right_root, left, right, apex);
    }
}

/// `variance` must be the tree computed with the same corner ordering as `left`/`right`/`apex`
/// (the caller picks `variance_left`/`variance_right` to match `left_root`/`right_root`).
#[allow(clippy::too_many_arguments)]
fn recurs_tessellate(
    pool: &mut NodePool,
    slots: &mut VertexSlotPool,
    heightmap: &Heightmap,
    variance: &VarianceTree,
    config: &Config,
    camera_pos: Vec3<f32>,
    frame_variance: f32,
    t: NodeHandle,
    left: GridPos,
    right: GridPos,
    apex: GridPos,
    node: usize,
) {
    let center = GridPos::midpoint(left, right);
    let mut tri_variance = 0.0f32;
    if node < variance.len() && variance.get(node) > 1 {
        let center_world = Vec3::new(
            center.x as f32,
            heightmap.sample(center) as f32,
            center.y as f32,
        );
        let distance = 1.0 + (center_world - camera_pos).length();
        tri_variance = variance.get(node) as f32 * config.map_size as f32 * 2.0 / distance;
    }

    let tol = config.variance_tolerance;
    if !pool.get(t).is_tessellated && (node >= variance.len() || tri_variance > frame_variance + tol)
    {
        split(pool, slots, t);
        if pool.get(t).left_child.is_some()
            && (GridPos::abs_dx(left, right) >= 3 || GridPos::abs_dy(left, right) >= 3)
        {
            let left_child = pool.get(t).left_child.expect("just split");
            let right_child = pool.get(t).right_child.expect("just split");
            recurs_tessellate(
                pool,
                slots,
                heightmap,
                variance,
                config,
                camera_pos,
                frame_variance,
                left_child,
                apex,
                left,
                center,
                2 * node,
            );
            recurs_tessellate(
                pool,
                slots,
                heightmap,
                variance,
                config,
                camera_pos,
                frame_variance,
                right_child,
                right,
                apex,
                center,
                2 * node + 1,
            );
        }
    } else if tri_variance < frame_variance - tol
        && pool.get(t).left_child.is_some()
        && pool.get(t).is_rendered
    {
        merge_down(pool, slots, t);
    }

    let both_children_tessellated = match (pool.get(t).left_child, pool.get(t).right_child) {
        (Some(l), Some(r)) => pool.get(l).is_tessellated && pool.get(r).is_tessellated,
        _ => false,
    };
    if both_children_tessellated {
        pool.get_mut(t).is_tessellated = true;
    } else if node >= variance.len() {
        pool.get_mut(t).is_tessellated = true;
    }
}

fn recurs_render(
    pool: &mut NodePool,
    slots: &mut VertexSlotPool,
    heightmap: &Heightmap,
    t: NodeHandle,
    left: GridPos,
    right: GridPos,
    apex: GridPos,
) {
    if pool.get(t).is_rendered {
        return;
    }

    match (pool.get(t).left_child, pool.get(t).right_child) {
        (Some(l), Some(r)) => {
            let center = GridPos::midpoint(left, right);
            recurs_render(pool, slots, heightmap, l, apex, left, center);
            recurs_render(pool, slots, heightmap, r, right, apex, center);
            if pool.get(l).is_rendered && pool.get(r).is_rendered {
                pool.get_mut(t).is_rendered = true;
            }
        }
        _ => {
            if let Ok(slot) = slots.acquire() {
                slots.write(
                    slot,
                    grid_to_vertex(heightmap, left),
                    grid_to_vertex(heightmap, right),
                    grid_to_vertex(heightmap, apex),
                );
                let node = pool.get_mut(t);
                node.vertex_slot = Some(slot);
                node.is_rendered = true;
            }
        }
    }
}

/// Y-up: the heightmap byte becomes Y; grid x/y become world X/Z.
fn grid_to_vertex(heightmap: &Heightmap, pos: GridPos) -> Vec3<f32> {
    Vec3::new(pos.x as f32, heightmap.sample(pos) as f32, pos.y as f32)
}
