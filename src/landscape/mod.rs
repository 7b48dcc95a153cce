//! The top-level engine: owns the patch grid, the pools, the output buffers, and runs the
//! per-frame reset/tessellate/render pipeline plus the frame-variance feedback controller.


use crate::config::Config;
use crate::error::EngineError;
use crate::feedback;
use crate::heightmap::Heightmap;
use crate::patch::Patch;
use crate::pool::{NodePool, VertexSlotPool};
use crate::vector::{GridPos, Vec3};

/// Owns the whole ROAM engine for one heightmap. Created once via [`Landscape::new`]/
/// [`Landscape::load`]; the host then drives `reset`/`tessellate`/`render` once per frame and
/// reads the mesh back out with [`Landscape::mesh`].
pub struct Landscape {
    config: Config,
    heightmap: Heightmap,
    node_pool: NodePool,
    slot_pool: VertexSlotPool,
    triangle_indices: Vec<u32>,
    /// Row-major `patches_per_side x patches_per_side` grid; index `i * patches_per_side + j`.
    patches: Vec<Patch>,
    camera_pos: Vec3<f32>,
    camera_forward: Vec3<f32>,
    frame_variance: f32,
    visible_count: u32,
}

impl Landscape {
    /// Loads the heightmap from `path` and builds the engine in one step, collapsing the
    /// load-then-init pair into a single fallible constructor so there is no "forgot to call
    /// init" state to get wrong.
    pub fn load(path: impl AsRef<std::path::Path>, config: Config) -> Result<Self, EngineError> {
        config.validate()?;
        let heightmap = Heightmap::load(path, config.map_size)?;
        Self::new(config, heightmap)
    }

    /// Builds the engine from an already-loaded heightmap (used directly by tests, and by hosts
    /// that load/generate heightmap bytes themselves).
    pub fn new(config: Config, heightmap: Heightmap) -> Result<Self, EngineError> {
        config.validate()?;

        let mut node_pool = NodePool::with_capacity(config.tri_node_pool);
        let slot_pool = VertexSlotPool::with_capacity(config.max_tris);
        let triangle_indices = (0..3 * config.max_tris).collect();

        let patches_per_side = config.patches_per_side;
        let patch_size = config.patch_size();
        let mut patches = Vec::with_capacity((patches_per_side * patches_per_side) as usize);
        for i in 0..patches_per_side {
            for j in 0..patches_per_side {
                let anchor = GridPos::new(j * patch_size, i * patch_size);
                patches.push(Patch::new(
                    &mut node_pool,
                    &heightmap,
                    config.variance_depth,
                    anchor,
                    patch_size,
                ));
            }
        }

        let mut landscape = Self {
            config,
            heightmap,
            node_pool,
            slot_pool,
            triangle_indices,
            patches,
            camera_pos: Vec3::default(),
            camera_forward: Vec3::new(0.0, 0.0, 1.0),
            frame_variance: 0.0,
            visible_count: 0,
        };
        landscape.link_patch_neighbors();
        Ok(landscape)
    }

    fn patch_index(&self, i: u32, j: u32) -> usize {
        (i * self.config.patches_per_side + j) as usize
    }

    /// Links every patch's two roots to their neighbors across all four grid edges,
    /// unconditionally (not gated on initial visibility). Applying all four single-direction
    /// rules to every patch is what makes the resulting webbing symmetric: the rule at `(i, j)`
    /// sets `LR[i,j].left_neighbor = RR[i,j-1]`, and the mirrored rule at `(i, j-1)` independently
    /// sets `RR[i,j-1].left_neighbor = LR[i,j]` — the same edge, set from both sides by two
    /// different cells' rules, with no separate manual back-link step needed.
    fn link_patch_neighbors(&mut self) {
        let n = self.config.patches_per_side;
        for i in 0..n {
            for j in 0..n {
                let idx = self.patch_index(i, j);
                let left_root = self.patches[idx].left_root;
                let right_root = self.patches[idx].right_root;

                if j > 0 {
                    let neighbor = self.patches[self.patch_index(i, j - 1)].right_root;
                    self.node_pool.get_mut(left_root).left_neighbor = Some(neighbor);
                }
                if j + 1 < n {
                    let neighbor = self.patches[self.patch_index(i, j + 1)].left_root;
                    self.node_pool.get_mut(right_root).left_neighbor = Some(neighbor);
                }
                if i > 0 {
                    let neighbor = self.patches[self.patch_index(i - 1, j)].right_root;
                    self.node_pool.get_mut(left_root).right_neighbor = Some(neighbor);
                }
                if i + 1 < n {
                    let neighbor = self.patches[self.patch_index(i + 1, j)].left_root;
                    self.node_pool.get_mut(right_root).right_neighbor = Some(neighbor);
                }
            }
        }
    }

    pub fn set_camera(&mut self, position: Vec3<f32>, forward: Vec3<f32>) {
        self.camera_pos = position;
        self.camera_forward = forward.normalized();
    }

    /// Clears and recomputes every patch's visibility for this frame.
    pub fn reset(&mut self) {
        self.visible_count = 0;
        for patch in &mut self.patches {
            patch.reset();
            patch.set_visibility(&self.heightmap, self.camera_pos, self.camera_forward);
            if patch.is_visible() {
                self.visible_count += 1;
            }
        }
    }

    /// Splits/merges every visible patch's bintrees toward `frame_variance`.
    pub fn tessellate(&mut self) {
        for patch in &mut self.patches {
            if patch.is_visible() {
                patch.tessellate(
                    &mut self.node_pool,
                    &mut self.slot_pool,
                    &self.heightmap,
                    &self.config,
                    self.camera_pos,
                    self.frame_variance,
                );
            }
        }
    }

    /// Emits vertices for every visible patch's unrendered leaves, then updates the controller.
    pub fn render(&mut self) {
        for patch in &mut self.patches {
            if patch.is_visible() {
                patch.render(&mut self.node_pool, &mut self.slot_pool, &self.heightmap);
            }
        }
        self.frame_variance =
            feedback::update_frame_variance(self.frame_variance, self.slot_pool.free_count(), &self.config);
    }

    /// The current vertex buffer and the fixed `[0, 1, 2, ...]` triangle index buffer. Unused
    /// vertex slots are `(0, 0, 0)`, which the host tolerates as degenerate zero-area triangles.
    pub fn mesh(&self) -> (&[Vec3<f32>], &[u32]) {
        (self.slot_pool.vertex_buffer(), &self.triangle_indices)
    }

    pub fn frame_variance(&self) -> f32 {
        self.frame_variance
    }

    pub fn visible_patch_count(&self) -> u32 {
        self.visible_count
    }

    /// Triangles actually emitted in the most recent `render()` call.
    pub fn triangle_count(&self) -> usize {
        self.config.max_tris as usize - self.slot_pool.free_count()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
