use crate::error::EngineError;

/// Bundles the engine's tunable constants into a value instead of free-standing `const`s, so a
/// host can run more than one differently-sized `Landscape` in the same process (this crate's own
/// tests stand up small maps this way).
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub map_size: u32,
    pub patches_per_side: u32,
    pub variance_depth: u32,
    pub max_tris: u32,
    pub wanted_tris: u32,
    pub variance_tolerance: f32,
    pub tri_node_pool: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            map_size: 4096,
            patches_per_side: 64,
            variance_depth: 9,
            max_tris: 200_000,
            wanted_tris: 100_000,
            variance_tolerance: 2.0,
            tri_node_pool: 400_000,
        }
    }
}

impl Config {
    /// Side length, in heightmap samples, of a single patch.
    pub fn patch_size(&self) -> u32 {
        self.map_size / self.patches_per_side
    }

    /// Number of slots in a variance tree (`2^variance_depth`).
    pub fn variance_tree_len(&self) -> usize {
        1usize << self.variance_depth
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.map_size == 0 || self.patches_per_side == 0 {
            return Err(EngineError::InvalidConfiguration(
                "map_size and patches_per_side must be non-zero".into(),
            ));
        }
        if self.map_size % self.patches_per_side != 0 {
            return Err(EngineError::InvalidConfiguration(format!(
                "map_size ({}) is not divisible by patches_per_side ({})",
                self.map_size, self.patches_per_side
            )));
        }
        let patch_size = self.patch_size();
        if !patch_size.is_power_of_two() {
            return Err(EngineError::InvalidConfiguration(format!(
                "patch_size ({patch_size}) must be a power of two"
            )));
        }
        // A bintree split halves one leg of the right-isoceles triangle and rotates to the other
        // leg on the next split, so both legs halve every two levels. Variance recursion stops
        // once a leg drops below 8 samples, so the tree only needs depth enough to reach that
        // point, not all the way down to single-sample triangles.
        let log2_patch_size = patch_size.trailing_zeros();
        let needed_depth = if log2_patch_size <= 3 {
            1
        } else {
            2 * (log2_patch_size - 3) + 1
        };
        if self.variance_depth < needed_depth {
            return Err(EngineError::InvalidConfiguration(format!(
                "variance_depth ({}) is too small for patch_size ({}); need at least {}",
                self.variance_depth, patch_size, needed_depth
            )));
        }
        if self.wanted_tris > self.max_tris {
            return Err(EngineError::InvalidConfiguration(format!(
                "wanted_tris ({}) exceeds max_tris ({})",
                self.wanted_tris, self.max_tris
            )));
        }
        if self.tri_node_pool == 0 {
            return Err(EngineError::InvalidConfiguration(
                "tri_node_pool must be non-zero".into(),
            ));
        }
        Ok(())
    }
}
