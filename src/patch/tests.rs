use super::*;
use crate::pool::{NodePool, VertexSlotPool};

fn small_config() -> Config {
    Config {
        map_size: 64,
        patches_per_side: 1,
        variance_depth: 9,
        max_tris: 2_000,
        wanted_tris: 1_000,
        variance_tolerance: 2.0,
        tri_node_pool: 4_000,
    }
}

fn new_patch(pool: &mut NodePool, heightmap: &Heightmap, config: &Config) -> Patch {
    Patch::new(pool, heightmap, config.variance_depth, GridPos::new(0, 0), config.patch_size())
}

// A perfectly flat heightmap renders exactly two triangles (the two roots), whatever the
// frame variance, and never splits.
#[test]
fn flat_patch_renders_only_its_two_roots() {
    let config = small_config();
    let heightmap = Heightmap::flat(config.map_size, 100);
    let mut pool = NodePool::with_capacity(config.tri_node_pool);
    let mut slots = VertexSlotPool::with_capacity(config.max_tris);
    let mut patch = new_patch(&mut pool, &heightmap, &config);

    let camera_pos = Vec3::new(32.0, 200.0, 32.0);
    patch.tessellate(&mut pool, &mut slots, &heightmap, &config, camera_pos, 5.0);
    patch.render(&mut pool, &mut slots, &heightmap);

    assert!(pool.get(patch.left_root).left_child.is_none());
    assert!(pool.get(patch.right_root).left_child.is_none());
    assert!(pool.get(patch.left_root).is_rendered);
    assert!(pool.get(patch.right_root).is_rendered);
    assert_eq!(slots.free_count(), config.max_tris as usize - 2);
}

// A single spike raises variance only along the path toward it; elsewhere V stays at the
// +1 floor.
#[test]
fn spike_patch_splits_near_the_spike() {
    let config = small_config();
    let size = config.map_size as usize;
    let mut bytes = vec![0u8; size * size];
    bytes[32 * size + 32] = 255;
    let heightmap = Heightmap::from_bytes(&bytes, config.map_size).unwrap();
    let mut pool = NodePool::with_capacity(config.tri_node_pool);
    let mut slots = VertexSlotPool::with_capacity(config.max_tris);
    let mut patch = new_patch(&mut pool, &heightmap, &config);

    let camera_pos = Vec3::new(32.0, 200.0, 32.0);
    patch.tessellate(&mut pool, &mut slots, &heightmap, &config, camera_pos, 5.0);

    assert!(
        pool.get(patch.left_root).left_child.is_some() || pool.get(patch.right_root).left_child.is_some(),
        "a patch containing a sharp spike should split below its roots"
    );
}

// Re-tessellating with an unchanged camera is a no-op once `is_tessellated` is set, so the
// leaf set after a second call matches the first.
#[test]
fn retessellating_with_same_camera_is_idempotent() {
    let config = small_config();
    let size = config.map_size as usize;
    let mut bytes = vec![0u8; size * size];
    bytes[32 * size + 32] = 255;
    let heightmap = Heightmap::from_bytes(&bytes, config.map_size).unwrap();
    let mut pool = NodePool::with_capacity(config.tri_node_pool);
    let mut slots = VertexSlotPool::with_capacity(config.max_tris);
    let mut patch = new_patch(&mut pool, &heightmap, &config);
    let camera_pos = Vec3::new(32.0, 200.0, 32.0);

    patch.tessellate(&mut pool, &mut slots, &heightmap, &config, camera_pos, 5.0);
    let free_after_first = pool.free_count();
    patch.tessellate(&mut pool, &mut slots, &heightmap, &config, camera_pos, 5.0);
    let free_after_second = pool.free_count();

    assert_eq!(free_after_first, free_after_second);
}

#[test]
fn set_visibility_reflects_camera_forward() {
    let config = small_config();
    let heightmap = Heightmap::flat(config.map_size, 100);
    let mut pool = NodePool::with_capacity(config.tri_node_pool);
    let mut patch = new_patch(&mut pool, &heightmap, &config);

    patch.reset();
    assert!(!patch.is_visible());

    let camera_pos = Vec3::new(32.0, 200.0, -100.0);
    let camera_forward = Vec3::new(0.0, 0.0, 1.0);
    patch.set_visibility(&heightmap, camera_pos, camera_forward);
    assert!(patch.is_visible());

    let camera_forward_away = Vec3::new(0.0, 0.0, -1.0);
    patch.set_visibility(&heightmap, camera_pos, camera_forward_away);
    assert!(!patch.is_visible());
}

// A patch whose sampled corners/midpoints are forced to maximal contrast keeps splitting past
// its immediate children: tessellation only stops where the |dx| >= 3 / |dy| >= 3 leg guard
// stops it, not for lack of variance to split on.
#[test]
fn maximal_contrast_patch_splits_past_its_first_level() {
    use rand::Rng;
    let config = small_config();
    let size = config.map_size as usize;
    let mut rng = rand::thread_rng();
    let mut bytes: Vec<u8> = (0..size * size).map(|_| rng.gen()).collect();
    // The root's left/right corners sit on the padded edge, which clamps to the last real
    // row/column, so the override lands on (size-1, y) / (x, size-1) rather than the edge itself.
    bytes[(size - 1) * size] = 255; // backs the left root's left corner, (x=0, y=patch_size)
    bytes[size - 1] = 255; // backs the left root's right corner, (x=patch_size, y=0)
    bytes[(size / 2) * size + size / 2] = 0; // the left root's own midpoint sample, (patch_size/2, patch_size/2)
    let heightmap = Heightmap::from_bytes(&bytes, config.map_size).unwrap();
    let mut pool = NodePool::with_capacity(config.tri_node_pool);
    let mut slots = VertexSlotPool::with_capacity(config.max_tris);
    let mut patch = new_patch(&mut pool, &heightmap, &config);

    let camera_pos = Vec3::new(32.0, 200.0, 32.0);
    patch.tessellate(&mut pool, &mut slots, &heightmap, &config, camera_pos, 0.0);

    let left = pool.get(patch.left_root).left_child.expect("root should split");
    let grandchild_split = pool.get(left).left_child.is_some() || {
        let right = pool.get(patch.left_root).right_child.unwrap();
        pool.get(right).left_child.is_some()
    };
    assert!(
        grandchild_split,
        "maximal contrast should drive splitting at least two levels deep"
    );
}

#[test]
fn compute_variance_is_pure() {
    let config = small_config();
    let size = config.map_size as usize;
    let mut bytes = vec![0u8; size * size];
    bytes[10 * size + 40] = 180;
    let heightmap = Heightmap::from_bytes(&bytes, config.map_size).unwrap();
    let mut pool = NodePool::with_capacity(config.tri_node_pool);
    let mut patch = new_patch(&mut pool, &heightmap, &config);
    let before = (patch.variance_left.get(1), patch.variance_right.get(1));
    patch.compute_variance(&heightmap, config.variance_depth);
    let after = (patch.variance_left.get(1), patch.variance_right.get(1));
    assert_eq!(before, after);
}
