use crate::tri_node::VertexSlot;
use crate::vector::Vec3;
use std::fmt;

/// No free vertex slot was available. Non-fatal: the caller skips rendering that leaf for this
/// frame; its parent subtree remains not-rendered and retries next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoFreeSlot;

impl fmt::Display for NoFreeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no free vertex slot")
    }
}

impl std::error::Error for NoFreeSlot {}

/// Stack of free indices into a shared vertex buffer of `3 * max_tris` positions, handed out
/// three-at-a-time (one slot per rendered leaf triangle).
pub struct VertexSlotPool {
    vertex_buf: Vec<Vec3<f32>>,
    free: Vec<u32>,
}

impl VertexSlotPool {
    pub fn with_capacity(max_tris: u32) -> Self {
        let vertex_buf = vec![Vec3::default(); 3 * max_tris as usize];
        // Free slots pushed in increasing order so pops yield decreasing indices.
        let free = (0..max_tris).map(|i| i * 3).collect();
        Self { vertex_buf, free }
    }

    pub fn max_tris(&self) -> usize {
        self.vertex_buf.len() / 3
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn acquire(&mut self) -> Result<VertexSlot, NoFreeSlot> {
        match self.free.pop() {
            Some(idx) => Ok(VertexSlot(idx)),
            None => {
                log::debug!("vertex slot pool exhausted ({} slots in use)", self.max_tris());
                Err(NoFreeSlot)
            }
        }
    }

    /// Zeroes the slot's three positions and returns it to the pool.
    pub fn release(&mut self, slot: VertexSlot) {
        let base = slot.index();
        self.vertex_buf[base] = Vec3::default();
        self.vertex_buf[base + 1] = Vec3::default();
        self.vertex_buf[base + 2] = Vec3::default();
        self.free.push(slot.0);
    }

    pub fn write(&mut self, slot: VertexSlot, a: Vec3<f32>, b: Vec3<f32>, c: Vec3<f32>) {
        let base = slot.index();
        self.vertex_buf[base] = a;
        self.vertex_buf[base + 1] = b;
        self.vertex_buf[base + 2] = c;
    }

    pub fn vertex_buffer(&self) -> &[Vec3<f32>] {
        &self.vertex_buf
    }
}
