//! Fixed-capacity pools that make per-frame bintree churn allocation-free: both are pre-sized at
//! `Landscape::init` and never grow, so splitting/merging/rendering never touches the allocator
//! during steady-state frames.

mod node_pool;
mod slot_pool;

pub use node_pool::{NodePool, PoolExhausted};
pub use slot_pool::{NoFreeSlot, VertexSlotPool};
