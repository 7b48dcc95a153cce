//! Real-time adaptive terrain tessellation: splits and merges a heightmap into a
//! crack-free triangle mesh whose resolution follows a per-frame vertex budget.
//!
//! The engine is driven one frame at a time: [`Landscape::reset`] recomputes visibility,
//! [`Landscape::tessellate`] adapts the mesh toward the current `frame_variance`, and
//! [`Landscape::render`] emits vertices for the frame and updates the budget controller for the
//! next one. [`Landscape::mesh`] hands the host the vertex/index buffers to draw.

mod bintree;
mod config;
mod error;
mod feedback;
mod heightmap;
mod landscape;
mod patch;
mod pool;
mod tri_node;
mod variance;
mod vector;
mod visibility;

pub use config::Config;
pub use error::EngineError;
pub use heightmap::Heightmap;
pub use landscape::Landscape;
pub use vector::{GridPos, Vec3};
