//! Silt Engine -- deterministic, chunked cellular-automaton simulation of
//! granular materials (sand, liquid, gas) on a 2D grid.
//!
//! The [`World`](world::World) owns a grid of entity handles backed by the
//! sparse-set stores of `silt-ecs`, partitions it into chunks with sleep/wake
//! bookkeeping, and advances the simulation one discrete tick at a time: two
//! sequential data-parallel passes over the non-sleeping chunks, split by
//! checkerboard parity so adjacent chunks never run concurrently. Cross-chunk
//! writes are detected with a lock-free per-cell bitset; randomness comes
//! from an explicit, seedable context so runs are reproducible.
//!
//! Rendering, input mapping and the hosting frame loop are consumers of this
//! API, not part of it.
//!
//! # Quick Start
//!
//! ```
//! use silt_engine::prelude::*;
//!
//! let mut world = World::with_config(
//!     Point::new(64, 64),
//!     WorldConfig { seed: Some(7), ..Default::default() },
//! );
//!
//! world.add_dot(Point::new(32, 0), Material::Sand);
//! world.update();
//!
//! // Gravity: the dot fell one row.
//! assert!(world.is_empty(Point::new(32, 0)));
//! assert_eq!(world.material_at(Point::new(32, 1)), Some(Material::Sand));
//! ```

#![deny(unsafe_code)]

mod chunk;
mod grid;
mod rules;

pub mod lock;
pub mod material;
pub mod point;
pub mod rng;
pub mod trace;
pub mod world;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::lock::GridAccessLock;
    pub use crate::material::{ComponentKind, LiquidDynamics, Material, Rgba, SolidDynamics};
    pub use crate::point::{Point, Rect};
    pub use crate::rng::RngContext;
    pub use crate::trace::{LinearTrace, RadialTrace};
    pub use crate::world::{World, WorldConfig};
    pub use silt_ecs::entity::Entity;
}
