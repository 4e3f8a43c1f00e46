//! Silt ECS -- sparse-set entity/component storage for the grid simulation.
//!
//! This crate provides the storage layer of the Silt engine: generational
//! [`Entity`](entity::Entity) handles, the [`SparseSet`](sparse::SparseSet)
//! primitive, typed [`ComponentStore`](store::ComponentStore)s with declared
//! defaults, and the [`EntityManager`](manager::EntityManager) that dispatches
//! component operations through a fixed, construction-validated
//! [`ComponentTable`](store::ComponentTable).
//!
//! # Quick Start
//!
//! ```
//! use silt_ecs::prelude::*;
//!
//! const HEAT: usize = 0;
//!
//! let table = ComponentTableBuilder::new(1)
//!     .register::<u32>(HEAT, 64, 0)
//!     .build()
//!     .unwrap();
//! let mut manager = EntityManager::new(table);
//!
//! let e = manager.allocate();
//! manager.attach_component(e, HEAT, 21u32);
//! assert_eq!(manager.component_or_default::<u32>(e, HEAT), 21);
//!
//! assert!(manager.free(e));
//! // The handle is stale now: readers degrade to the store default.
//! assert_eq!(manager.component_or_default::<u32>(e, HEAT), 0);
//! ```

#![deny(unsafe_code)]

pub mod entity;
pub mod manager;
pub mod sparse;
pub mod store;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while assembling a [`store::ComponentTable`].
///
/// These only arise at construction; the table's shape is fixed afterwards.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// Two stores were registered for the same kind.
    #[error("component kind {kind} is registered more than once")]
    DuplicateKind {
        /// The offending kind id.
        kind: usize,
    },

    /// A kind was left without a registered store.
    #[error("component kind {kind} has no registered store")]
    MissingKind {
        /// The unregistered kind id.
        kind: usize,
    },

    /// A registration referenced a kind beyond the declared table size.
    #[error("component kind {kind} is out of range (table holds {count} kinds)")]
    KindOutOfRange {
        /// The offending kind id.
        kind: usize,
        /// The declared number of kinds.
        count: usize,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::entity::Entity;
    pub use crate::manager::EntityManager;
    pub use crate::sparse::SparseSet;
    pub use crate::store::{ComponentStore, ComponentTable, ComponentTableBuilder};
    pub use crate::TableError;
}
