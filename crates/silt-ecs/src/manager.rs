//! Entity allocation and generation-checked component dispatch.
//!
//! The [`EntityManager`] owns the live-entity sparse set, the per-slot
//! generation counters, the free list, and the [`ComponentTable`]. Every
//! component operation re-validates the handle's generation before touching
//! storage: mutators on a stale handle are silent no-ops and readers return
//! the store's declared default. That degradation is deliberate -- the grid,
//! not the handle, is authoritative for "what currently occupies this cell",
//! and bookkeeping may legitimately lag a same-tick deletion.

use crate::entity::Entity;
use crate::sparse::SparseSet;
use crate::store::ComponentTable;

/// Initial slot capacity for the live set and generation array.
const BASE_CAPACITY: usize = 512;

// ---------------------------------------------------------------------------
// EntityManager
// ---------------------------------------------------------------------------

/// Allocates generation-tagged [`Entity`] handles and dispatches component
/// operations to the per-kind stores.
///
/// Freed indices are reused most-recently-freed first; each reuse bumps the
/// slot's generation so outstanding handles to the previous occupant go
/// stale immediately.
pub struct EntityManager {
    live: SparseSet,
    generations: Vec<u32>,
    free: Vec<u32>,
    table: ComponentTable,
}

impl EntityManager {
    /// Create a manager dispatching to the given validated component table.
    pub fn new(table: ComponentTable) -> Self {
        Self {
            live: SparseSet::with_capacity(BASE_CAPACITY),
            generations: Vec::with_capacity(BASE_CAPACITY),
            free: Vec::new(),
            table,
        }
    }

    /// Allocate a fresh entity. Never fails.
    ///
    /// Pops the most recently freed index when one is available, otherwise
    /// grows the backing storage; either way the slot's generation is bumped.
    pub fn allocate(&mut self) -> Entity {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                let index = self.generations.len() as u32;
                self.generations.push(0);
                index
            }
        };
        let generation = self.generations[index as usize].wrapping_add(1);
        self.generations[index as usize] = generation;
        self.live.insert(index);
        Entity::new(index, generation)
    }

    /// The live handle for `index`, or [`Entity::NULL`] when the slot is
    /// unallocated or out of range.
    pub fn resolve(&self, index: u32) -> Entity {
        if self.live.contains(index) {
            Entity::new(index, self.generations[index as usize])
        } else {
            Entity::NULL
        }
    }

    /// Whether `handle` refers to a currently live entity.
    pub fn is_live(&self, handle: Entity) -> bool {
        !handle.is_null() && self.resolve(handle.index()) == handle
    }

    /// Free `handle`, purging it from every component store and returning its
    /// index to the free list.
    ///
    /// Returns `false` with no side effects for a stale, null, or unknown
    /// handle -- a double free is safe.
    pub fn free(&mut self, handle: Entity) -> bool {
        if !self.is_live(handle) {
            return false;
        }
        self.live.remove(handle.index());
        self.free.push(handle.index());
        self.table.purge(handle.index());
        true
    }

    /// Number of live entities.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    // -- component operations ------------------------------------------------
    //
    // Each op validates the generation first. `kind` indexes the fixed table;
    // a kind/type mismatch is a programming error and panics (see
    // `ComponentTable::store`).

    /// Allocate the `kind` component on `handle` and set it to `value`.
    /// Silent no-op on a stale handle.
    pub fn attach_component<T: Clone + Send + Sync + 'static>(
        &mut self,
        handle: Entity,
        kind: usize,
        value: T,
    ) {
        if !self.is_live(handle) {
            return;
        }
        self.table.insert(kind, handle.index());
        self.table.store_mut::<T>(kind).set(handle.index(), value);
    }

    /// Overwrite the `kind` component on `handle`. Silent no-op on a stale
    /// handle or when the component was never attached.
    pub fn set_component<T: Clone + Send + Sync + 'static>(
        &mut self,
        handle: Entity,
        kind: usize,
        value: T,
    ) {
        if !self.is_live(handle) {
            return;
        }
        self.table.store_mut::<T>(kind).set(handle.index(), value);
    }

    /// The `kind` component on `handle`, or the store's declared default for
    /// a stale handle or unattached component.
    pub fn component_or_default<T: Clone + Send + Sync + 'static>(
        &self,
        handle: Entity,
        kind: usize,
    ) -> T {
        let store = self.table.store::<T>(kind);
        if !self.is_live(handle) {
            return store.default_value().clone();
        }
        store.get_or_default(handle.index())
    }

    /// Whether `handle` is live and carries the `kind` component.
    pub fn has_component(&self, handle: Entity, kind: usize) -> bool {
        self.is_live(handle) && self.table.contains(kind, handle.index())
    }

    /// Release the `kind` component on `handle`. Silent no-op on a stale
    /// handle or absent component.
    pub fn free_component(&mut self, handle: Entity, kind: usize) {
        if !self.is_live(handle) {
            return;
        }
        self.table.remove(kind, handle.index());
    }

    /// Read-only access to the component table.
    pub fn table(&self) -> &ComponentTable {
        &self.table
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ComponentTableBuilder;

    const TAG: usize = 0;
    const WEIGHT: usize = 1;

    fn manager() -> EntityManager {
        let table = ComponentTableBuilder::new(2)
            .register::<u8>(TAG, 16, 0)
            .register::<f32>(WEIGHT, 16, 1.0)
            .build()
            .unwrap();
        EntityManager::new(table)
    }

    // -- allocation ----------------------------------------------------------

    #[test]
    fn allocate_yields_unique_live_handles() {
        let mut mgr = manager();
        let a = mgr.allocate();
        let b = mgr.allocate();
        assert_ne!(a, b);
        assert!(mgr.is_live(a));
        assert!(mgr.is_live(b));
        assert_eq!(mgr.live_count(), 2);
    }

    #[test]
    fn free_list_is_lifo() {
        let mut mgr = manager();
        let a = mgr.allocate();
        let b = mgr.allocate();
        mgr.free(a);
        mgr.free(b);
        // b's index was freed last, so it is reused first.
        assert_eq!(mgr.allocate().index(), b.index());
        assert_eq!(mgr.allocate().index(), a.index());
    }

    #[test]
    fn reallocation_bumps_generation() {
        let mut mgr = manager();
        let a = mgr.allocate();
        assert!(mgr.free(a));
        let b = mgr.allocate();
        assert_eq!(b.index(), a.index());
        assert!(b.generation() > a.generation());
        assert!(!mgr.is_live(a));
        assert!(mgr.is_live(b));
    }

    #[test]
    fn double_free_is_safe_noop() {
        let mut mgr = manager();
        let a = mgr.allocate();
        assert!(mgr.free(a));
        assert!(!mgr.free(a));
        assert_eq!(mgr.live_count(), 0);
    }

    #[test]
    fn free_null_returns_false() {
        let mut mgr = manager();
        assert!(!mgr.free(Entity::NULL));
    }

    #[test]
    fn resolve_live_and_dead_slots() {
        let mut mgr = manager();
        let a = mgr.allocate();
        assert_eq!(mgr.resolve(a.index()), a);
        mgr.free(a);
        assert_eq!(mgr.resolve(a.index()), Entity::NULL);
        assert_eq!(mgr.resolve(9999), Entity::NULL);
    }

    // -- component dispatch --------------------------------------------------

    #[test]
    fn component_roundtrip() {
        let mut mgr = manager();
        let e = mgr.allocate();
        mgr.attach_component(e, TAG, 3u8);
        assert!(mgr.has_component(e, TAG));
        assert_eq!(mgr.component_or_default::<u8>(e, TAG), 3);

        mgr.set_component(e, TAG, 7u8);
        assert_eq!(mgr.component_or_default::<u8>(e, TAG), 7);

        mgr.free_component(e, TAG);
        assert!(!mgr.has_component(e, TAG));
        assert_eq!(mgr.component_or_default::<u8>(e, TAG), 0);
    }

    #[test]
    fn free_purges_every_store() {
        let mut mgr = manager();
        let e = mgr.allocate();
        mgr.attach_component(e, TAG, 5u8);
        mgr.attach_component(e, WEIGHT, 2.5f32);
        mgr.free(e);
        // The reused slot starts with no components.
        let e2 = mgr.allocate();
        assert_eq!(e2.index(), e.index());
        assert!(!mgr.has_component(e2, TAG));
        assert!(!mgr.has_component(e2, WEIGHT));
    }

    #[test]
    fn stale_handle_degrades_silently() {
        let mut mgr = manager();
        let e = mgr.allocate();
        mgr.attach_component(e, WEIGHT, 9.0f32);
        mgr.free(e);
        let reused = mgr.allocate();
        assert_eq!(reused.index(), e.index());

        // Readers see the default, mutators change nothing.
        assert_eq!(mgr.component_or_default::<f32>(e, WEIGHT), 1.0);
        assert!(!mgr.has_component(e, WEIGHT));
        mgr.set_component(e, WEIGHT, 4.0f32);
        mgr.attach_component(e, WEIGHT, 4.0f32);
        assert!(!mgr.has_component(reused, WEIGHT));
        mgr.free_component(e, WEIGHT);
        assert!(mgr.is_live(reused));
    }

    #[test]
    fn set_without_attach_is_noop() {
        let mut mgr = manager();
        let e = mgr.allocate();
        mgr.set_component(e, TAG, 9u8);
        assert!(!mgr.has_component(e, TAG));
        assert_eq!(mgr.component_or_default::<u8>(e, TAG), 0);
    }
}
