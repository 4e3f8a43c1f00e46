//! The entity grid.
//!
//! One atomic word per cell holding the raw bits of the occupying
//! [`Entity`], or [`Entity::NULL`] for an empty cell. Cells are atomic so the
//! parallel chunk passes can move dots through a shared `&World`; the
//! checkerboard pass split guarantees concurrently scanned chunks never touch
//! the same cells, so relaxed single-word operations are all that is needed.
//!
//! This type is crate-private on purpose: every mutation must flow through
//! the `World` operations that co-locate wake bookkeeping with the write.

use std::sync::atomic::{AtomicU64, Ordering};

use silt_ecs::entity::Entity;

use crate::point::Point;

// ---------------------------------------------------------------------------
// EntityGrid
// ---------------------------------------------------------------------------

/// `width × height` array of entity handles in row-major order.
pub(crate) struct EntityGrid {
    width: i32,
    cells: Vec<AtomicU64>,
}

impl EntityGrid {
    /// Create a grid of the given size with every cell empty.
    pub(crate) fn new(size: Point) -> Self {
        let count = size.x as usize * size.y as usize;
        Self {
            width: size.x,
            cells: (0..count).map(|_| AtomicU64::new(Entity::NULL.to_raw())).collect(),
        }
    }

    #[inline]
    fn offset(&self, p: Point) -> usize {
        (p.y * self.width + p.x) as usize
    }

    /// The occupant of `p`. Caller guarantees `p` is in bounds.
    #[inline]
    pub(crate) fn get(&self, p: Point) -> Entity {
        Entity::from_raw(self.cells[self.offset(p)].load(Ordering::Relaxed))
    }

    /// Overwrite the occupant of `p`. Caller guarantees `p` is in bounds.
    #[inline]
    pub(crate) fn set(&self, p: Point, entity: Entity) {
        self.cells[self.offset(p)].store(entity.to_raw(), Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let grid = EntityGrid::new(Point::new(4, 3));
        for y in 0..3 {
            for x in 0..4 {
                assert!(grid.get(Point::new(x, y)).is_null());
            }
        }
    }

    #[test]
    fn set_then_get() {
        let grid = EntityGrid::new(Point::new(4, 3));
        let e = Entity::new(9, 1);
        grid.set(Point::new(2, 1), e);
        assert_eq!(grid.get(Point::new(2, 1)), e);
        assert!(grid.get(Point::new(1, 2)).is_null());
    }

    #[test]
    fn cells_are_independent() {
        let grid = EntityGrid::new(Point::new(2, 2));
        grid.set(Point::new(0, 0), Entity::new(1, 1));
        grid.set(Point::new(1, 1), Entity::new(2, 1));
        grid.set(Point::new(0, 0), Entity::NULL);
        assert!(grid.get(Point::new(0, 0)).is_null());
        assert_eq!(grid.get(Point::new(1, 1)), Entity::new(2, 1));
    }
}
