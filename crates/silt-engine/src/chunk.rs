//! Chunk partitioning and sleep flags.
//!
//! The grid is partitioned into fixed-size rectangular chunks (clipped at the
//! grid edges), each carrying an atomic sleeping flag. Chunks start Active so
//! the first tick always performs one full pass before anything may claim
//! idleness. The checkerboard pass parity lives here because it is a property
//! of chunk coordinates, not of the scheduler.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::point::{Point, Rect};

// ---------------------------------------------------------------------------
// Chunk
// ---------------------------------------------------------------------------

/// One rectangular partition of the grid with its sleep state.
pub(crate) struct Chunk {
    bounds: Rect,
    sleeping: AtomicBool,
}

impl Chunk {
    /// Create an Active chunk covering `bounds`.
    pub(crate) fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            sleeping: AtomicBool::new(false),
        }
    }

    /// The cells this chunk owns.
    #[inline]
    pub(crate) fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Whether the chunk is currently sleeping.
    #[inline]
    pub(crate) fn is_sleeping(&self) -> bool {
        self.sleeping.load(Ordering::Relaxed)
    }

    /// Set the sleep flag. Scans set it provisionally at their start; wakes
    /// clear it from any thread.
    #[inline]
    pub(crate) fn set_sleeping(&self, sleeping: bool) {
        self.sleeping.store(sleeping, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// Chunk-grid math
// ---------------------------------------------------------------------------

/// Number of chunks along each axis for a grid of `size` cells.
pub(crate) fn chunk_dims(size: Point, chunk_size: i32) -> Point {
    Point::new(
        (size.x + chunk_size - 1) / chunk_size,
        (size.y + chunk_size - 1) / chunk_size,
    )
}

/// Build the flattened (row-major) chunk array, clipping bounds at the grid
/// edges.
pub(crate) fn build_chunks(size: Point, chunk_size: i32) -> Vec<Chunk> {
    let dims = chunk_dims(size, chunk_size);
    let mut chunks = Vec::with_capacity(dims.x as usize * dims.y as usize);
    for cy in 0..dims.y {
        for cx in 0..dims.x {
            let x = cx * chunk_size;
            let y = cy * chunk_size;
            let width = chunk_size.min(size.x - x);
            let height = chunk_size.min(size.y - y);
            chunks.push(Chunk::new(Rect::new(x, y, width, height)));
        }
    }
    chunks
}

/// Checkerboard pass parity of a chunk coordinate. Adjacent chunks always
/// differ, including vertical neighbors when the chunk-grid width is even.
#[inline]
pub(crate) fn pass_parity(chunk: Point) -> usize {
    ((chunk.x + chunk.y) & 1) as usize
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
