//! The [`World`]: grid ownership, spatial queries, mutation primitives, and
//! the chunked two-pass parallel tick.
//!
//! All grid mutation flows through [`add_dot`](World::add_dot),
//! [`delete_dot`](World::delete_dot), [`move_dot`](World::move_dot) and
//! [`swap_dots`](World::swap_dots) -- wake bookkeeping is co-located with
//! every write, so a direct cell store would silently break the sleep
//! machinery. Out-of-bounds points and occupied targets are programming
//! errors upstream (a bad coordinate mapping, a missing
//! [`is_open`](World::is_open) check) and panic immediately; nothing here is
//! retried or recovered.
//!
//! # Tick scheduling
//!
//! [`update`](World::update) clears the per-cell access lock, reshuffles the
//! two shared column permutations, and runs the non-sleeping chunks in two
//! sequential data-parallel passes split by checkerboard parity of the chunk
//! coordinate. Adjacent chunks never share a pass, and a migration never
//! travels a whole chunk, so concurrently scanned chunks cannot touch the
//! same cells; the one remaining hazard -- a dot crossing into a chunk that
//! runs in the other pass -- is recorded in the lock bitset with a single
//! compare-and-swap per migration.

use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;

use silt_ecs::entity::Entity;
use silt_ecs::manager::EntityManager;

use crate::chunk::{self, Chunk};
use crate::grid::EntityGrid;
use crate::lock::GridAccessLock;
use crate::material::{self, ComponentKind, LiquidDynamics, Material, Rgba, SolidDynamics};
use crate::point::Point;
use crate::rng::RngContext;
use crate::rules;

/// The 8-neighborhood of a point plus the point itself; every offset's chunk
/// is woken when the point mutates.
const WAKE_OFFSETS: [Point; 9] = [
    Point::new(0, 0),
    Point::new(0, 1),
    Point::new(1, 1),
    Point::new(1, 0),
    Point::new(1, -1),
    Point::new(0, -1),
    Point::new(-1, -1),
    Point::new(-1, 0),
    Point::new(-1, 1),
];

// ---------------------------------------------------------------------------
// WorldConfig
// ---------------------------------------------------------------------------

/// Construction parameters for a [`World`].
#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// Chunk edge length in cells. Must be positive.
    pub chunk_size: i32,
    /// Seed for the randomness context; `None` draws one from OS entropy.
    /// Two identically mutated worlds with the same seed stay bit-identical.
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_size: 32,
            seed: None,
        }
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// The simulation world: a grid of dots, their component storage, and the
/// chunk scheduler.
pub struct World {
    size: Point,
    chunk_size: i32,
    grid: EntityGrid,
    entities: EntityManager,
    particles: u32,
    access_lock: GridAccessLock,
    chunks: Vec<Chunk>,
    chunk_dims: Point,
    x_order: Vec<i32>,
    edge_order: Vec<i32>,
    rng: RngContext,
    tick: u64,
}

impl World {
    /// Create a world with the default configuration (32-cell chunks, entropy
    /// seed).
    ///
    /// # Panics
    ///
    /// Panics when `size` is not positive on both axes.
    pub fn new(size: Point) -> Self {
        Self::with_config(size, WorldConfig::default())
    }

    /// Create a world with an explicit configuration.
    ///
    /// # Panics
    ///
    /// Panics when `size` or the chunk size is not positive, or when the
    /// built-in component table fails validation -- all fatal at construction,
    /// never at runtime.
    pub fn with_config(size: Point, config: WorldConfig) -> Self {
        assert!(
            size.x > 0 && size.y > 0,
            "world size must be positive on both axes, got {size}"
        );
        assert!(
            config.chunk_size > 0,
            "chunk size must be positive, got {}",
            config.chunk_size
        );

        let table = material::material_table()
            .unwrap_or_else(|error| panic!("material component table misconfigured: {error}"));
        let rng = match config.seed {
            Some(seed) => RngContext::with_seed(seed),
            None => RngContext::from_entropy(),
        };
        let chunks = chunk::build_chunks(size, config.chunk_size);
        let chunk_dims = chunk::chunk_dims(size, config.chunk_size);

        tracing::debug!(
            width = size.x,
            height = size.y,
            chunk_size = config.chunk_size,
            chunks = chunks.len(),
            seed = rng.seed(),
            "world created"
        );

        Self {
            size,
            chunk_size: config.chunk_size,
            grid: EntityGrid::new(size),
            entities: EntityManager::new(table),
            particles: 0,
            access_lock: GridAccessLock::new(size),
            chunks,
            chunk_dims,
            x_order: (0..config.chunk_size).collect(),
            edge_order: (0..size.x % config.chunk_size).collect(),
            rng,
            tick: 0,
        }
    }

    // -- dimensions & bookkeeping --------------------------------------------

    /// Grid size in cells.
    pub fn size(&self) -> Point {
        self.size
    }

    /// Chunk edge length in cells.
    pub fn chunk_size(&self) -> i32 {
        self.chunk_size
    }

    /// Number of live dots. Always equals the number of non-null grid cells.
    pub fn particle_count(&self) -> u32 {
        self.particles
    }

    /// Number of completed [`update`](Self::update) calls.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// The seed driving this world's randomness context.
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Entity-keyed storage operations ([`EntityManager::resolve`],
    /// component access by handle).
    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    /// Mutable entity-keyed storage operations.
    pub fn entities_mut(&mut self) -> &mut EntityManager {
        &mut self.entities
    }

    // -- spatial queries -----------------------------------------------------

    /// Whether `p` lies inside the grid.
    #[inline]
    pub fn in_bounds(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.size.x && p.y < self.size.y
    }

    #[inline]
    fn assert_in_bounds(&self, p: Point) {
        if !self.in_bounds(p) {
            panic!("point {p} is outside the world bounds {}", self.size);
        }
    }

    /// Whether the cell at `p` is unoccupied.
    ///
    /// # Panics
    ///
    /// Panics when `p` is out of bounds -- that is an upstream coordinate
    /// mapping bug, never silently clamped.
    #[inline]
    pub fn is_empty(&self, p: Point) -> bool {
        self.assert_in_bounds(p);
        self.grid.get(p).is_null()
    }

    /// Whether `p` is inside the grid and unoccupied.
    #[inline]
    pub fn is_open(&self, p: Point) -> bool {
        self.in_bounds(p) && self.is_empty(p)
    }

    /// The occupant of `p`, or [`Entity::NULL`] for an empty cell.
    ///
    /// # Panics
    ///
    /// Panics when `p` is out of bounds.
    #[inline]
    pub fn dot_at(&self, p: Point) -> Entity {
        self.assert_in_bounds(p);
        self.grid.get(p)
    }

    /// The material tag of the occupant of `p`, or `None` for an empty cell.
    ///
    /// # Panics
    ///
    /// Panics when `p` is out of bounds.
    pub fn material_at(&self, p: Point) -> Option<Material> {
        let entity = self.dot_at(p);
        if self.entities.has_component(entity, ComponentKind::Material.index()) {
            Some(
                self.entities
                    .component_or_default(entity, ComponentKind::Material.index()),
            )
        } else {
            None
        }
    }

    /// The `kind` component of the occupant of `p`, or the store's declared
    /// default when the cell is empty or the component unattached.
    ///
    /// # Panics
    ///
    /// Panics when `p` is out of bounds.
    pub fn component_or_default<T: Clone + Send + Sync + 'static>(
        &self,
        p: Point,
        kind: ComponentKind,
    ) -> T {
        self.entities.component_or_default(self.dot_at(p), kind.index())
    }

    /// Whether the occupant of `p` carries the `kind` component.
    ///
    /// # Panics
    ///
    /// Panics when `p` is out of bounds.
    pub fn has_component(&self, p: Point, kind: ComponentKind) -> bool {
        self.entities.has_component(self.dot_at(p), kind.index())
    }

    /// Attach the `kind` component to the occupant of `p`. Silent no-op for
    /// an empty cell.
    ///
    /// # Panics
    ///
    /// Panics when `p` is out of bounds.
    pub fn attach_component<T: Clone + Send + Sync + 'static>(
        &mut self,
        p: Point,
        kind: ComponentKind,
        value: T,
    ) {
        let entity = self.dot_at(p);
        self.entities.attach_component(entity, kind.index(), value);
    }

    /// Overwrite the `kind` component of the occupant of `p`. Silent no-op
    /// for an empty cell or unattached component.
    ///
    /// # Panics
    ///
    /// Panics when `p` is out of bounds.
    pub fn set_component<T: Clone + Send + Sync + 'static>(
        &mut self,
        p: Point,
        kind: ComponentKind,
        value: T,
    ) {
        let entity = self.dot_at(p);
        self.entities.set_component(entity, kind.index(), value);
    }

    /// Release the `kind` component of the occupant of `p`. Silent no-op for
    /// an empty cell.
    ///
    /// # Panics
    ///
    /// Panics when `p` is out of bounds.
    pub fn free_component(&mut self, p: Point, kind: ComponentKind) {
        let entity = self.dot_at(p);
        self.entities.free_component(entity, kind.index());
    }

    // -- chunk queries -------------------------------------------------------

    /// Whether the chunk at chunk coordinate `chunk` is sleeping.
    ///
    /// # Panics
    ///
    /// Panics when `chunk` is outside the chunk grid.
    pub fn is_chunk_sleeping(&self, chunk: Point) -> bool {
        if chunk.x < 0 || chunk.y < 0 || chunk.x >= self.chunk_dims.x || chunk.y >= self.chunk_dims.y
        {
            panic!(
                "chunk {chunk} is outside the chunk grid {}",
                self.chunk_dims
            );
        }
        self.chunks[(chunk.y * self.chunk_dims.x + chunk.x) as usize].is_sleeping()
    }

    /// Whether the chunk containing `p` is sleeping.
    ///
    /// # Panics
    ///
    /// Panics when `p` is out of bounds.
    pub fn is_point_sleeping(&self, p: Point) -> bool {
        self.assert_in_bounds(p);
        self.chunks[self.chunk_index_of(p)].is_sleeping()
    }

    #[inline]
    fn chunk_index_of(&self, p: Point) -> usize {
        let cx = p.x / self.chunk_size;
        let cy = p.y / self.chunk_size;
        (cy * self.chunk_dims.x + cx) as usize
    }

    // -- mutation ------------------------------------------------------------

    /// Place a dot of `material` at `p`, attaching its material, color, and
    /// dynamics components, and wake the neighborhood. Returns the new
    /// handle.
    ///
    /// # Panics
    ///
    /// Panics when `p` is out of bounds or already occupied -- check
    /// [`is_open`](Self::is_open) first.
    pub fn add_dot(&mut self, p: Point, material: Material) -> Entity {
        if !self.is_empty(p) {
            panic!("cannot add dot at {p}: cell is occupied");
        }

        let entity = self.entities.allocate();
        self.entities
            .attach_component(entity, ComponentKind::Material.index(), material);
        match material {
            Material::Sand => {
                let color =
                    Rgba::SAND_PALETTE[self.rng.master().gen_range(0..Rgba::SAND_PALETTE.len())];
                self.entities
                    .attach_component(entity, ComponentKind::Color.index(), color);
                self.entities.attach_component(
                    entity,
                    ComponentKind::SolidDynamics.index(),
                    SolidDynamics {
                        displaces_liquid: true,
                    },
                );
            }
            Material::Liquid => {
                self.entities
                    .attach_component(entity, ComponentKind::Color.index(), Rgba::AQUA);
                self.entities.attach_component(
                    entity,
                    ComponentKind::LiquidDynamics.index(),
                    LiquidDynamics::default(),
                );
            }
            Material::Gas => {
                self.entities
                    .attach_component(entity, ComponentKind::Color.index(), Rgba::DEEP_PINK);
            }
        }

        self.grid.set(p, entity);
        self.particles += 1;
        self.wake(p);
        entity
    }

    /// Remove the dot at `p`, freeing its entity and components. No-op when
    /// the cell is already empty.
    ///
    /// # Panics
    ///
    /// Panics when `p` is out of bounds.
    pub fn delete_dot(&mut self, p: Point) {
        self.assert_in_bounds(p);
        let entity = self.grid.get(p);
        if self.entities.free(entity) {
            self.particles -= 1;
            self.wake(p);
        }
        self.grid.set(p, Entity::NULL);
    }

    /// Relocate the occupant of `a` to the empty cell `b`, clearing `a` and
    /// waking both neighborhoods.
    ///
    /// # Panics
    ///
    /// Panics when `a` or `b` is out of bounds, or when `b` is occupied --
    /// check [`is_open`](Self::is_open) first.
    pub fn move_dot(&self, a: Point, b: Point) {
        self.assert_in_bounds(a);
        if !self.is_empty(b) {
            panic!("cannot move dot to {b}: cell is occupied");
        }
        let entity = self.grid.get(a);
        self.grid.set(b, entity);
        self.grid.set(a, Entity::NULL);
        self.wake(a);
        self.wake(b);
    }

    /// Unconditionally exchange the occupants of `a` and `b` (either may be
    /// empty) and wake both neighborhoods. Used for same-tick displacement,
    /// e.g. a solid sinking past a liquid.
    ///
    /// # Panics
    ///
    /// Panics when `a` or `b` is out of bounds.
    pub fn swap_dots(&self, a: Point, b: Point) {
        self.assert_in_bounds(a);
        self.assert_in_bounds(b);
        let at_a = self.grid.get(a);
        let at_b = self.grid.get(b);
        self.grid.set(a, at_b);
        self.grid.set(b, at_a);
        self.wake(a);
        self.wake(b);
    }

    /// Set the per-tick write flag for `p`. External systems that migrate
    /// dots outside the built-in rules use this to keep a moved dot from
    /// acting twice in one tick.
    ///
    /// # Panics
    ///
    /// Panics when `p` is out of bounds.
    pub fn lock_updates(&self, p: Point) -> bool {
        self.assert_in_bounds(p);
        self.access_lock.try_lock(p)
    }

    /// Wake every chunk touching the 8-neighborhood of `p` (and `p`'s own).
    fn wake(&self, p: Point) {
        for offset in WAKE_OFFSETS {
            let q = p + offset;
            if !self.in_bounds(q) {
                continue;
            }
            self.chunks[self.chunk_index_of(q)].set_sleeping(false);
        }
    }

    // -- tick ----------------------------------------------------------------

    /// Advance the simulation by one discrete step.
    ///
    /// Clears the access lock, reshuffles the shared column permutations,
    /// then scans the non-sleeping chunks in two sequential data-parallel
    /// passes (checkerboard parity; intra-pass chunks run concurrently).
    pub fn update(&mut self) {
        self.access_lock.clear();
        self.tick += 1;
        self.x_order.shuffle(self.rng.master());
        self.edge_order.shuffle(self.rng.master());

        let mut passes: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
        for index in 0..self.chunks.len() {
            let coord = Point::new(
                (index % self.chunk_dims.x as usize) as i32,
                (index / self.chunk_dims.x as usize) as i32,
            );
            passes[chunk::pass_parity(coord)].push(index);
        }

        let tick = self.tick;
        let world = &*self;
        for group in &passes {
            group.par_iter().for_each(|&index| {
                let chunk = &world.chunks[index];
                if chunk.is_sleeping() {
                    return;
                }
                world.scan_chunk(index, tick);
            });
        }

        tracing::trace!(tick, particles = self.particles, "tick complete");
    }

    /// Scan one chunk: provisionally mark it sleeping (any wake this tick
    /// clears the mark), then visit columns in the shared shuffled order and
    /// rows top-to-bottom, dispatching each occupied cell to its material
    /// rule. Locked cells were written this tick -- they are skipped, and
    /// seeing one vetoes sleep because the write may have come from another
    /// chunk.
    fn scan_chunk(&self, chunk_index: usize, tick: u64) {
        let chunk = &self.chunks[chunk_index];
        chunk.set_sleeping(true);
        let bounds = chunk.bounds();
        let order: &[i32] = if bounds.width == self.chunk_size {
            &self.x_order
        } else {
            &self.edge_order
        };
        let mut rng = self.rng.chunk_stream(tick, chunk_index);

        for &x in order {
            for y in 0..bounds.height {
                let p = Point::new(bounds.x + x, bounds.y + y);
                if self.access_lock.is_locked(p) {
                    chunk.set_sleeping(false);
                    continue;
                }
                let Some(material) = self.material_at(p) else {
                    continue;
                };
                if let Some(destination) = rules::migration_for(material)(self, p, &mut rng) {
                    self.access_lock.try_lock(destination);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
