//! Geometric tracing over the grid.
//!
//! Stateless-iterator queries independent of the tick clock: [`LinearTrace`]
//! rasterizes a line of cells with integer Bresenham stepping, and
//! [`RadialTrace`] walks the perimeter of a square filtered down to a disc
//! boundary. Both are finite, single-pass, and non-restartable.

use silt_ecs::entity::Entity;

use crate::point::Point;
use crate::world::World;

// ---------------------------------------------------------------------------
// LinearTrace
// ---------------------------------------------------------------------------

/// Walks the cells from an origin (exclusive) to a destination (inclusive).
///
/// Each [`step`](Self::step) advances exactly one cell along the Bresenham
/// path and returns the occupant of the new position ([`Entity::NULL`] for an
/// empty cell). The path visits at most `max(|Δx|, |Δy|)` cells; a trace from
/// a point to itself is finished before the first step.
///
/// Every visited cell is queried through [`World::dot_at`], so the caller
/// must keep both endpoints inside the grid.
pub struct LinearTrace<'a> {
    world: &'a World,
    origin: Point,
    destination: Point,
    position: Point,
    delta: Point,
    step: Point,
    error: i32,
    finished: bool,
}

impl<'a> LinearTrace<'a> {
    /// Trace from `origin` (exclusive) to `destination` (inclusive).
    pub fn new(world: &'a World, origin: Point, destination: Point) -> Self {
        let delta = Point::new(
            (destination.x - origin.x).abs(),
            (destination.y - origin.y).abs(),
        );
        let step = Point::new(
            if origin.x < destination.x { 1 } else { -1 },
            if origin.y < destination.y { 1 } else { -1 },
        );
        Self {
            world,
            origin,
            destination,
            position: origin,
            delta,
            step,
            error: delta.x - delta.y,
            finished: origin == destination,
        }
    }

    /// Trace `distance` cells from `origin` along the angle `theta`
    /// (radians), rounding the polar offset to the nearest cell.
    pub fn from_angle(world: &'a World, origin: Point, theta: f64, distance: i32) -> Self {
        let destination = origin
            + Point::new(
                (distance as f64 * theta.cos()).round() as i32,
                (distance as f64 * theta.sin()).round() as i32,
            );
        Self::new(world, origin, destination)
    }

    /// Advance one cell without querying the occupant.
    fn advance(&mut self) -> Option<Point> {
        if self.finished {
            return None;
        }
        let e2 = self.error * 2;
        if e2 > -self.delta.y {
            self.error -= self.delta.y;
            self.position.x += self.step.x;
        }
        if e2 < self.delta.x {
            self.error += self.delta.x;
            self.position.y += self.step.y;
        }
        if self.position == self.destination {
            self.finished = true;
        }
        Some(self.position)
    }

    /// Advance one cell and return its occupant, or `None` once the
    /// destination has been visited.
    ///
    /// # Panics
    ///
    /// Panics when the path leaves the grid (bounds violations are fatal).
    pub fn step(&mut self) -> Option<Entity> {
        let position = self.advance()?;
        Some(self.world.dot_at(position))
    }

    /// The trace's starting cell.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// The trace's final cell.
    pub fn destination(&self) -> Point {
        self.destination
    }

    /// The most recently visited cell (the origin before the first step).
    pub fn position(&self) -> Point {
        self.position
    }

    /// Whether the destination has been visited.
    pub fn finished(&self) -> bool {
        self.finished
    }
}

impl Iterator for LinearTrace<'_> {
    type Item = (Point, Entity);

    fn next(&mut self) -> Option<(Point, Entity)> {
        let occupant = self.step()?;
        Some((self.position, occupant))
    }
}

// ---------------------------------------------------------------------------
// RadialTrace
// ---------------------------------------------------------------------------

/// Order of square corners, relative to the origin: the four legs run
/// corner-to-corner, each exclusive of its starting corner, so every
/// perimeter cell is visited exactly once.
fn corner(origin: Point, radius: i32, index: usize) -> Point {
    let offset = match index % 4 {
        0 => Point::new(radius, -radius),
        1 => Point::new(radius, radius),
        2 => Point::new(-radius, radius),
        _ => Point::new(-radius, -radius),
    };
    origin + offset
}

/// Walks the perimeter of the axis-aligned square of side `2·radius`
/// centered on an origin, yielding only cells within squared distance
/// `radius²` of the origin -- an approximation of the disc boundary.
///
/// Cells outside the grid are skipped, so the disc is clipped at the world
/// edge. A trace with `radius <= 0` is finished immediately.
pub struct RadialTrace<'a> {
    world: &'a World,
    origin: Point,
    radius: i32,
    leg: usize,
    trace: Option<LinearTrace<'a>>,
    finished: bool,
}

impl<'a> RadialTrace<'a> {
    /// Trace the disc boundary of `radius` around `origin`.
    pub fn new(world: &'a World, origin: Point, radius: i32) -> Self {
        let finished = radius <= 0;
        let trace = if finished {
            None
        } else {
            Some(LinearTrace::new(
                world,
                corner(origin, radius, 0),
                corner(origin, radius, 1),
            ))
        };
        Self {
            world,
            origin,
            radius,
            leg: 0,
            trace,
            finished,
        }
    }

    /// Advance to the next boundary cell and return it with its occupant, or
    /// `None` once all four legs are exhausted.
    pub fn step(&mut self) -> Option<(Point, Entity)> {
        let limit = (self.radius as i64) * (self.radius as i64);
        while !self.finished {
            let advanced = self.trace.as_mut().and_then(LinearTrace::advance);
            match advanced {
                None => {
                    self.leg += 1;
                    if self.leg == 4 {
                        self.finished = true;
                        self.trace = None;
                    } else {
                        self.trace = Some(LinearTrace::new(
                            self.world,
                            corner(self.origin, self.radius, self.leg),
                            corner(self.origin, self.radius, self.leg + 1),
                        ));
                    }
                }
                Some(position) => {
                    if position.distance_squared(self.origin) <= limit
                        && self.world.in_bounds(position)
                    {
                        return Some((position, self.world.dot_at(position)));
                    }
                }
            }
        }
        None
    }

    /// The disc center.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// The disc radius.
    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Whether all four legs are exhausted.
    pub fn finished(&self) -> bool {
        self.finished
    }
}

impl Iterator for RadialTrace<'_> {
    type Item = (Point, Entity);

    fn next(&mut self) -> Option<(Point, Entity)> {
        self.step()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
