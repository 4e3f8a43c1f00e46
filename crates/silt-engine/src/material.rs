//! Material data: tags, colors, and per-material behavior parameters.
//!
//! Behavior is pure data -- a dot's movement rule is selected by its
//! [`Material`] tag (see [`rules`](crate::rules)) and tuned by the dynamics
//! components attached at placement time. Nothing here carries code.

use serde::{Deserialize, Serialize};

use silt_ecs::store::{ComponentTable, ComponentTableBuilder};
use silt_ecs::TableError;

// ---------------------------------------------------------------------------
// Material
// ---------------------------------------------------------------------------

/// The behavioral classification of a dot.
///
/// An empty grid cell has no entity and therefore no material; `Material` is
/// only ever attached to a placed dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    /// Falls straight down, then diagonally; sinks past liquids.
    Sand,
    /// Falls, then flows horizontally under a step budget.
    Liquid,
    /// Isotropic random walk over the four cardinal neighbors.
    Gas,
}

// ---------------------------------------------------------------------------
// Rgba
// ---------------------------------------------------------------------------

/// Render color of a dot. The engine never interprets it; renderers read it
/// through [`World::component_or_default`](crate::world::World::component_or_default).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black; the color store's default.
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    /// Liquid dots.
    pub const AQUA: Rgba = Rgba::new(0, 255, 255, 255);
    /// Gas dots.
    pub const DEEP_PINK: Rgba = Rgba::new(255, 20, 147, 255);
    /// Sand dots pick one of these at placement time.
    pub const SAND_PALETTE: [Rgba; 3] = [
        Rgba::new(204, 204, 0, 255),
        Rgba::new(230, 230, 0, 255),
        Rgba::new(179, 179, 0, 255),
    ];

    /// Construct a color.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

// ---------------------------------------------------------------------------
// Behavior data
// ---------------------------------------------------------------------------

/// Dynamics data for solid dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolidDynamics {
    /// Whether a falling dot displaces a liquid occupant of its target --
    /// pushing the liquid to a side when possible, sinking past it otherwise.
    pub displaces_liquid: bool,
}

/// Dynamics data for liquid dots.
///
/// `flow_rate` must stay below the world's chunk size; the parallel pass
/// split relies on a migration never spanning a whole chunk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidDynamics {
    /// Maximum horizontal/diagonal steps per tick.
    pub flow_rate: u32,
    /// Probability of taking each successive step.
    pub flow_chance: f32,
}

impl Default for LiquidDynamics {
    /// Water: two steps per tick, never hesitates.
    fn default() -> Self {
        Self {
            flow_rate: 2,
            flow_chance: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Component kinds
// ---------------------------------------------------------------------------

/// The fixed component kinds of the engine's table, contiguous from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// [`Material`] tag. Present on every placed dot.
    Material = 0,
    /// [`Rgba`] render color.
    Color = 1,
    /// [`SolidDynamics`] behavior data.
    SolidDynamics = 2,
    /// [`LiquidDynamics`] behavior data.
    LiquidDynamics = 3,
}

impl ComponentKind {
    /// Number of kinds in the table.
    pub const COUNT: usize = 4;

    /// The table index of this kind.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Assemble the engine's component table.
///
/// Store defaults are only ever surfaced to stale-handle readers; a live dot
/// always has its components attached explicitly at placement.
pub(crate) fn material_table() -> Result<ComponentTable, TableError> {
    ComponentTableBuilder::new(ComponentKind::COUNT)
        .register::<Material>(ComponentKind::Material.index(), 1024, Material::Sand)
        .register::<Rgba>(ComponentKind::Color.index(), 1024, Rgba::TRANSPARENT)
        .register::<SolidDynamics>(
            ComponentKind::SolidDynamics.index(),
            512,
            SolidDynamics {
                displaces_liquid: false,
            },
        )
        .register::<LiquidDynamics>(
            ComponentKind::LiquidDynamics.index(),
            512,
            LiquidDynamics::default(),
        )
        .build()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
