//! Type definitions for `sim_core`.
//!
//! Ids, vectors, ships, weapons, the static world array, content and the
//! per-tick outputs handed to the runtime.

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ---------------------------------------------------------------------------
// Vector math
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    /// Heading used when no direction can be derived.
    pub const UNIT_X: Vec2 = Vec2 { x: 1.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn from_angle(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self { x: cos, y: sin }
    }

    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    /// Unit vector in the same direction, or zero for a zero-length input.
    pub fn normalize_or_zero(self) -> Vec2 {
        let len = self.length();
        if len > f32::EPSILON && len.is_finite() {
            self * (1.0 / len)
        } else {
            Vec2::ZERO
        }
    }

    pub fn lerp(self, other: Vec2, t: f32) -> Vec2 {
        self + (other - self) * t
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

// ---------------------------------------------------------------------------
// ID types
// ---------------------------------------------------------------------------

macro_rules! numeric_id {
    ($name:ident, $repr:ty) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub $repr);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(FactionId, u16);
numeric_id!(SystemId, u32);

impl FactionId {
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl SystemId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Ship,
    Pilot,
}

/// Stable cross-tick identity. Counters are per kind and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Uid {
    pub kind: EntityKind,
    pub counter: u64,
}

impl Uid {
    pub const fn new(kind: EntityKind, counter: u64) -> Self {
        Self { kind, counter }
    }
}

impl std::fmt::Display for Uid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.kind {
            EntityKind::Ship => "ship",
            EntityKind::Pilot => "pilot",
        };
        write!(f, "{prefix}_{:06}", self.counter)
    }
}

// ---------------------------------------------------------------------------
// Ships
// ---------------------------------------------------------------------------

pub const MAX_WEAPON_SLOTS: usize = 8;

pub type WeaponSlots = SmallVec<[Weapon; MAX_WEAPON_SLOTS]>;

/// Visual description of a shot, forwarded untouched to combat events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BulletDescriptor {
    pub speed: f32,
    pub size: f32,
    /// Packed RGBA.
    pub color: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub range: f32,
    /// Shots per tick, not per second.
    pub rate: f32,
    pub damage_per_shot: f32,
    #[serde(default)]
    pub shots_accumulator: f32,
    pub bullet: BulletDescriptor,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShipStats {
    pub hp: f32,
    pub max_hp: f32,
    pub max_speed: f32,
    /// Inverse turn radius. Zero or negative turns instantly.
    pub agility: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    pub uid: Uid,
    pub faction: FactionId,
    pub pilot: Uid,
    pub position: Vec2,
    /// Radians, counter-clockwise from +x.
    pub orientation: f32,
    pub velocity: Vec2,
    pub stats: ShipStats,
    pub weapons: WeaponSlots,
    pub active: bool,
}

impl Ship {
    pub fn heading(&self) -> Vec2 {
        if self.orientation.is_finite() {
            Vec2::from_angle(self.orientation)
        } else {
            Vec2::UNIT_X
        }
    }
}

// ---------------------------------------------------------------------------
// Static world
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarSystemDef {
    pub id: SystemId,
    pub name: String,
    /// Galaxy-space position. Ships use system-local coordinates.
    pub position: Vec2,
    #[serde(default)]
    pub planets: Vec<PlanetDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetDef {
    pub name: String,
    pub orbit_radius: f32,
    pub radius: f32,
    #[serde(default)]
    pub moons: Vec<MoonDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoonDef {
    pub name: String,
    pub orbit_radius: f32,
    pub radius: f32,
}

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldContent {
    pub content_version: String,
    pub systems: Vec<StarSystemDef>,
    pub factions: Vec<FactionDef>,
    #[serde(default)]
    pub hostility_overrides: Vec<HostilityOverride>,
    pub roster: Vec<RosterRule>,
    pub constants: Constants,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactionDef {
    pub id: FactionId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HostilityOverride {
    pub a: FactionId,
    pub b: FactionId,
    pub hostile: bool,
    #[serde(default)]
    pub mirror: bool,
}

/// Ships spawned into every system when the world first ticks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterRule {
    pub faction: FactionId,
    pub ships_per_system: u32,
    pub template: ShipTemplate,
    pub order: InitialOrder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipTemplate {
    pub stats: ShipStats,
    #[serde(default)]
    pub weapons: Vec<Weapon>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InitialOrder {
    Idle,
    /// Patrol a disk of `radius` centered on the spawn point.
    Patrol { radius: f32 },
    AttackAllEnemies,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    /// Simulated seconds advanced by one tick.
    pub logic_step_seconds: f32,
    pub arrive_distance: f32,
    /// Default engagement range for attack orders.
    pub attack_range: f32,
    /// Acquisition radius for `AttackAllEnemies`. `None` searches the whole system.
    #[serde(default)]
    pub acquire_radius: Option<f32>,
    /// Radius of the disk around the system origin used for initial placement.
    pub spawn_radius: f32,
}

// ---------------------------------------------------------------------------
// Tick outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatEvent {
    pub tick: u64,
    pub system: SystemId,
    pub shooter: Uid,
    pub target: Uid,
    pub weapon_slot: u8,
    pub shots_fired: u32,
    pub damage: f32,
    pub shooter_position: Vec2,
    pub target_position: Vec2,
    pub bullet: BulletDescriptor,
    pub target_destroyed: bool,
}

/// One ship as captured at a tick boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShipSample {
    pub uid: Uid,
    pub system: SystemId,
    pub faction: FactionId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub orientation: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipFrame {
    pub tick: u64,
    pub ships: Vec<ShipSample>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceSample {
    pub ship: Uid,
    /// Normalized time within the tick, in (0, 1].
    pub t: f32,
    pub position: Vec2,
    pub orientation: f32,
}

/// Everything a completed tick hands back to the caller thread.
#[derive(Debug, Clone)]
pub struct TickOutput {
    pub tick: u64,
    pub frame: ShipFrame,
    pub events: Vec<CombatEvent>,
    pub trace: crate::SubstepTrace,
    pub dynamic_data_changed: bool,
}
