//! Typed stat tables for enemy kinds and tower types.

use serde::{Deserialize, Serialize};

/// Health of an unscaled enemy before kind multipliers.
pub const BASE_ENEMY_HEALTH: f32 = 100.0;

/// Speed of an unscaled enemy in world units per second.
pub const BASE_ENEMY_SPEED: f32 = 5.0;

/// Upper bound applied to scaled armor so damage never vanishes entirely.
pub const MAX_ARMOR: f32 = 0.95;

/// Applies armor mitigation to a raw damage amount.
///
/// Armor removes a fraction of the damage, but at least one point always lands.
#[must_use]
pub fn mitigated_damage(damage: f32, armor: f32) -> f32 {
    (damage - damage * armor).max(1.0)
}

/// Enemy archetypes spawned by waves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    /// Baseline enemy.
    Normal,
    /// Fragile but quick.
    Fast,
    /// Slow with extra health and light armor.
    Tough,
    /// Heavily armored.
    Armored,
    /// Very slow with large health and armor pools.
    Boss,
    /// Quick, durable and armored.
    Elite,
}

/// Per-kind multipliers applied on top of the base enemy stats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    /// Multiplier applied to base health.
    pub health_multiplier: f32,
    /// Multiplier applied to base speed.
    pub speed_multiplier: f32,
    /// Fraction of incoming damage absorbed before wave scaling.
    pub armor: f32,
    /// Money awarded for a kill before the wave multiplier.
    pub reward: u32,
}

impl EnemyKind {
    /// Every kind in unlock order.
    pub const ALL: [EnemyKind; 6] = [
        EnemyKind::Normal,
        EnemyKind::Fast,
        EnemyKind::Tough,
        EnemyKind::Armored,
        EnemyKind::Boss,
        EnemyKind::Elite,
    ];

    /// Stat multipliers of the kind.
    #[must_use]
    pub const fn stats(self) -> EnemyStats {
        match self {
            EnemyKind::Normal => EnemyStats {
                health_multiplier: 1.0,
                speed_multiplier: 1.0,
                armor: 0.0,
                reward: 10,
            },
            EnemyKind::Fast => EnemyStats {
                health_multiplier: 0.7,
                speed_multiplier: 1.5,
                armor: 0.0,
                reward: 15,
            },
            EnemyKind::Tough => EnemyStats {
                health_multiplier: 1.5,
                speed_multiplier: 0.8,
                armor: 0.1,
                reward: 20,
            },
            EnemyKind::Armored => EnemyStats {
                health_multiplier: 1.2,
                speed_multiplier: 0.9,
                armor: 0.3,
                reward: 25,
            },
            EnemyKind::Boss => EnemyStats {
                health_multiplier: 3.0,
                speed_multiplier: 0.6,
                armor: 0.4,
                reward: 50,
            },
            EnemyKind::Elite => EnemyStats {
                health_multiplier: 2.0,
                speed_multiplier: 1.2,
                armor: 0.2,
                reward: 40,
            },
        }
    }

    /// Lowercase label of the kind.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            EnemyKind::Normal => "normal",
            EnemyKind::Fast => "fast",
            EnemyKind::Tough => "tough",
            EnemyKind::Armored => "armored",
            EnemyKind::Boss => "boss",
            EnemyKind::Elite => "elite",
        }
    }
}

/// Visual and statistical theme of the tower roster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    /// Precision and extended range.
    #[default]
    Tech,
    /// Raw damage and fire rate.
    Energy,
    /// Cheap towers with balanced reach.
    Elemental,
}

/// Identifier of a tower tier within a catalog, from 1 to 12.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerTypeId(u8);

impl TowerTypeId {
    /// Creates a new tower type identifier.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Final stats of a tower type after faction modifiers.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerType {
    /// Identifier used to request placements.
    pub id: TowerTypeId,
    /// Display name.
    pub name: &'static str,
    /// Money required to place the tower.
    pub cost: u32,
    /// Raw damage per shot.
    pub damage: f32,
    /// Targeting radius in world units.
    pub range: f32,
    /// Shots per second.
    pub fire_rate: f32,
}

/// Tower types available to a faction, keyed by identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerCatalog {
    faction: Faction,
    types: Vec<TowerType>,
}

impl TowerCatalog {
    /// Builds the catalog of the provided faction.
    #[must_use]
    pub fn for_faction(faction: Faction) -> Self {
        let roster = match faction {
            Faction::Tech => &TECH_ROSTER,
            Faction::Energy => &ENERGY_ROSTER,
            Faction::Elemental => &ELEMENTAL_ROSTER,
        };

        let types = BASE_TIERS
            .iter()
            .zip(roster.iter())
            .zip(1u8..)
            .map(|((base, entry), id)| TowerType {
                id: TowerTypeId::new(id),
                name: entry.name,
                cost: (f64::from(base.cost) * entry.cost).round() as u32,
                damage: (f64::from(base.damage) * entry.damage).round() as f32,
                range: round_to_tenth(base.range * entry.range),
                fire_rate: round_to_tenth(base.fire_rate * entry.fire_rate),
            })
            .collect();

        Self { faction, types }
    }

    /// Faction the catalog was built for.
    #[must_use]
    pub const fn faction(&self) -> Faction {
        self.faction
    }

    /// Looks up a tower type by identifier.
    #[must_use]
    pub fn get(&self, id: TowerTypeId) -> Option<&TowerType> {
        self.types.iter().find(|tower| tower.id == id)
    }

    /// Iterator over every tower type in tier order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerType> {
        self.types.iter()
    }
}

impl Default for TowerCatalog {
    fn default() -> Self {
        Self::for_faction(Faction::default())
    }
}

fn round_to_tenth(value: f64) -> f32 {
    ((value * 10.0).round() / 10.0) as f32
}

struct BaseTier {
    cost: u32,
    damage: u32,
    range: f64,
    fire_rate: f64,
}

const fn tier(cost: u32, damage: u32, range: f64, fire_rate: f64) -> BaseTier {
    BaseTier {
        cost,
        damage,
        range,
        fire_rate,
    }
}

const BASE_TIERS: [BaseTier; 12] = [
    tier(20, 20, 4.0, 1.0),
    tier(40, 30, 4.5, 1.2),
    tier(70, 40, 5.0, 1.4),
    tier(100, 55, 5.5, 1.6),
    tier(150, 75, 6.0, 1.8),
    tier(200, 90, 6.5, 2.0),
    tier(250, 110, 7.0, 2.2),
    tier(300, 130, 7.5, 2.4),
    tier(400, 150, 8.0, 2.6),
    tier(500, 180, 8.5, 2.8),
    tier(650, 220, 9.0, 3.0),
    tier(800, 300, 10.0, 3.5),
];

struct RosterEntry {
    name: &'static str,
    damage: f64,
    range: f64,
    fire_rate: f64,
    cost: f64,
}

const fn entry(
    name: &'static str,
    damage: f64,
    range: f64,
    fire_rate: f64,
    cost: f64,
) -> RosterEntry {
    RosterEntry {
        name,
        damage,
        range,
        fire_rate,
        cost,
    }
}

const TECH_ROSTER: [RosterEntry; 12] = [
    entry("Sentinel Turret", 1.0, 1.2, 1.0, 1.0),
    entry("Dual Cannon", 1.0, 1.3, 1.1, 1.0),
    entry("Targeting Array", 1.0, 1.4, 1.1, 1.0),
    entry("Railgun Accelerator", 1.2, 1.5, 0.8, 1.1),
    entry("Pulse Cannon", 1.2, 1.4, 1.0, 1.1),
    entry("Tactical Matrix", 1.1, 1.6, 1.0, 1.1),
    entry("Precision Laser", 1.1, 1.7, 1.2, 1.1),
    entry("Quantum Scanner", 1.1, 1.8, 1.2, 1.15),
    entry("Orbital Strike", 1.2, 2.0, 1.0, 1.2),
    entry("Tactical Supercomputer", 1.3, 1.9, 1.3, 1.25),
    entry("Antimatter Cannon", 1.5, 1.8, 1.1, 1.3),
    entry("Singularity Array", 1.4, 2.0, 1.5, 1.4),
];

const ENERGY_ROSTER: [RosterEntry; 12] = [
    entry("Energy Emitter", 1.1, 1.0, 1.1, 1.0),
    entry("Spark Generator", 1.2, 1.0, 1.2, 1.0),
    entry("Arc Conduit", 1.3, 1.0, 1.3, 1.0),
    entry("Lightning Rod", 1.5, 1.0, 1.2, 1.1),
    entry("Plasma Sphere", 1.6, 0.9, 1.2, 1.1),
    entry("Fusion Reactor", 1.7, 0.9, 1.3, 1.1),
    entry("Ionic Disruptor", 1.5, 1.0, 1.6, 1.1),
    entry("Solar Amplifier", 1.8, 1.0, 1.4, 1.15),
    entry("Thunderstorm Generator", 1.7, 1.1, 1.7, 1.2),
    entry("Hadron Collider", 2.0, 1.0, 1.6, 1.25),
    entry("Plasma Vortex", 1.9, 1.1, 1.9, 1.3),
    entry("Supernova Core", 2.5, 1.0, 1.8, 1.4),
];

const ELEMENTAL_ROSTER: [RosterEntry; 12] = [
    entry("Nature Sprout", 0.9, 1.1, 1.0, 0.9),
    entry("Thorn Bush", 0.9, 1.2, 1.1, 0.9),
    entry("Wind Gust", 0.8, 1.4, 1.2, 0.9),
    entry("Stone Spire", 1.3, 1.0, 0.9, 0.9),
    entry("Ice Shard", 1.0, 1.2, 1.1, 0.95),
    entry("Poison Cloud", 1.0, 1.3, 1.2, 1.0),
    entry("Wildfire", 1.2, 1.1, 1.3, 1.0),
    entry("Earthquake", 1.4, 1.0, 1.0, 1.05),
    entry("Tornado Vortex", 1.1, 1.5, 1.3, 1.1),
    entry("Tsunami Wave", 1.2, 1.4, 1.2, 1.15),
    entry("Crystal Formation", 1.5, 1.2, 1.1, 1.2),
    entry("Gaia's Wrath", 1.8, 1.5, 1.3, 1.3),
];
