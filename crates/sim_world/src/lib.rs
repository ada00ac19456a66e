//! Content loading and world construction shared between sim_cli and sim_runtime.

use anyhow::{ensure, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sim_core::{
    Constants, FactionDef, FactionId, HostilityOverride, InitialOrder, RosterRule, StarSystemDef,
    Vec2, WorldContent, WorldContext, MAX_WEAPON_SLOTS,
};
use std::collections::HashSet;
use std::path::Path;

#[derive(Deserialize)]
struct StarSystemsFile {
    content_version: String,
    systems: Vec<StarSystemDef>,
}

#[derive(Deserialize)]
struct FactionsFile {
    factions: Vec<FactionDef>,
    #[serde(default)]
    hostility_overrides: Vec<HostilityOverride>,
    #[serde(default)]
    roster: Vec<RosterRule>,
}

/// Validates loaded content, returning the first authoring error found.
///
/// Catches mistakes like a system whose id does not match its position in the
/// array, a roster rule for an unknown faction, or a non-positive tick length.
pub fn validate_content(content: &WorldContent) -> Result<()> {
    ensure!(
        !content.content_version.is_empty(),
        "content_version is empty"
    );
    validate_constants(&content.constants)?;

    ensure!(!content.systems.is_empty(), "no star systems defined");
    for (index, system) in content.systems.iter().enumerate() {
        ensure!(
            system.id.index() == index,
            "star system '{}' has id {} but sits at index {index}",
            system.name,
            system.id,
        );
        ensure!(!system.name.is_empty(), "star system {} has an empty name", system.id);
        ensure!(
            finite(system.position),
            "star system '{}' has a non-finite position",
            system.name,
        );
        for planet in &system.planets {
            ensure!(
                planet.orbit_radius > 0.0 && planet.radius > 0.0,
                "planet '{}' in '{}' needs positive orbit and body radii",
                planet.name,
                system.name,
            );
            for moon in &planet.moons {
                ensure!(
                    moon.orbit_radius > 0.0 && moon.radius > 0.0,
                    "moon '{}' of '{}' needs positive orbit and body radii",
                    moon.name,
                    planet.name,
                );
            }
        }
    }

    ensure!(!content.factions.is_empty(), "no factions defined");
    let mut faction_ids: HashSet<FactionId> = HashSet::new();
    for faction in &content.factions {
        ensure!(
            faction_ids.insert(faction.id),
            "faction id {} is defined twice",
            faction.id,
        );
        ensure!(!faction.name.is_empty(), "faction {} has an empty name", faction.id);
    }

    for o in &content.hostility_overrides {
        ensure!(
            faction_ids.contains(&o.a) && faction_ids.contains(&o.b),
            "hostility override {} -> {} references an unknown faction",
            o.a,
            o.b,
        );
    }

    for (index, rule) in content.roster.iter().enumerate() {
        validate_roster_rule(index, rule, &faction_ids)?;
    }
    Ok(())
}

fn validate_constants(c: &Constants) -> Result<()> {
    ensure!(
        c.logic_step_seconds.is_finite() && c.logic_step_seconds > 0.0,
        "logic_step_seconds must be positive, got {}",
        c.logic_step_seconds,
    );
    ensure!(
        c.arrive_distance.is_finite() && c.arrive_distance >= 0.0,
        "arrive_distance must be non-negative, got {}",
        c.arrive_distance,
    );
    ensure!(
        c.attack_range.is_finite() && c.attack_range > 0.0,
        "attack_range must be positive, got {}",
        c.attack_range,
    );
    if let Some(radius) = c.acquire_radius {
        ensure!(
            radius.is_finite() && radius > 0.0,
            "acquire_radius must be positive when set, got {radius}",
        );
    }
    ensure!(
        c.spawn_radius.is_finite() && c.spawn_radius >= 0.0,
        "spawn_radius must be non-negative, got {}",
        c.spawn_radius,
    );
    Ok(())
}

fn validate_roster_rule(index: usize, rule: &RosterRule, factions: &HashSet<FactionId>) -> Result<()> {
    ensure!(
        factions.contains(&rule.faction),
        "roster rule {index} references unknown faction {}",
        rule.faction,
    );
    let stats = &rule.template.stats;
    ensure!(
        stats.max_hp > 0.0 && stats.hp > 0.0 && stats.hp <= stats.max_hp,
        "roster rule {index}: hp {} must be in (0, max_hp {}]",
        stats.hp,
        stats.max_hp,
    );
    ensure!(
        stats.max_speed.is_finite() && stats.max_speed >= 0.0,
        "roster rule {index}: max_speed must be non-negative, got {}",
        stats.max_speed,
    );
    ensure!(
        stats.agility.is_finite(),
        "roster rule {index}: agility is not finite",
    );
    ensure!(
        rule.template.weapons.len() <= MAX_WEAPON_SLOTS,
        "roster rule {index}: {} weapons exceed the {MAX_WEAPON_SLOTS} slots",
        rule.template.weapons.len(),
    );
    for (slot, weapon) in rule.template.weapons.iter().enumerate() {
        ensure!(
            weapon.range > 0.0 && weapon.rate >= 0.0 && weapon.damage_per_shot >= 0.0,
            "roster rule {index} weapon {slot}: range must be positive, rate and damage non-negative",
        );
    }
    if let InitialOrder::Patrol { radius } = rule.order {
        ensure!(
            radius.is_finite() && radius >= 0.0,
            "roster rule {index}: patrol radius must be non-negative, got {radius}",
        );
    }
    Ok(())
}

fn finite(v: Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

fn read_json<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<T> {
    let text = std::fs::read_to_string(dir.join(file)).with_context(|| format!("reading {file}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {file}"))
}

/// Load and validate `constants.json`, `star_systems.json` and `factions.json`.
pub fn load_content(content_dir: &str) -> Result<WorldContent> {
    let dir = Path::new(content_dir);
    let constants: Constants = read_json(dir, "constants.json")?;
    let systems_file: StarSystemsFile = read_json(dir, "star_systems.json")?;
    let factions_file: FactionsFile = read_json(dir, "factions.json")?;
    let content = WorldContent {
        content_version: systems_file.content_version,
        systems: systems_file.systems,
        factions: factions_file.factions,
        hostility_overrides: factions_file.hostility_overrides,
        roster: factions_file.roster,
        constants,
    };
    validate_content(&content).with_context(|| format!("validating content in {content_dir}"))?;
    Ok(content)
}

/// A fresh world over validated content. Ships spawn on the first tick.
pub fn build_world(content: &WorldContent, seed: u64) -> WorldContext {
    WorldContext::new(content, seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::test_fixtures::{base_content, fleet_content, weapon};
    use sim_core::{MoonDef, PlanetDef, SystemId};

    fn error_text(content: &WorldContent) -> String {
        format!("{:#}", validate_content(content).unwrap_err())
    }

    #[test]
    fn test_valid_content_passes_validation() {
        validate_content(&base_content()).unwrap();
        validate_content(&fleet_content(2)).unwrap();
    }

    #[test]
    fn test_system_id_must_match_index() {
        let mut content = base_content();
        content.systems[1].id = SystemId(5);
        assert!(error_text(&content).contains("sits at index 1"));
    }

    #[test]
    fn test_duplicate_faction_rejected() {
        let mut content = base_content();
        content.factions[1].id = FactionId(0);
        assert!(error_text(&content).contains("defined twice"));
    }

    #[test]
    fn test_override_unknown_faction_rejected() {
        let mut content = base_content();
        content.hostility_overrides.push(HostilityOverride {
            a: FactionId(0),
            b: FactionId(9),
            hostile: false,
            mirror: true,
        });
        assert!(error_text(&content).contains("unknown faction"));
    }

    #[test]
    fn test_roster_unknown_faction_rejected() {
        let mut content = fleet_content(1);
        content.roster[0].faction = FactionId(7);
        assert!(error_text(&content).contains("unknown faction 7"));
    }

    #[test]
    fn test_too_many_weapons_rejected() {
        let mut content = fleet_content(1);
        content.roster[0].template.weapons = vec![weapon(1.0, 1.0, 1.0); MAX_WEAPON_SLOTS + 1];
        assert!(error_text(&content).contains("slots"));
    }

    #[test]
    fn test_zero_tick_length_rejected() {
        let mut content = base_content();
        content.constants.logic_step_seconds = 0.0;
        assert!(error_text(&content).contains("logic_step_seconds"));
    }

    #[test]
    fn test_bad_moon_rejected() {
        let mut content = base_content();
        content.systems[0].planets.push(PlanetDef {
            name: "Rock".to_string(),
            orbit_radius: 40.0,
            radius: 2.0,
            moons: vec![MoonDef {
                name: "Pebble".to_string(),
                orbit_radius: 0.0,
                radius: 0.5,
            }],
        });
        assert!(error_text(&content).contains("Pebble"));
    }

    #[test]
    fn test_load_round_trips_through_a_content_dir() {
        let content = fleet_content(2);
        let dir = tempfile::tempdir().unwrap();
        let write = |file: &str, value: serde_json::Value| {
            std::fs::write(dir.path().join(file), value.to_string()).unwrap();
        };
        write("constants.json", serde_json::to_value(&content.constants).unwrap());
        write(
            "star_systems.json",
            serde_json::json!({
                "content_version": content.content_version,
                "systems": content.systems,
            }),
        );
        write(
            "factions.json",
            serde_json::json!({
                "factions": content.factions,
                "roster": content.roster,
            }),
        );

        let loaded = load_content(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(loaded.systems.len(), 2);
        assert_eq!(loaded.roster.len(), 2);
        assert!(loaded.hostility_overrides.is_empty());
        assert!(!build_world(&loaded, 1).is_spawned());
    }

    #[test]
    fn test_missing_file_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_content(dir.path().to_str().unwrap()).unwrap_err();
        assert!(format!("{err:#}").contains("constants.json"));
    }
}
