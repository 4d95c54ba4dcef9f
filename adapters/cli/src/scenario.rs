//! Scenario files describing a headless run.

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use glam::Vec2;
use harbor_defence_core::{
    CellCoord, Effect, EffectKind, GridGeometry, ModifierSet, Rank, Species,
};
use harbor_defence_system_spawning::SpawnOrder;
use serde::Deserialize;

/// Playfield, waves and turret of a run.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Scenario {
    pub(crate) columns: u32,
    pub(crate) rows: u32,
    pub(crate) geometry: GridGeometry,
    pub(crate) exit: CellCoord,
    pub(crate) spawners: Vec<CellCoord>,
    pub(crate) obstacles: Vec<CellCoord>,
    pub(crate) orders: Vec<SpawnOrder>,
    pub(crate) spawn_interval: Duration,
    pub(crate) ticks: u32,
    pub(crate) dt: Duration,
    pub(crate) seed: u64,
    pub(crate) turret: Option<TurretSpec>,
}

/// Stand-in damage source that always strikes the enemy with the lowest priority.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TurretSpec {
    pub(crate) damage: f32,
    pub(crate) cooldown: Duration,
    pub(crate) effect: Option<Effect>,
    /// Every n-th shot also attaches the effect.
    pub(crate) effect_every: u32,
}

impl Scenario {
    /// Reads and validates the scenario stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid scenario at {}", path.display()))
    }

    /// Parses and validates scenario TOML.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let file: ScenarioFile =
            toml::from_str(contents).context("failed to parse scenario toml contents")?;
        file.resolve()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioFile {
    grid: GridSection,
    simulation: SimulationSection,
    #[serde(default)]
    turret: Option<TurretSection>,
    #[serde(default, rename = "wave")]
    waves: Vec<WaveSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GridSection {
    columns: u32,
    rows: u32,
    cell_length: f32,
    #[serde(default)]
    origin: [f32; 2],
    exit: [u32; 2],
    spawners: Vec<[u32; 2]>,
    #[serde(default)]
    obstacles: Vec<[u32; 2]>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SimulationSection {
    ticks: u32,
    dt_ms: u64,
    seed: u64,
    spawn_interval_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TurretSection {
    damage: f32,
    cooldown_ms: u64,
    #[serde(default)]
    effect: Option<String>,
    #[serde(default = "default_effect_duration_ms")]
    effect_duration_ms: u64,
    #[serde(default = "default_effect_every")]
    effect_every: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WaveSection {
    species: String,
    #[serde(default = "default_count")]
    count: u32,
    #[serde(default = "default_rank")]
    rank: u32,
    #[serde(default)]
    modifiers: String,
}

fn default_effect_duration_ms() -> u64 {
    1_000
}

fn default_effect_every() -> u32 {
    1
}

fn default_count() -> u32 {
    1
}

fn default_rank() -> u32 {
    1
}

impl ScenarioFile {
    fn resolve(self) -> Result<Scenario> {
        let grid = self.grid;
        if grid.columns == 0 || grid.rows == 0 {
            bail!("grid must have at least one column and one row");
        }
        if grid.cell_length <= 0.0 {
            bail!("cell_length must be positive, got {}", grid.cell_length);
        }
        let in_grid = |[column, row]: [u32; 2], what: &str| -> Result<CellCoord> {
            if column >= grid.columns || row >= grid.rows {
                bail!(
                    "{what} ({column}, {row}) lies outside the {}x{} grid",
                    grid.columns,
                    grid.rows
                );
            }
            Ok(CellCoord::new(column, row))
        };

        let exit = in_grid(grid.exit, "exit")?;
        let spawners = grid
            .spawners
            .iter()
            .map(|cell| in_grid(*cell, "spawner"))
            .collect::<Result<Vec<_>>>()?;
        if spawners.is_empty() {
            bail!("scenario needs at least one spawner");
        }
        let obstacles = grid
            .obstacles
            .iter()
            .map(|cell| in_grid(*cell, "obstacle"))
            .collect::<Result<Vec<_>>>()?;
        if obstacles.contains(&exit) {
            bail!("the exit cell cannot be an obstacle");
        }

        let mut orders = Vec::new();
        for (index, wave) in self.waves.iter().enumerate() {
            let order = wave
                .resolve()
                .with_context(|| format!("invalid wave #{}", index + 1))?;
            orders.extend(std::iter::repeat(order).take(wave.count as usize));
        }

        let turret = self.turret.map(TurretSection::resolve).transpose()?;
        let cell_length = grid.cell_length;

        Ok(Scenario {
            columns: grid.columns,
            rows: grid.rows,
            geometry: GridGeometry::new(
                Vec2::from_array(grid.origin),
                cell_length,
                cell_length * 0.1,
            ),
            exit,
            spawners,
            obstacles,
            orders,
            spawn_interval: Duration::from_millis(self.simulation.spawn_interval_ms),
            ticks: self.simulation.ticks,
            dt: Duration::from_millis(self.simulation.dt_ms),
            seed: self.simulation.seed,
            turret,
        })
    }
}

impl WaveSection {
    fn resolve(&self) -> Result<SpawnOrder> {
        let species: Species = self.species.parse()?;
        let rank = Rank::new(self.rank)?;
        let modifiers: ModifierSet = self.modifiers.parse()?;
        Ok(SpawnOrder {
            species,
            rank,
            modifiers,
        })
    }
}

impl TurretSection {
    fn resolve(self) -> Result<TurretSpec> {
        if self.cooldown_ms == 0 {
            bail!("turret cooldown must be positive");
        }
        if self.effect_every == 0 {
            bail!("turret effect_every must be positive");
        }
        let effect = match self.effect.as_deref() {
            None => None,
            Some(name) => {
                let duration = Duration::from_millis(self.effect_duration_ms);
                Some(match name.parse::<EffectKind>()? {
                    EffectKind::Slow => Effect::slow(duration),
                    EffectKind::Freeze => Effect::freeze(duration),
                })
            }
        };
        Ok(TurretSpec {
            damage: self.damage,
            cooldown: Duration::from_millis(self.cooldown_ms),
            effect,
            effect_every: self.effect_every,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [grid]
        columns = 8
        rows = 6
        cell_length = 50.0
        exit = [4, 0]
        spawners = [[1, 5], [6, 5]]
        obstacles = [[3, 2]]

        [simulation]
        ticks = 100
        dt_ms = 50
        seed = 9
        spawn_interval_ms = 750

        [turret]
        damage = 5.0
        cooldown_ms = 300
        effect = "freeze"
        effect_every = 4

        [[wave]]
        species = "big-whale"
        count = 2
        rank = 3
        modifiers = "ice shield, fast"

        [[wave]]
        species = "tiny_bird"
    "#;

    #[test]
    fn parses_a_complete_scenario() {
        let scenario = Scenario::parse(MINIMAL).expect("scenario parses");

        assert_eq!(scenario.exit, CellCoord::new(4, 0));
        assert_eq!(scenario.spawners.len(), 2);
        assert_eq!(scenario.obstacles, vec![CellCoord::new(3, 2)]);
        assert_eq!(scenario.geometry.centering_tolerance(), 5.0);
        assert_eq!(scenario.orders.len(), 3);
        assert_eq!(scenario.orders[0].species, Species::BigWhale);
        assert_eq!(scenario.orders[0].rank.get(), 3);
        assert!(scenario.orders[0].modifiers.is_shielded());
        assert_eq!(scenario.orders[2], SpawnOrder::plain(Species::TinyBird));

        let turret = scenario.turret.expect("turret configured");
        assert_eq!(turret.effect.map(|effect| effect.kind()), Some(EffectKind::Freeze));
        assert_eq!(turret.effect_every, 4);
    }

    #[test]
    fn rejects_unknown_species() {
        let contents = MINIMAL.replace("big-whale", "kraken");

        let error = Scenario::parse(&contents).expect_err("kraken is not a species");

        assert!(format!("{error:#}").contains("kraken"));
    }

    #[test]
    fn rejects_spawners_outside_the_grid() {
        let contents = MINIMAL.replace("[6, 5]", "[8, 5]");

        assert!(Scenario::parse(&contents).is_err());
    }

    #[test]
    fn rejects_rank_zero() {
        let contents = MINIMAL.replace("rank = 3", "rank = 0");

        assert!(Scenario::parse(&contents).is_err());
    }

    #[test]
    fn rejects_unknown_fields() {
        let contents = MINIMAL.replace("seed = 9", "seed = 9\nspeed = 2");

        assert!(Scenario::parse(&contents).is_err());
    }

    #[test]
    fn bundled_scenario_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../scenarios/default.toml");

        let scenario = Scenario::load(&path).expect("bundled scenario loads");

        assert!(!scenario.orders.is_empty());
    }
}
