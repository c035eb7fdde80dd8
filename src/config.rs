/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub tuning: Tuning,
    pub tick_rate_ms: u64,
    pub levels_dir: PathBuf,
}

/// Simulation tuning constants. Values are per tick, in world units
/// (one map tile = 32 units). Water variants apply while the player is
/// submerged; the environment modifier selects between the two sets
/// every tick.
#[derive(Clone, Debug)]
pub struct Tuning {
    pub move_speed: f32,
    pub water_move_speed: f32,
    pub jump_speed: f32,
    pub water_jump_speed: f32,
    pub bullet_speed: f32,
    pub water_bullet_speed: f32,
    pub gravity: f32,
    pub spider_speed: f32,
    /// How far above a touched platform's top edge a climbing spider aims.
    pub climb_rise: f32,
    /// A spider re-aims at the player with 1-in-this odds per tick.
    pub reaim_one_in: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            move_speed: default_move_speed(),
            water_move_speed: default_water_move_speed(),
            jump_speed: default_jump_speed(),
            water_jump_speed: default_water_jump_speed(),
            bullet_speed: default_bullet_speed(),
            water_bullet_speed: default_water_bullet_speed(),
            gravity: default_gravity(),
            spider_speed: default_spider_speed(),
            climb_rise: default_climb_rise(),
            reaim_one_in: default_reaim_one_in(),
        }
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    tuning: TomlTuning,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTuning {
    #[serde(default = "default_move_speed")]
    move_speed: f32,
    #[serde(default = "default_water_move_speed")]
    water_move_speed: f32,
    #[serde(default = "default_jump_speed")]
    jump_speed: f32,
    #[serde(default = "default_water_jump_speed")]
    water_jump_speed: f32,
    #[serde(default = "default_bullet_speed")]
    bullet_speed: f32,
    #[serde(default = "default_water_bullet_speed")]
    water_bullet_speed: f32,
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_spider_speed")]
    spider_speed: f32,
    #[serde(default = "default_climb_rise")]
    climb_rise: f32,
    #[serde(default = "default_reaim_one_in")]
    reaim_one_in: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
}

// ── Defaults ──

fn default_move_speed() -> f32 { 2.0 }
fn default_water_move_speed() -> f32 { 1.0 }
fn default_jump_speed() -> f32 { 12.5 }
fn default_water_jump_speed() -> f32 { 6.25 }
fn default_bullet_speed() -> f32 { 7.0 }
fn default_water_bullet_speed() -> f32 { 3.5 }
fn default_gravity() -> f32 { 1.0 }
fn default_spider_speed() -> f32 { 2.0 }
fn default_climb_rise() -> f32 { 100.0 }
fn default_reaim_one_in() -> u32 { 100 }

fn default_tick_rate() -> u64 { 33 }
fn default_levels_dir() -> String { "levels".into() }

impl Default for TomlTuning {
    fn default() -> Self {
        TomlTuning {
            move_speed: default_move_speed(),
            water_move_speed: default_water_move_speed(),
            jump_speed: default_jump_speed(),
            water_jump_speed: default_water_jump_speed(),
            bullet_speed: default_bullet_speed(),
            water_bullet_speed: default_water_bullet_speed(),
            gravity: default_gravity(),
            spider_speed: default_spider_speed(),
            climb_rise: default_climb_rise(),
            reaim_one_in: default_reaim_one_in(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            tick_rate_ms: default_tick_rate(),
            levels_dir: default_levels_dir(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);

        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if PathBuf::from(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs
                .iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        GameConfig {
            tuning: Tuning {
                move_speed: toml_cfg.tuning.move_speed,
                water_move_speed: toml_cfg.tuning.water_move_speed,
                jump_speed: toml_cfg.tuning.jump_speed,
                water_jump_speed: toml_cfg.tuning.water_jump_speed,
                bullet_speed: toml_cfg.tuning.bullet_speed,
                water_bullet_speed: toml_cfg.tuning.water_bullet_speed,
                gravity: toml_cfg.tuning.gravity,
                spider_speed: toml_cfg.tuning.spider_speed,
                climb_rise: toml_cfg.tuning.climb_rise,
                reaim_one_in: toml_cfg.tuning.reaim_one_in.max(1),
            },
            tick_rate_ms: toml_cfg.general.tick_rate_ms,
            levels_dir,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            tuning: Tuning::default(),
            tick_rate_ms: default_tick_rate(),
            levels_dir: PathBuf::from(default_levels_dir()),
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so data is found relative to the real binary.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_fills_missing_fields_with_defaults() {
        let cfg: TomlConfig = toml::from_str(
            "[tuning]\nmove_speed = 3.5\n\n[general]\ntick_rate_ms = 16\n",
        )
        .unwrap();
        assert_eq!(cfg.tuning.move_speed, 3.5);
        assert_eq!(cfg.tuning.jump_speed, 12.5);
        assert_eq!(cfg.general.tick_rate_ms, 16);
        assert_eq!(cfg.general.levels_dir, "levels");
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let cfg: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.tuning.gravity, 1.0);
        assert_eq!(cfg.tuning.water_bullet_speed, 3.5);
        assert_eq!(cfg.tuning.reaim_one_in, 100);
    }
}
