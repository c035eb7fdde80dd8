/// Level loader.
///
/// ## Sources (priority order):
///   1. `levels/` directory (`level_1.txt`, `level_2.txt`, ... contiguous)
///   2. Built-in embedded levels
///
/// ## Single-level format (`.txt`):
///   Line 1: `# Level Name`
///   Lines: map rows
///
/// ## Tile legend:
///   '#' = Platform               'H' = Ladder
///   '~' = Water                  '$' = Coin
///   'E' = Spider spawn           'P' = Player spawn
///   ' ' = Empty
///
/// Each cell is a TILE x TILE world-space square; horizontal runs of
/// the same platform/zone character merge into one rect. Level indices
/// are 1-based. An index past the last definition is `Exhausted` (the
/// caller answers with the Win transition); a definition that cannot
/// be built is `Malformed` and fatal.

use std::fmt;
use std::path::Path;

use glam::Vec2;

use crate::domain::entity::{Coin, Spider};
use crate::domain::geometry::Rect;

/// World units per map cell.
pub const TILE: f32 = 32.0;

/// A level as authored: a named char grid.
pub struct LevelDef {
    pub name: String,
    pub rows: Vec<String>,
}

/// A level ready to simulate: the named layers in world space.
#[derive(Debug)]
pub struct LevelData {
    pub name: String,
    pub bounds: Rect,
    pub platforms: Vec<Rect>,
    pub ladders: Vec<Rect>,
    pub water: Vec<Rect>,
    pub coins: Vec<Coin>,
    pub spiders: Vec<Spider>,
    pub player_spawn: Vec2,
}

#[derive(Debug)]
pub enum LoadError {
    /// Requested index is past the last defined level.
    Exhausted { requested: usize, available: usize },
    /// The definition exists but cannot be built into a level.
    Malformed { level: usize, reason: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Exhausted { requested, available } => {
                write!(f, "level {requested} requested but only {available} exist")
            }
            LoadError::Malformed { level, reason } => {
                write!(f, "level {level} is malformed: {reason}")
            }
        }
    }
}

impl std::error::Error for LoadError {}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Number of levels the active source defines.
pub fn available(levels_dir: &Path) -> usize {
    level_defs(levels_dir).len()
}

/// Load the 1-based `index`th level.
pub fn load(index: usize, levels_dir: &Path) -> Result<LevelData, LoadError> {
    let defs = level_defs(levels_dir);
    if index == 0 {
        return Err(LoadError::Malformed {
            level: index,
            reason: "level indices are 1-based".into(),
        });
    }
    if index > defs.len() {
        return Err(LoadError::Exhausted { requested: index, available: defs.len() });
    }
    build(&defs[index - 1]).map_err(|reason| LoadError::Malformed { level: index, reason })
}

// ══════════════════════════════════════════════════════════════
// Grid → layers
// ══════════════════════════════════════════════════════════════

fn cell_center(x: usize, y: usize) -> Vec2 {
    Vec2::new((x as f32 + 0.5) * TILE, (y as f32 + 0.5) * TILE)
}

fn build(def: &LevelDef) -> Result<LevelData, String> {
    if def.rows.is_empty() {
        return Err("level grid is empty".into());
    }
    let width = def.rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    if width == 0 {
        return Err("level grid has no columns".into());
    }

    let mut platforms = Vec::new();
    let mut ladders = Vec::new();
    let mut water = Vec::new();
    let mut coins = Vec::new();
    let mut spiders = Vec::new();
    let mut player_spawn = None;

    for (y, row) in def.rows.iter().enumerate() {
        let cells: Vec<char> = row.chars().collect();
        let mut x = 0;
        while x < cells.len() {
            let ch = cells[x];
            match ch {
                '#' | 'H' | '~' => {
                    let start = x;
                    while x < cells.len() && cells[x] == ch {
                        x += 1;
                    }
                    let rect = Rect::new(
                        start as f32 * TILE,
                        y as f32 * TILE,
                        (x - start) as f32 * TILE,
                        TILE,
                    );
                    match ch {
                        '#' => platforms.push(rect),
                        'H' => ladders.push(rect),
                        _ => water.push(rect),
                    }
                    continue;
                }
                '$' => coins.push(Coin::new(cell_center(x, y))),
                'E' => spiders.push(Spider::new(cell_center(x, y))),
                'P' => {
                    if player_spawn.is_some() {
                        return Err("more than one player spawn ('P')".into());
                    }
                    player_spawn = Some(cell_center(x, y));
                }
                _ => {}
            }
            x += 1;
        }
    }

    let player_spawn = player_spawn.ok_or_else(|| "no player spawn ('P')".to_string())?;

    Ok(LevelData {
        name: def.name.clone(),
        bounds: Rect::new(0.0, 0.0, width as f32 * TILE, def.rows.len() as f32 * TILE),
        platforms,
        ladders,
        water,
        coins,
        spiders,
        player_spawn,
    })
}

// ══════════════════════════════════════════════════════════════
// Sources
// ══════════════════════════════════════════════════════════════

fn level_defs(levels_dir: &Path) -> Vec<LevelDef> {
    let from_dir = load_from_directory(levels_dir);
    if !from_dir.is_empty() {
        from_dir
    } else {
        embedded_levels()
    }
}

/// Load `level_1.txt`, `level_2.txt`, ... while they exist.
fn load_from_directory(dir: &Path) -> Vec<LevelDef> {
    let mut defs = Vec::new();
    if !dir.is_dir() {
        return defs;
    }
    for n in 1.. {
        let path = dir.join(format!("level_{n}.txt"));
        let Ok(content) = std::fs::read_to_string(&path) else { break };
        match parse_level_file(&content) {
            Some(def) => defs.push(def),
            // Keep the slot so later indices stay aligned; build() will
            // report this one as malformed.
            None => defs.push(LevelDef { name: format!("level_{n}.txt"), rows: vec![] }),
        }
    }
    defs
}

/// Parse a single level from text content.
fn parse_level_file(content: &str) -> Option<LevelDef> {
    let mut name = String::new();
    let mut rows = Vec::new();

    for line in content.lines() {
        if line.starts_with('#') && name.is_empty() && is_name_line(line) {
            name = line[1..].trim().to_string();
        } else {
            rows.push(line.to_string());
        }
    }

    while rows.last().is_some_and(|r| r.trim().is_empty()) {
        rows.pop();
    }

    if rows.is_empty() {
        return None;
    }

    let max_width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    for row in &mut rows {
        if row.len() < max_width {
            row.extend(std::iter::repeat(' ').take(max_width - row.len()));
        }
    }

    if name.is_empty() {
        name = "Unnamed Isle".to_string();
    }

    Some(LevelDef { name, rows })
}

/// Distinguish `# Level Name` from `###...` (platform data).
/// A name line starts with `#` and contains at least one letter that is
/// not a tile character.
fn is_name_line(line: &str) -> bool {
    line[1..].chars().any(|c| c.is_alphabetic() && c != 'H' && c != 'E' && c != 'P')
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

fn embedded_levels() -> Vec<LevelDef> {
    vec![
        make_embedded("Isle 1: Shoreline", &[
            "                                          ",
            "                                          ",
            "      $                $                  ",
            "    #####            #####                ",
            "                                $         ",
            "             H               ######       ",
            "             H                            ",
            "      #######H#######                     ",
            "             H              $        E    ",
            "   P         H             ###    #####   ",
            "  #####      H                            ",
            "      #      H    ~~~~~~         E        ",
            "      #      H   #~~~~~~#    ##########   ",
            "##########################################",
        ]),
        make_embedded("Isle 2: The Cisterns", &[
            "                                          ",
            "        $                      $          ",
            "      #####        H         #####        ",
            "                   H                      ",
            "   $               H                      ",
            " #####     ########H########              ",
            "                   H       #       E      ",
            "         E         H       #    ######    ",
            "      #######      H       #              ",
            "                   H       #   $    $     ",
            "   P               H       #  ###  ###    ",
            " ######   ~~~~~~   H       #              ",
            "      #  #~~~~~~#  H       #     E        ",
            "##########################################",
        ]),
        make_embedded("Isle 3: Spider Roost", &[
            "                                          ",
            "   $         E            E         $     ",
            " #####    ########    ########    #####   ",
            "                                          ",
            "          H                  H            ",
            "   #######H#######    #######H#######     ",
            "          H                  H            ",
            "     E    H         $        H    E       ",
            "   ####   H        ###       H   ####     ",
            "          H                  H            ",
            "   P      H    ~~~~~~~~      H            ",
            " #####    H   #~~~~~~~~#     H     E      ",
            "      #   H   #~~~~~~~~#     H  #######   ",
            "##########################################",
        ]),
    ]
}

fn make_embedded(name: &str, map: &[&str]) -> LevelDef {
    LevelDef {
        name: name.to_string(),
        rows: map.iter().map(|s| s.to_string()).collect(),
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

/// Test fixture: build a LevelData straight from rows.
#[cfg(test)]
pub(crate) fn data_from(rows: &[&str]) -> LevelData {
    build(&make_embedded("fixture", rows)).expect("fixture level must build")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_runs_merge_into_single_rects() {
        let data = data_from(&[
            "P         ",
            "####  ####",
        ]);
        assert_eq!(data.platforms.len(), 2);
        assert_eq!(data.platforms[0], Rect::new(0.0, TILE, 4.0 * TILE, TILE));
        assert_eq!(data.platforms[1], Rect::new(6.0 * TILE, TILE, 4.0 * TILE, TILE));
    }

    #[test]
    fn all_five_layers_are_extracted() {
        let data = data_from(&[
            "P  $  E   ",
            "###H~~####",
        ]);
        assert_eq!(data.platforms.len(), 2);
        assert_eq!(data.ladders.len(), 1);
        assert_eq!(data.water.len(), 1);
        assert_eq!(data.coins.len(), 1);
        assert_eq!(data.spiders.len(), 1);
        assert_eq!(data.player_spawn, Vec2::new(0.5 * TILE, 0.5 * TILE));
        assert_eq!(data.bounds, Rect::new(0.0, 0.0, 10.0 * TILE, 2.0 * TILE));
    }

    #[test]
    fn missing_spawn_is_malformed() {
        let err = build(&make_embedded("bad", &["####"])).unwrap_err();
        assert!(err.contains("spawn"));
    }

    #[test]
    fn duplicate_spawn_is_malformed() {
        let err = build(&make_embedded("bad", &["P P", "###"])).unwrap_err();
        assert!(err.contains("more than one"));
    }

    #[test]
    fn index_past_available_is_exhausted() {
        let nowhere = Path::new("no-such-levels-dir");
        let count = available(nowhere);
        match load(count + 1, nowhere) {
            Err(LoadError::Exhausted { requested, available }) => {
                assert_eq!(requested, count + 1);
                assert_eq!(available, count);
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[test]
    fn embedded_levels_all_build_and_are_clearable() {
        let nowhere = Path::new("no-such-levels-dir");
        let count = available(nowhere);
        assert!(count >= 3);
        for i in 1..=count {
            let data = load(i, nowhere).expect("embedded level must build");
            // Win requires emptying both sets, so both must start non-empty.
            assert!(!data.coins.is_empty(), "level {i} has no coins");
            assert!(!data.spiders.is_empty(), "level {i} has no spiders");
            assert!(!data.platforms.is_empty());
        }
    }

    #[test]
    fn name_lines_are_distinguished_from_platform_rows() {
        assert!(is_name_line("# The Drowned Vault"));
        assert!(!is_name_line("########"));
        assert!(!is_name_line("#  H H  #"));
        assert!(!is_name_line("# E    P #"));
    }

    #[test]
    fn level_file_parses_name_and_pads_rows() {
        let def = parse_level_file("# Test Isle\nP   $\n###\n\n").unwrap();
        assert_eq!(def.name, "Test Isle");
        assert_eq!(def.rows.len(), 2);
        assert_eq!(def.rows[1].len(), 5);
    }

    #[test]
    fn loading_index_zero_is_malformed() {
        assert!(matches!(
            load(0, Path::new("no-such-levels-dir")),
            Err(LoadError::Malformed { .. })
        ));
    }
}
