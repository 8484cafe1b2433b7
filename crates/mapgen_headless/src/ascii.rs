//! ASCII projection of terrain.
//!
//! One character per cell, one line per row. Spawns can be overlaid as
//! player numbers.

use std::fmt::Write as _;

use mapgen_core::map::Map;
use mapgen_core::spawn::SpawnPoint;
use mapgen_core::terrain::{TerrainGrid, TerrainType};

/// ASCII rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsciiConfig {
    /// Append a legend with per-type counts.
    pub show_legend: bool,
    /// Use colored output (ANSI).
    pub use_color: bool,
    /// Overlay spawn points as player numbers.
    pub show_spawns: bool,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            show_legend: true,
            use_color: true,
            show_spawns: true,
        }
    }
}

impl AsciiConfig {
    /// Bare character matrix: no legend, no color, no spawns.
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            show_legend: false,
            use_color: false,
            show_spawns: false,
        }
    }
}

/// ANSI color codes.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";

    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const RED: &str = "\x1b[31m";
    pub const WHITE: &str = "\x1b[37m";
    pub const GRAY: &str = "\x1b[90m";
    pub const BROWN: &str = "\x1b[38;5;94m";
    pub const GREEN: &str = "\x1b[32m";
}

fn terrain_color(terrain: TerrainType) -> &'static str {
    match terrain {
        TerrainType::Dirt => colors::BROWN,
        TerrainType::Rock => colors::GRAY,
        TerrainType::Bedrock => colors::WHITE,
        TerrainType::Empty => colors::RESET,
        TerrainType::GoldCluster => colors::YELLOW,
        TerrainType::CrystalCluster => colors::CYAN,
        TerrainType::IronCluster => colors::RED,
    }
}

fn terrain_name(terrain: TerrainType) -> &'static str {
    match terrain {
        TerrainType::Dirt => "Dirt",
        TerrainType::Rock => "Rock",
        TerrainType::Bedrock => "Bedrock",
        TerrainType::Empty => "Empty",
        TerrainType::GoldCluster => "Gold",
        TerrainType::CrystalCluster => "Crystal",
        TerrainType::IronCluster => "Iron",
    }
}

fn spawn_char(index: usize) -> char {
    char::from_digit((index + 1) as u32 % 36, 36).unwrap_or('@')
}

/// Render a terrain grid, optionally with spawns.
pub fn render_ascii(grid: &TerrainGrid, spawns: &[SpawnPoint], config: &AsciiConfig) -> String {
    let mut output = String::with_capacity(grid.len() + grid.height() as usize);

    for (y, row) in grid.row_slices().enumerate() {
        for (x, &cell) in row.iter().enumerate() {
            let spawn = config
                .show_spawns
                .then(|| {
                    spawns
                        .iter()
                        .position(|s| s.x() as usize == x && s.y() as usize == y)
                })
                .flatten();

            match (spawn, config.use_color) {
                (Some(index), true) => {
                    let _ = write!(output, "{}{}{}{}", colors::BOLD, colors::GREEN, spawn_char(index), colors::RESET);
                }
                (Some(index), false) => output.push(spawn_char(index)),
                (None, true) => {
                    let _ = write!(output, "{}{}{}", terrain_color(cell), cell.symbol(), colors::RESET);
                }
                (None, false) => output.push(cell.symbol()),
            }
        }
        output.push('\n');
    }

    if config.show_legend {
        output.push_str(&render_legend(grid));
    }
    output
}

/// Render a stored map with its spawns.
pub fn render_map(map: &Map, config: &AsciiConfig) -> String {
    render_ascii(map.terrain_data(), map.spawn_points(), config)
}

/// Legend line per terrain type: symbol, name and cell count.
pub fn render_legend(grid: &TerrainGrid) -> String {
    let mut legend = String::from("\nLegend:\n");
    for terrain in TerrainType::ALL {
        let count = grid.count_where(|t| *t == terrain);
        let _ = writeln!(legend, "  '{}' {:<8} {count}", terrain.symbol(), terrain_name(terrain));
    }
    legend
}
