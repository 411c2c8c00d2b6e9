//! Obstacle layouts per level
//!
//! Layouts are a pure function of level, screen width and top offset; the
//! same inputs always produce the same obstacles.
//!
//! - Level 1: uniform grid
//! - Level 2: pyramid, widest row on top, each row one shorter
//! - Level 3: diamond, widest at the middle row
//! - Level 4+: dense grid with a deterministic skip pattern, gaining rows
//!   every other level

use glam::Vec2;

use super::state::Obstacle;
use crate::consts::*;

/// Layout family used for a level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutPattern {
    Grid,
    Pyramid,
    Diamond,
    Dense,
}

impl LayoutPattern {
    pub fn for_level(level: u32) -> Self {
        match level {
            0 | 1 => LayoutPattern::Grid,
            2 => LayoutPattern::Pyramid,
            3 => LayoutPattern::Diamond,
            _ => LayoutPattern::Dense,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutPattern::Grid => "grid",
            LayoutPattern::Pyramid => "pyramid",
            LayoutPattern::Diamond => "diamond",
            LayoutPattern::Dense => "dense",
        }
    }
}

/// Cells removed from dense levels
#[inline]
pub fn dense_skip(row: u32, col: u32) -> bool {
    (row + col) % 3 == 0 || (row % 2 == 0 && col % 2 == 0)
}

/// Row on the layout grid: how many slots it is centered on, and which of
/// those slots hold an obstacle
struct RowPlan {
    slots: u32,
    filled: Vec<u32>,
}

/// Level layout parameters
#[derive(Debug, Clone)]
pub struct LevelGenerator {
    pub grid_rows: u32,
    pub grid_cols: u32,
    pub pyramid_rows: u32,
    /// Columns in the pyramid's top row
    pub pyramid_top_cols: u32,
    /// Diamond row count (odd keeps it symmetric)
    pub diamond_rows: u32,
    pub diamond_max_cols: u32,
    pub dense_rows: u32,
    pub dense_max_rows: u32,
    pub dense_cols: u32,
    pub obstacle_width: f32,
    pub obstacle_height: f32,
    pub spacing: f32,
}

impl Default for LevelGenerator {
    fn default() -> Self {
        Self {
            grid_rows: 5,
            grid_cols: 5,
            pyramid_rows: 5,
            pyramid_top_cols: 7,
            diamond_rows: 7,
            diamond_max_cols: 7,
            dense_rows: 6,
            dense_max_rows: 9,
            dense_cols: 8,
            obstacle_width: OBSTACLE_WIDTH,
            obstacle_height: OBSTACLE_HEIGHT,
            spacing: OBSTACLE_SPACING,
        }
    }
}

impl LevelGenerator {
    /// Build the obstacle set for `level`
    pub fn generate(&self, level: u32, screen_width: f32, top_offset: f32) -> Vec<Obstacle> {
        let pattern = LayoutPattern::for_level(level);
        let rows = self.plan(pattern, level);

        // IDs are row * stride + col; stride covers the widest row
        let stride = rows.iter().map(|r| r.slots).max().unwrap_or(1).max(1);
        let width = self.fitted_width(stride, screen_width);
        let height = self.obstacle_height;

        let mut obstacles = Vec::new();
        for (row, plan) in rows.iter().enumerate() {
            let row = row as u32;
            let row_width =
                plan.slots as f32 * width + plan.slots.saturating_sub(1) as f32 * self.spacing;
            let start_x = (screen_width - row_width) / 2.0;
            let y = top_offset + row as f32 * (height + self.spacing);

            for &col in &plan.filled {
                let x = start_x + col as f32 * (width + self.spacing);
                obstacles.push(Obstacle::new(row * stride + col, Vec2::new(x, y), width, height));
            }
        }

        log::debug!(
            "Level {}: {} layout, {} obstacles",
            level,
            pattern.as_str(),
            obstacles.len()
        );
        obstacles
    }

    /// Obstacle width that lets `cols` obstacles plus margins fit the screen
    fn fitted_width(&self, cols: u32, screen_width: f32) -> f32 {
        let gaps = (cols + 1) as f32 * self.spacing;
        let fitted = (screen_width - gaps) / cols as f32;
        fitted.min(self.obstacle_width).max(MIN_OBSTACLE_WIDTH)
    }

    fn plan(&self, pattern: LayoutPattern, level: u32) -> Vec<RowPlan> {
        match pattern {
            LayoutPattern::Grid => (0..self.grid_rows)
                .map(|_| RowPlan {
                    slots: self.grid_cols,
                    filled: (0..self.grid_cols).collect(),
                })
                .collect(),
            LayoutPattern::Pyramid => (0..self.pyramid_rows)
                .map(|row| self.pyramid_top_cols.saturating_sub(row).max(1))
                .map(|cols| RowPlan {
                    slots: cols,
                    filled: (0..cols).collect(),
                })
                .collect(),
            LayoutPattern::Diamond => {
                let mid = self.diamond_rows / 2;
                (0..self.diamond_rows)
                    .map(|row| self.diamond_max_cols.saturating_sub(row.abs_diff(mid)).max(1))
                    .map(|cols| RowPlan {
                        slots: cols,
                        filled: (0..cols).collect(),
                    })
                    .collect()
            }
            LayoutPattern::Dense => {
                let extra = level.saturating_sub(4) / 2;
                let rows = (self.dense_rows + extra).min(self.dense_max_rows.max(self.dense_rows));
                (0..rows)
                    .map(|row| RowPlan {
                        slots: self.dense_cols,
                        filled: (0..self.dense_cols)
                            .filter(|&col| !dense_skip(row, col))
                            .collect(),
                    })
                    .collect()
            }
        }
    }
}

/// Layout for `level` with the default parameters
pub fn generate(level: u32, screen_width: f32, top_offset: f32) -> Vec<Obstacle> {
    LevelGenerator::default().generate(level, screen_width, top_offset)
}
