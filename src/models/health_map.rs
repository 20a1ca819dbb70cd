use serde::{Deserialize, Serialize};

/// Grid resolution of the synthesized health map (cells per side).
pub const MAP_SIZE: usize = 100;

/// Cells above this are considered healthy.
pub const HEALTHY_THRESHOLD: f64 = 0.7;
/// Cells below this are considered critical.
pub const CRITICAL_THRESHOLD: f64 = 0.3;
/// Soil moisture (percent) above which low-health cells are attributed to
/// waterlogging rather than generic stress.
pub const WATERLOGGING_MOISTURE_PERCENT: f64 = 80.0;

/// Categorical view of a map cell.
///
/// `Waterlogged` requires an independent high-moisture signal from the
/// sensor reading; without one, low-health cells bucket as `Stressed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellCategory {
    Healthy,
    Stressed,
    Waterlogged,
}

/// A fixed-size 2D grid of crop health values.
///
/// Invariant: every cell is finite and within [0, 1]. All constructors and
/// mutators clamp, so no NaN/Inf can escape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMap {
    width: usize,
    height: usize,
    cells: Vec<f64>,
}

impl HealthMap {
    pub fn uniform(value: f64) -> Self {
        Self::uniform_sized(MAP_SIZE, MAP_SIZE, value)
    }

    pub fn uniform_sized(width: usize, height: usize, value: f64) -> Self {
        let clamped = sanitize_cell(value);
        Self {
            width,
            height,
            cells: vec![clamped; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.cells[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        self.cells[y * self.width + x] = sanitize_cell(value);
    }

    pub fn mean(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.cells.iter().sum::<f64>() / self.cells.len() as f64
    }

    pub fn std_dev(&self) -> f64 {
        if self.cells.len() < 2 {
            return 0.0;
        }
        let mean = self.mean();
        let variance = self
            .cells
            .iter()
            .map(|c| (c - mean) * (c - mean))
            .sum::<f64>()
            / self.cells.len() as f64;
        variance.sqrt()
    }

    pub fn min(&self) -> f64 {
        self.cells.iter().copied().fold(1.0, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.cells.iter().copied().fold(0.0, f64::max)
    }

    pub fn categorize_cell(value: f64, high_moisture: bool) -> CellCategory {
        if value > HEALTHY_THRESHOLD {
            CellCategory::Healthy
        } else if value < CRITICAL_THRESHOLD && high_moisture {
            CellCategory::Waterlogged
        } else {
            CellCategory::Stressed
        }
    }

    /// Summarize the grid. `high_moisture` is the independent waterlogging
    /// signal (soil moisture above [`WATERLOGGING_MOISTURE_PERCENT`]); the
    /// caller states it explicitly so the bucketing rule in use is visible.
    pub fn summarize(&self, high_moisture: bool) -> MapSummary {
        let mut healthy = 0usize;
        let mut stressed = 0usize;
        let mut waterlogged = 0usize;
        let mut critical = 0usize;

        for &cell in &self.cells {
            if cell < CRITICAL_THRESHOLD {
                critical += 1;
            }
            match Self::categorize_cell(cell, high_moisture) {
                CellCategory::Healthy => healthy += 1,
                CellCategory::Stressed => stressed += 1,
                CellCategory::Waterlogged => waterlogged += 1,
            }
        }

        let total = self.cells.len().max(1) as f64;
        MapSummary {
            mean_health: self.mean(),
            health_std_dev: self.std_dev(),
            min_health: self.min(),
            max_health: self.max(),
            healthy_percent: healthy as f64 / total * 100.0,
            critical_percent: critical as f64 / total * 100.0,
            stressed_percent: stressed as f64 / total * 100.0,
            waterlogged_percent: waterlogged as f64 / total * 100.0,
        }
    }

    pub fn all_finite(&self) -> bool {
        self.cells.iter().all(|c| c.is_finite())
    }
}

fn sanitize_cell(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.5
    }
}

/// Aggregate statistics over one health map, percentages in [0, 100].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MapSummary {
    pub mean_health: f64,
    pub health_std_dev: f64,
    pub min_health: f64,
    pub max_health: f64,
    pub healthy_percent: f64,
    pub critical_percent: f64,
    pub stressed_percent: f64,
    pub waterlogged_percent: f64,
}
