//! Persisted simulation configuration.
//!
//! The host owns where the blob lives; this module only converts between
//! JSON and validated engine inputs. Missing fields take the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::stratify::distribution::CellDistribution;
use crate::stratify::grid::{CellIndex, GridConfiguration};
use crate::stratify::sampler::GenerationParams;
pub use crate::stratify::sampler::MAX_SAMPLE_COUNT;
use crate::stratify::surface::MAX_WORKERS;

/// Default error-surface resolution.
pub const DEFAULT_RESOLUTION: usize = 1000;

/// Explicit mean/variance for one cell. Either may be omitted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellEntry {
    pub row: usize,
    pub col: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variance: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub rows: usize,
    pub cols: usize,
    pub horizontal_dividers: Vec<f64>,
    pub vertical_dividers: Vec<f64>,
    pub cells: Vec<CellEntry>,
    pub global_mean: f64,
    pub std_dev: f64,
    pub seed: Option<u64>,
    pub sample_count: usize,
    pub per_cell_distribution: bool,
    pub stratified_sampling: bool,
    pub surface_resolution: usize,
    pub max_workers: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            rows: 2,
            cols: 2,
            horizontal_dividers: vec![50.0],
            vertical_dividers: vec![50.0],
            cells: Vec::new(),
            global_mean: 5.0,
            std_dev: 2.0,
            seed: None,
            sample_count: 64,
            per_cell_distribution: true,
            stratified_sampling: false,
            surface_resolution: DEFAULT_RESOLUTION,
            max_workers: MAX_WORKERS,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut config: SimulationConfig = serde_json::from_str(json)?;
        config.sample_count = config.sample_count.clamp(1, MAX_SAMPLE_COUNT);
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    pub fn grid(&self) -> Result<GridConfiguration> {
        GridConfiguration::new(
            self.rows,
            self.cols,
            self.horizontal_dividers.clone(),
            self.vertical_dividers.clone(),
        )
    }

    pub fn cell_distribution(&self) -> Result<CellDistribution> {
        let mut dist = CellDistribution::new();
        for entry in &self.cells {
            let cell = CellIndex::new(entry.row, entry.col);
            if let Some(mean) = entry.mean {
                dist.set_mean(cell, mean)?;
            }
            if let Some(variance) = entry.variance {
                dist.set_variance(cell, variance)?;
            }
        }
        Ok(dist)
    }

    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            sample_count: self.sample_count,
            per_cell: self.per_cell_distribution,
            stratified: self.stratified_sampling,
            global_mean: self.global_mean,
            std_dev: self.std_dev,
            seed: self.seed,
        }
    }

    /// Validate and split into engine inputs.
    pub fn to_parts(&self) -> Result<(GridConfiguration, CellDistribution, GenerationParams)> {
        let grid = self.grid()?;
        let cells = self.cell_distribution()?;
        let params = self.generation_params();
        params.validate()?;
        Ok((grid, cells, params))
    }

    /// Capture live session inputs for storage.
    pub fn capture(
        grid: &GridConfiguration,
        cells: &CellDistribution,
        params: &GenerationParams,
        surface_resolution: usize,
        max_workers: usize,
    ) -> Self {
        let mut entries: Vec<CellEntry> = cells
            .means()
            .map(|(cell, mean)| CellEntry {
                row: cell.row,
                col: cell.col,
                mean: Some(mean),
                variance: None,
            })
            .collect();
        for (cell, variance) in cells.variances() {
            match entries
                .iter_mut()
                .find(|e| e.row == cell.row && e.col == cell.col)
            {
                Some(entry) => entry.variance = Some(variance),
                None => entries.push(CellEntry {
                    row: cell.row,
                    col: cell.col,
                    mean: None,
                    variance: Some(variance),
                }),
            }
        }
        entries.sort_by_key(|e| (e.row, e.col));

        SimulationConfig {
            rows: grid.rows(),
            cols: grid.cols(),
            horizontal_dividers: grid.horizontal_dividers().to_vec(),
            vertical_dividers: grid.vertical_dividers().to_vec(),
            cells: entries,
            global_mean: params.global_mean,
            std_dev: params.std_dev,
            seed: params.seed,
            sample_count: params.sample_count,
            per_cell_distribution: params.per_cell,
            stratified_sampling: params.stratified,
            surface_resolution,
            max_workers,
        }
    }
}
