//! Sample generation over a grid.
//!
//! Two placement policies:
//! - Unstratified: `x`, `y` uniform over the unit square.
//! - Stratified (proportional allocation): `count / cells` samples per cell,
//!   plus one extra for the first `count % cells` cells in row-major order,
//!   each drawn uniformly inside its cell.
//!
//! Two value models:
//! - Global: every value ~ N(global_mean, std_dev).
//! - Per-cell: value ~ N(mean(cell), sqrt(variance(cell))) for the cell the point lies in.
//!
//! Draw order per sample is `x`, `y`, then the two Box-Muller uniforms, so a
//! seeded run is bit-reproducible.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::stratify::distribution::CellDistribution;
use crate::stratify::grid::{CellIndex, GridConfiguration};
use crate::stratify::rng::SeededRng;
use crate::stratify::truth::ground_truth;

/// Largest sample count a single generation accepts.
pub const MAX_SAMPLE_COUNT: usize = 10_000;

/// One observation of the field. `x`, `y` are normalized coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

/// Controls for one generation cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub sample_count: usize,
    pub per_cell: bool,
    pub stratified: bool,
    pub global_mean: f64,
    pub std_dev: f64,
    pub seed: Option<u64>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        GenerationParams {
            sample_count: 64,
            per_cell: true,
            stratified: false,
            global_mean: 5.0,
            std_dev: 2.0,
            seed: None,
        }
    }
}

impl GenerationParams {
    pub fn validate(&self) -> Result<()> {
        if self.sample_count == 0 || self.sample_count > MAX_SAMPLE_COUNT {
            return Err(Error::InvalidSampleCount(self.sample_count));
        }
        if !self.std_dev.is_finite() || self.std_dev <= 0.0 {
            return Err(Error::InvalidStdDev(self.std_dev));
        }
        if !self.global_mean.is_finite() {
            return Err(Error::InvalidMean {
                row: 0,
                col: 0,
                mean: self.global_mean,
            });
        }
        Ok(())
    }
}

/// Snapshot of the generative model taken when samples were drawn.
///
/// Later edits to the live grid or per-cell table never reach this copy.
#[derive(Clone, Debug, PartialEq)]
pub struct DistributionParams {
    pub per_cell: bool,
    pub stratified: bool,
    pub global_mean: f64,
    pub std_dev: f64,
    pub cells: CellDistribution,
    pub grid: GridConfiguration,
}

/// Min/max of the generated values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn of(samples: &[Observation]) -> Option<Self> {
        let first = samples.first()?;
        let init = ValueRange {
            min: first.value,
            max: first.value,
        };
        Some(samples.iter().fold(init, |r, s| ValueRange {
            min: r.min.min(s.value),
            max: r.max.max(s.value),
        }))
    }
}

/// Output of one generation cycle. Replaced wholesale by the next one.
#[derive(Clone, Debug)]
pub struct Generation {
    pub samples: Vec<Observation>,
    pub params: DistributionParams,
    pub ground_truth: f64,
    pub value_range: Option<ValueRange>,
}

/// Generate samples with a generator built from `params.seed`.
pub fn generate(
    params: &GenerationParams,
    grid: &GridConfiguration,
    cells: &CellDistribution,
) -> Result<Generation> {
    let mut rng = SeededRng::from_seed(params.seed)?;
    generate_with(&mut rng, params, grid, cells)
}

/// Generate samples drawing from a caller-owned generator. `params.seed` is ignored.
pub fn generate_with(
    rng: &mut SeededRng,
    params: &GenerationParams,
    grid: &GridConfiguration,
    cells: &CellDistribution,
) -> Result<Generation> {
    params.validate()?;

    let samples = if params.stratified {
        generate_stratified(rng, params, grid, cells)
    } else {
        generate_uniform(rng, params, grid, cells)
    };

    let frozen = DistributionParams {
        per_cell: params.per_cell,
        stratified: params.stratified,
        global_mean: params.global_mean,
        std_dev: params.std_dev,
        cells: cells.clone(),
        grid: grid.clone(),
    };
    let truth = ground_truth(&frozen);
    let value_range = ValueRange::of(&samples);

    info!(
        samples = samples.len(),
        stratified = params.stratified,
        per_cell = params.per_cell,
        seeded = rng.is_seeded(),
        ground_truth = truth,
        "samples generated"
    );

    Ok(Generation {
        samples,
        params: frozen,
        ground_truth: truth,
        value_range,
    })
}

#[inline]
fn sample_value(
    rng: &mut SeededRng,
    params: &GenerationParams,
    cells: &CellDistribution,
    cell: CellIndex,
) -> f64 {
    if params.per_cell {
        rng.normal(cells.mean(cell), cells.std_dev(cell))
    } else {
        rng.normal(params.global_mean, params.std_dev)
    }
}

fn generate_uniform(
    rng: &mut SeededRng,
    params: &GenerationParams,
    grid: &GridConfiguration,
    cells: &CellDistribution,
) -> Vec<Observation> {
    let locator = grid.locator();
    let mut samples = Vec::with_capacity(params.sample_count);
    for _ in 0..params.sample_count {
        let x = rng.next_f64();
        let y = rng.next_f64();
        let cell = locator.cell_for(x, y);
        let value = sample_value(rng, params, cells, cell);
        samples.push(Observation { x, y, value });
    }
    samples
}

fn generate_stratified(
    rng: &mut SeededRng,
    params: &GenerationParams,
    grid: &GridConfiguration,
    cells: &CellDistribution,
) -> Vec<Observation> {
    let total_cells = grid.cell_count();
    let per_cell = params.sample_count / total_cells;
    let remainder = params.sample_count % total_cells;

    let mut samples = Vec::with_capacity(params.sample_count);
    for (idx, cell) in grid.cells().enumerate() {
        let n = per_cell + usize::from(idx < remainder);
        let rect = grid.cell_bounds(cell);
        for _ in 0..n {
            let x = rect.x0 + rng.next_f64() * rect.width();
            let y = rect.y0 + rng.next_f64() * rect.height();
            let value = sample_value(rng, params, cells, cell);
            samples.push(Observation { x, y, value });
        }
    }
    samples
}
