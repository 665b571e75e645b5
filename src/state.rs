//! Session state: the live grid, the live per-cell table and the most recent
//! frozen generation.
//!
//! Statistics are recomputed from the live grid on every call, while the
//! ground truth and the error surface always use the snapshot taken when the
//! samples were drawn.

use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::error::{Axis, Error, Result};
use crate::stratify::distribution::CellDistribution;
use crate::stratify::grid::{CellIndex, GridConfiguration};
use crate::stratify::sampler::{self, Generation, GenerationParams, Observation, ValueRange};
use crate::stratify::stats::{self, Statistics};
use crate::stratify::surface::{ErrorSurface, SurfaceEngine};

/// One interactive simulation session.
pub struct State {
    pub grid: GridConfiguration,
    pub cells: CellDistribution,
    pub params: GenerationParams,
    pub surface_resolution: usize,
    pub generation: u64,
    current: Option<Generation>,
    engine: SurfaceEngine,
    max_workers: usize,
}

impl State {
    /// Session with the default configuration.
    pub fn new() -> Result<Self> {
        Self::from_config(&SimulationConfig::default())
    }

    /// Session from a stored configuration. Cells without an explicit entry
    /// get the editing defaults.
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        let (grid, mut cells, params) = config.to_parts()?;
        cells.fill_missing(&grid);
        let engine = SurfaceEngine::new(config.max_workers)?;
        debug!(
            rows = grid.rows(),
            cols = grid.cols(),
            threads = engine.threads(),
            "session created"
        );
        Ok(State {
            grid,
            cells,
            params,
            surface_resolution: config.surface_resolution.max(1),
            generation: 0,
            current: None,
            engine,
            max_workers: config.max_workers,
        })
    }

    /// Current inputs as a storable configuration.
    pub fn to_config(&self) -> SimulationConfig {
        SimulationConfig::capture(
            &self.grid,
            &self.cells,
            &self.params,
            self.surface_resolution,
            self.max_workers,
        )
    }

    /// Replace the live inputs with `config`. The current samples are kept.
    pub fn apply_config(&mut self, config: &SimulationConfig) -> Result<()> {
        let (grid, mut cells, params) = config.to_parts()?;
        cells.fill_missing(&grid);
        if config.max_workers != self.max_workers {
            self.engine = SurfaceEngine::new(config.max_workers)?;
            self.max_workers = config.max_workers;
        }
        self.grid = grid;
        self.cells = cells;
        self.params = params;
        self.surface_resolution = config.surface_resolution.max(1);
        Ok(())
    }

    /// Resize the live grid. Dividers are reset to even spacing and new
    /// cells get the editing defaults.
    pub fn set_dimensions(&mut self, rows: usize, cols: usize) -> Result<()> {
        self.grid.set_dimensions(rows, cols)?;
        self.cells.fill_missing(&self.grid);
        debug!(rows, cols, "grid resized");
        Ok(())
    }

    /// Drag a divider. Returns the position actually applied.
    pub fn move_divider(&mut self, axis: Axis, index: usize, position: f64) -> Result<f64> {
        let applied = self.grid.move_divider(axis, index, position)?;
        debug!(%axis, index, requested = position, applied, "divider moved");
        Ok(applied)
    }

    /// Set the mean and variance of one cell of the live grid.
    pub fn set_cell_distribution(
        &mut self,
        cell: CellIndex,
        mean: f64,
        variance: f64,
    ) -> Result<()> {
        if !self.grid.contains(cell) {
            return Err(Error::CellOutOfRange {
                row: cell.row,
                col: cell.col,
                rows: self.grid.rows(),
                cols: self.grid.cols(),
            });
        }
        // validate both before touching either
        let mut next = self.cells.clone();
        next.set_mean(cell, mean)?;
        next.set_variance(cell, variance)?;
        self.cells = next;
        Ok(())
    }

    pub fn set_params(&mut self, params: GenerationParams) -> Result<()> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    /// Draw a fresh sample set, replacing the previous one wholesale.
    pub fn generate(&mut self) -> Result<&Generation> {
        let generation = sampler::generate(&self.params, &self.grid, &self.cells)?;
        self.generation += 1;
        Ok(self.current.insert(generation))
    }

    /// Drop the current samples.
    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&Generation> {
        self.current.as_ref()
    }

    pub fn samples(&self) -> &[Observation] {
        match &self.current {
            Some(g) => &g.samples,
            None => &[],
        }
    }

    /// Ground truth frozen with the current samples.
    pub fn ground_truth(&self) -> Option<f64> {
        self.current.as_ref().map(|g| g.ground_truth)
    }

    pub fn value_range(&self) -> Option<ValueRange> {
        self.current.as_ref().and_then(|g| g.value_range)
    }

    /// Estimators over the current samples, bucketed by the live grid.
    pub fn statistics(&self) -> Statistics {
        stats::aggregate(self.samples(), self.ground_truth(), &self.grid)
    }

    /// Squared error of the plain sample mean against the frozen ground truth.
    pub fn baseline_mse(&self) -> Option<f64> {
        let overall = stats::overall(self.samples())?;
        let truth = self.ground_truth()?;
        Some((overall.mean - truth).powi(2))
    }

    pub fn engine(&self) -> &SurfaceEngine {
        &self.engine
    }

    /// Error surface at the session's configured resolution.
    pub fn error_surface(&self) -> Result<ErrorSurface> {
        self.error_surface_at(self.surface_resolution)
    }

    /// Error surface over the current samples at `resolution`.
    pub fn error_surface_at(&self, resolution: usize) -> Result<ErrorSurface> {
        let surface = self.engine.compute(
            self.samples(),
            self.ground_truth(),
            self.baseline_mse().unwrap_or(0.0),
            resolution,
        )?;
        if let Some(best) = surface.best_candidate() {
            info!(
                resolution,
                best_horizontal = best.horizontal_divider,
                best_vertical = best.vertical_divider,
                best_mse = best.mse,
                "best single-divider partition"
            );
        }
        Ok(surface)
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("grid", &self.grid)
            .field("params", &self.params)
            .field("generation", &self.generation)
            .field("samples", &self.samples().len())
            .field("threads", &self.engine.threads())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_RESOLUTION;

    fn seeded_state(seed: u64) -> State {
        let mut state = State::new().unwrap();
        state.params.seed = Some(seed);
        state
    }

    #[test]
    fn test_new_session_defaults() {
        let state = State::new().unwrap();
        assert_eq!(state.grid.rows(), 2);
        assert_eq!(state.grid.cols(), 2);
        assert_eq!(state.generation, 0);
        assert!(state.samples().is_empty());
        assert_eq!(state.ground_truth(), None);
        assert_eq!(state.surface_resolution, DEFAULT_RESOLUTION);
        // editing defaults, (row + col + 2) * 2
        assert_eq!(state.cells.mean(CellIndex::new(0, 0)), 4.0);
        assert_eq!(state.cells.mean(CellIndex::new(1, 1)), 8.0);
    }

    #[test]
    fn test_generate_replaces_samples() {
        let mut state = seeded_state(7);
        state.params.sample_count = 30;
        let first: Vec<Observation> = state.generate().unwrap().samples.clone();
        assert_eq!(state.generation, 1);

        state.params.sample_count = 12;
        state.params.seed = Some(8);
        state.generate().unwrap();
        assert_eq!(state.generation, 2);
        assert_eq!(state.samples().len(), 12);
        assert_ne!(state.samples()[0], first[0]);
    }

    #[test]
    fn test_failed_generate_keeps_previous() {
        let mut state = seeded_state(7);
        state.generate().unwrap();
        let before = state.samples().to_vec();

        state.params.std_dev = -1.0;
        assert!(state.generate().is_err());
        assert_eq!(state.generation, 1);
        assert_eq!(state.samples(), before.as_slice());
    }

    #[test]
    fn test_clear() {
        let mut state = seeded_state(3);
        state.generate().unwrap();
        state.clear();
        assert!(state.samples().is_empty());
        assert_eq!(state.statistics().overall, None);
        assert_eq!(state.baseline_mse(), None);
        assert!(matches!(state.error_surface_at(10), Err(Error::EmptySamples)));
    }

    #[test]
    fn test_statistics_use_live_grid_and_frozen_truth() {
        let mut state = seeded_state(11);
        state.params.sample_count = 200;
        state.generate().unwrap();
        let truth = state.ground_truth().unwrap();

        state.set_dimensions(4, 3).unwrap();
        state
            .set_cell_distribution(CellIndex::new(0, 0), 100.0, 1.0)
            .unwrap();

        let stats = state.statistics();
        assert_eq!(stats.rows, 4);
        assert_eq!(stats.cols, 3);
        assert_eq!(stats.cells.len(), 12);
        assert_eq!(stats.ground_truth, Some(truth));
        assert_eq!(state.ground_truth(), Some(truth));
    }

    #[test]
    fn test_set_dimensions_seeds_new_cells() {
        let mut state = State::new().unwrap();
        state
            .set_cell_distribution(CellIndex::new(0, 0), -2.0, 0.5)
            .unwrap();
        state.set_dimensions(3, 3).unwrap();
        assert_eq!(state.grid.horizontal_dividers().len(), 2);
        assert_eq!(state.cells.mean(CellIndex::new(0, 0)), -2.0);
        assert_eq!(state.cells.mean(CellIndex::new(2, 2)), 12.0);
        assert_eq!(state.cells.variance(CellIndex::new(2, 1)), 2.0);
        assert!(state.set_dimensions(0, 3).is_err());
    }

    #[test]
    fn test_set_cell_distribution_is_atomic() {
        let mut state = State::new().unwrap();
        let cell = CellIndex::new(1, 0);
        let before = state.cells.mean(cell);
        assert!(matches!(
            state.set_cell_distribution(cell, 9.0, 0.0),
            Err(Error::InvalidVariance { .. })
        ));
        assert_eq!(state.cells.mean(cell), before);
        assert!(matches!(
            state.set_cell_distribution(CellIndex::new(2, 0), 1.0, 1.0),
            Err(Error::CellOutOfRange { .. })
        ));
    }

    #[test]
    fn test_move_divider_clamps() {
        let mut state = State::new().unwrap();
        assert_eq!(state.move_divider(Axis::Vertical, 0, 99.0).unwrap(), 95.0);
        assert_eq!(state.grid.vertical_dividers(), &[95.0]);
        assert!(matches!(
            state.move_divider(Axis::Horizontal, 3, 50.0),
            Err(Error::DividerIndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_error_surface_matches_sequential() {
        let mut state = seeded_state(42);
        state.params.sample_count = 300;
        state.params.stratified = true;
        state.generate().unwrap();

        let surface = state.error_surface_at(20).unwrap();
        let expected = crate::stratify::surface::compute_sequential(
            state.samples(),
            state.ground_truth(),
            state.baseline_mse().unwrap(),
            20,
        )
        .unwrap();
        assert_eq!(surface, expected);
        assert_eq!(surface.baseline_mse(), state.baseline_mse().unwrap());
    }

    #[test]
    fn test_config_roundtrip_through_session() {
        let mut state = seeded_state(5);
        state.set_dimensions(3, 2).unwrap();
        state.move_divider(Axis::Horizontal, 1, 80.0).unwrap();
        state.surface_resolution = 64;

        let config = state.to_config();
        let restored = State::from_config(&config).unwrap();
        assert_eq!(restored.grid, state.grid);
        assert_eq!(restored.cells, state.cells);
        assert_eq!(restored.params, state.params);
        assert_eq!(restored.surface_resolution, 64);
    }
}
