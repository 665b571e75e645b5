//! Per-cell value distributions.
//!
//! A `CellDistribution` is a total function from a cell address to a
//! `(mean, variance)` pair. Cells without an explicit entry resolve to the
//! distribution-wide defaults (mean 5, variance 2 unless configured otherwise).
//! An explicit entry always wins, including an explicit mean of 0.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::stratify::grid::{CellIndex, GridConfiguration};

/// Mean used for cells without an explicit entry.
pub const DEFAULT_CELL_MEAN: f64 = 5.0;

/// Variance used for cells without an explicit entry.
pub const DEFAULT_CELL_VARIANCE: f64 = 2.0;

/// Mean that interactive editing assigns to a newly created cell.
#[inline]
pub fn seeded_cell_mean(cell: CellIndex) -> f64 {
    ((cell.row + cell.col + 2) * 2) as f64
}

fn check_mean(cell: CellIndex, mean: f64) -> Result<()> {
    if !mean.is_finite() {
        return Err(Error::InvalidMean {
            row: cell.row,
            col: cell.col,
            mean,
        });
    }
    Ok(())
}

fn check_variance(cell: CellIndex, variance: f64) -> Result<()> {
    if !variance.is_finite() || variance <= 0.0 {
        return Err(Error::InvalidVariance {
            row: cell.row,
            col: cell.col,
            variance,
        });
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq)]
pub struct CellDistribution {
    default_mean: f64,
    default_variance: f64,
    means: BTreeMap<CellIndex, f64>,
    variances: BTreeMap<CellIndex, f64>,
}

impl Default for CellDistribution {
    fn default() -> Self {
        CellDistribution {
            default_mean: DEFAULT_CELL_MEAN,
            default_variance: DEFAULT_CELL_VARIANCE,
            means: BTreeMap::new(),
            variances: BTreeMap::new(),
        }
    }
}

impl CellDistribution {
    /// Empty distribution with the standard defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty distribution with custom defaults.
    pub fn with_defaults(default_mean: f64, default_variance: f64) -> Result<Self> {
        check_mean(CellIndex::new(0, 0), default_mean)?;
        check_variance(CellIndex::new(0, 0), default_variance)?;
        Ok(CellDistribution {
            default_mean,
            default_variance,
            ..Self::default()
        })
    }

    /// Build from dense row-major means and variances for `grid`.
    pub fn from_dense(grid: &GridConfiguration, means: &[f64], variances: &[f64]) -> Result<Self> {
        let mut dist = Self::new();
        for (i, cell) in grid.cells().enumerate() {
            if let Some(&mean) = means.get(i) {
                dist.set_mean(cell, mean)?;
            }
            if let Some(&variance) = variances.get(i) {
                dist.set_variance(cell, variance)?;
            }
        }
        Ok(dist)
    }

    pub fn default_mean(&self) -> f64 {
        self.default_mean
    }

    pub fn default_variance(&self) -> f64 {
        self.default_variance
    }

    pub fn set_mean(&mut self, cell: CellIndex, mean: f64) -> Result<()> {
        check_mean(cell, mean)?;
        self.means.insert(cell, mean);
        Ok(())
    }

    pub fn set_variance(&mut self, cell: CellIndex, variance: f64) -> Result<()> {
        check_variance(cell, variance)?;
        self.variances.insert(cell, variance);
        Ok(())
    }

    /// Mean for `cell`, falling back to the default.
    #[inline]
    pub fn mean(&self, cell: CellIndex) -> f64 {
        self.means.get(&cell).copied().unwrap_or(self.default_mean)
    }

    /// Variance for `cell`, falling back to the default.
    #[inline]
    pub fn variance(&self, cell: CellIndex) -> f64 {
        self.variances
            .get(&cell)
            .copied()
            .unwrap_or(self.default_variance)
    }

    #[inline]
    pub fn std_dev(&self, cell: CellIndex) -> f64 {
        self.variance(cell).sqrt()
    }

    pub fn has_mean(&self, cell: CellIndex) -> bool {
        self.means.contains_key(&cell)
    }

    pub fn has_variance(&self, cell: CellIndex) -> bool {
        self.variances.contains_key(&cell)
    }

    /// Give every cell of `grid` that has no explicit entry the interactive
    /// editing defaults: mean `(row + col + 2) * 2`, variance 2.
    /// Existing entries, including those outside the grid, are kept.
    pub fn fill_missing(&mut self, grid: &GridConfiguration) {
        for cell in grid.cells() {
            self.means.entry(cell).or_insert_with(|| seeded_cell_mean(cell));
            self.variances.entry(cell).or_insert(DEFAULT_CELL_VARIANCE);
        }
    }

    /// Explicit means, ordered by cell.
    pub fn means(&self) -> impl Iterator<Item = (CellIndex, f64)> + '_ {
        self.means.iter().map(|(c, m)| (*c, *m))
    }

    /// Explicit variances, ordered by cell.
    pub fn variances(&self) -> impl Iterator<Item = (CellIndex, f64)> + '_ {
        self.variances.iter().map(|(c, v)| (*c, *v))
    }
}
