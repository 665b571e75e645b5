//! Estimators over a fixed sample set.
//!
//! Cell membership here is always decided by the grid passed in (the live
//! grid in a session), while the ground truth comes frozen from generation
//! time. The two may disagree after the grid was edited; that is intended.

use crate::stratify::grid::{CellIndex, GridConfiguration};
use crate::stratify::sampler::Observation;

/// Count, mean and population variance of all sample values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverallStats {
    pub count: usize,
    pub mean: f64,
    pub variance: f64,
}

/// Count, mean and population variance of one occupied cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellStats {
    pub count: usize,
    pub mean: f64,
    pub variance: f64,
}

/// Squared errors of each estimator against ground truth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EstimatorErrors {
    pub overall_mse: f64,
    pub mean_of_cell_means_mse: Option<f64>,
    pub post_stratified_mse: Option<f64>,
    /// `overall_mse / post_stratified_mse`, absent when the latter is 0 or missing.
    pub improvement: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Statistics {
    pub rows: usize,
    pub cols: usize,
    pub overall: Option<OverallStats>,
    pub mean_of_cell_means: Option<f64>,
    pub post_stratified_mean: Option<f64>,
    /// Row-major; `None` for cells without samples.
    pub cells: Vec<Option<CellStats>>,
    pub ground_truth: Option<f64>,
    pub errors: Option<EstimatorErrors>,
}

impl Statistics {
    pub fn cell(&self, cell: CellIndex) -> Option<&CellStats> {
        if cell.row >= self.rows || cell.col >= self.cols {
            return None;
        }
        self.cells[cell.row * self.cols + cell.col].as_ref()
    }
}

/// Population mean and variance (divides by n). `None` for an empty slice.
pub fn mean_and_variance(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance))
}

/// Post-stratified estimate from `(area, count, sum)` per cell.
///
/// Each occupied cell contributes its sample mean weighted by its area.
/// Empty cells contribute nothing.
pub(crate) fn post_stratified_sum<I>(cells: I) -> f64
where
    I: IntoIterator<Item = (f64, usize, f64)>,
{
    cells
        .into_iter()
        .filter(|&(_, n, _)| n > 0)
        .map(|(area, n, sum)| (area / n as f64) * sum)
        .sum()
}

/// Sample values bucketed by cell, row-major.
pub fn bucket_values(samples: &[Observation], grid: &GridConfiguration) -> Vec<Vec<f64>> {
    let ys = grid.row_breakpoints();
    let xs = grid.col_breakpoints();
    let mut buckets = vec![Vec::new(); grid.cell_count()];
    for s in samples {
        let cell = CellIndex::new(ys.locate(s.y), xs.locate(s.x));
        buckets[grid.index_of(cell)].push(s.value);
    }
    buckets
}

pub fn overall(samples: &[Observation]) -> Option<OverallStats> {
    let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
    mean_and_variance(&values).map(|(mean, variance)| OverallStats {
        count: values.len(),
        mean,
        variance,
    })
}

/// Unweighted mean of occupied cells' means.
pub fn mean_of_cell_means(samples: &[Observation], grid: &GridConfiguration) -> Option<f64> {
    let means: Vec<f64> = bucket_values(samples, grid)
        .iter()
        .filter_map(|values| mean_and_variance(values).map(|(m, _)| m))
        .collect();
    mean_and_variance(&means).map(|(m, _)| m)
}

/// Area-weighted post-stratification mean over `grid`'s cells.
pub fn post_stratified_mean(samples: &[Observation], grid: &GridConfiguration) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let buckets = bucket_values(samples, grid);
    let areas = grid.cell_areas();
    Some(post_stratified_sum(
        areas
            .iter()
            .zip(&buckets)
            .map(|(&area, values)| (area, values.len(), values.iter().sum())),
    ))
}

/// Compute every estimator and its error for one sample set.
pub fn aggregate(
    samples: &[Observation],
    ground_truth: Option<f64>,
    grid: &GridConfiguration,
) -> Statistics {
    let buckets = bucket_values(samples, grid);
    let areas = grid.cell_areas();

    let cells: Vec<Option<CellStats>> = buckets
        .iter()
        .map(|values| {
            mean_and_variance(values).map(|(mean, variance)| CellStats {
                count: values.len(),
                mean,
                variance,
            })
        })
        .collect();

    let overall = overall(samples);

    let occupied_means: Vec<f64> = cells.iter().flatten().map(|c| c.mean).collect();
    let mean_of_cell_means = mean_and_variance(&occupied_means).map(|(m, _)| m);

    let post_stratified_mean = overall.map(|_| {
        post_stratified_sum(
            areas
                .iter()
                .zip(&cells)
                .map(|(&area, c)| match c {
                    Some(c) => (area, c.count, c.mean * c.count as f64),
                    None => (area, 0, 0.0),
                }),
        )
    });

    let errors = match (overall, ground_truth) {
        (Some(o), Some(truth)) => {
            let overall_mse = (o.mean - truth).powi(2);
            let post_stratified_mse = post_stratified_mean.map(|m| (m - truth).powi(2));
            Some(EstimatorErrors {
                overall_mse,
                mean_of_cell_means_mse: mean_of_cell_means.map(|m| (m - truth).powi(2)),
                post_stratified_mse,
                improvement: post_stratified_mse
                    .filter(|mse| *mse != 0.0)
                    .map(|mse| overall_mse / mse),
            })
        }
        _ => None,
    };

    Statistics {
        rows: grid.rows(),
        cols: grid.cols(),
        overall,
        mean_of_cell_means,
        post_stratified_mean,
        cells,
        ground_truth,
        errors,
    }
}
