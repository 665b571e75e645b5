//! True area-weighted mean of the generative model.

use crate::stratify::sampler::DistributionParams;

/// Ground truth for a frozen snapshot.
///
/// Global mode returns `global_mean`. Per-cell mode returns
/// `sum(mean(cell) * area(cell)) / sum(area(cell))` over the snapshot's own
/// grid, never the live one.
pub fn ground_truth(params: &DistributionParams) -> f64 {
    if !params.per_cell {
        return params.global_mean;
    }

    let ys = params.grid.row_breakpoints();
    let xs = params.grid.col_breakpoints();
    let mut total = 0.0;
    let mut area_sum = 0.0;
    for cell in params.grid.cells() {
        let area = ys.width(cell.row) * xs.width(cell.col);
        total += params.cells.mean(cell) * area;
        area_sum += area;
    }
    total / area_sum
}
