//! Estimator export. Recomputed from the live grid on every call.

use crate::ffi::{or_nan, PS_NULL_POINTER, PS_OK};
use crate::state::State;

/// Session-wide estimators. Absent values are NaN.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct PsStatistics {
    pub sample_count: u64,
    pub overall_mean: f64,
    pub overall_variance: f64,
    pub mean_of_cell_means: f64,
    pub post_stratified_mean: f64,
    pub ground_truth: f64,
    pub overall_mse: f64,
    pub mean_of_cell_means_mse: f64,
    pub post_stratified_mse: f64,
    pub improvement: f64,
}

/// One live-grid cell. `mean` and `variance` are NaN when `count` is 0.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct PsCellStats {
    pub count: u64,
    pub mean: f64,
    pub variance: f64,
}

/// Fills `out` with the current estimators.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
/// - `out` must be a valid pointer, or null
///
/// # Returns
/// 0 on success, 1 on null pointer. An empty session reports a zero count
/// and NaN everywhere else.
#[no_mangle]
pub unsafe extern "C" fn ps_get_statistics(ptr: *const State, out: *mut PsStatistics) -> i32 {
    if ptr.is_null() || out.is_null() {
        return PS_NULL_POINTER;
    }

    let stats = (*ptr).statistics();
    let errors = stats.errors;
    *out = PsStatistics {
        sample_count: stats.overall.map_or(0, |o| o.count as u64),
        overall_mean: or_nan(stats.overall.map(|o| o.mean)),
        overall_variance: or_nan(stats.overall.map(|o| o.variance)),
        mean_of_cell_means: or_nan(stats.mean_of_cell_means),
        post_stratified_mean: or_nan(stats.post_stratified_mean),
        ground_truth: or_nan(stats.ground_truth),
        overall_mse: or_nan(errors.map(|e| e.overall_mse)),
        mean_of_cell_means_mse: or_nan(errors.and_then(|e| e.mean_of_cell_means_mse)),
        post_stratified_mse: or_nan(errors.and_then(|e| e.post_stratified_mse)),
        improvement: or_nan(errors.and_then(|e| e.improvement)),
    };
    PS_OK
}

/// Copies per-cell statistics for the live grid, row-major.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
/// - `out_buf` must point to at least `len` writable `PsCellStats`
///
/// # Returns
/// Number of cells written, or 0 on error.
#[no_mangle]
pub unsafe extern "C" fn ps_copy_cell_stats(
    ptr: *const State,
    out_buf: *mut PsCellStats,
    len: usize,
) -> u64 {
    if ptr.is_null() || out_buf.is_null() {
        return 0;
    }

    let stats = (*ptr).statistics();
    let n = stats.cells.len().min(len);
    let out = std::slice::from_raw_parts_mut(out_buf, n);
    for (slot, cell) in out.iter_mut().zip(&stats.cells) {
        *slot = match cell {
            Some(c) => PsCellStats {
                count: c.count as u64,
                mean: c.mean,
                variance: c.variance,
            },
            None => PsCellStats {
                count: 0,
                mean: f64::NAN,
                variance: f64::NAN,
            },
        };
    }
    n as u64
}
