//! C FFI layer for hosts that drive a session (renderer, UI).
//!
//! All functions are marked with `#[no_mangle]` and use `extern "C"`.
//! They are thin wrappers over `State` that handle null checks, pointer
//! safety and C-to-Rust conversions.
//!
//! Fallible calls return an `i32` status:
//! 0 ok, 1 null pointer, 2 invalid argument, 3 precondition failure
//! (no samples yet), 4 internal failure.

use tracing::warn;

use crate::error::{Axis, Result};

pub mod config;
pub mod grid;
pub mod lifecycle;
pub mod sampling;
pub mod stats;
pub mod surface;

pub use config::{ps_create_from_config, ps_load_config, ps_save_config};
pub use grid::{
    ps_cell_for, ps_copy_dividers, ps_get_cell_distribution, ps_grid_cols, ps_grid_rows,
    ps_move_divider, ps_reset_dividers, ps_set_cell_distribution, ps_set_dimensions,
};
pub use lifecycle::{ps_create, ps_destroy, ps_get_generation};
pub use sampling::{
    ps_clear, ps_copy_samples, ps_generate, ps_get_generation_params, ps_ground_truth,
    ps_sample_count, ps_set_generation_params, ps_value_range, PsGenerationParams,
};
pub use stats::{ps_copy_cell_stats, ps_get_statistics, PsCellStats, PsStatistics};
pub use surface::{ps_compute_surface, PsSurfaceSummary};

pub const PS_OK: i32 = 0;
pub const PS_NULL_POINTER: i32 = 1;
pub const PS_INVALID_ARGUMENT: i32 = 2;
pub const PS_PRECONDITION: i32 = 3;

/// Map a result onto a status code, logging failures.
pub(crate) fn status(op: &'static str, result: Result<()>) -> i32 {
    match result {
        Ok(()) => PS_OK,
        Err(e) => {
            warn!(op, error = %e, "ffi call failed");
            e.status_code()
        }
    }
}

/// 0 = horizontal (row dividers), 1 = vertical (column dividers).
pub(crate) fn axis_from_u8(axis: u8) -> Option<Axis> {
    match axis {
        0 => Some(Axis::Horizontal),
        1 => Some(Axis::Vertical),
        _ => None,
    }
}

/// Absent values cross the ABI as NaN.
#[inline]
pub(crate) fn or_nan(value: Option<f64>) -> f64 {
    value.unwrap_or(f64::NAN)
}
