//! Grid editing and per-cell distribution access.

use crate::error::Error;
use crate::ffi::{axis_from_u8, status, PS_INVALID_ARGUMENT, PS_NULL_POINTER, PS_OK};
use crate::state::State;
use crate::stratify::grid::CellIndex;

/// Resizes the live grid. Dividers reset to even spacing and new cells get
/// the editing defaults.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
///
/// # Returns
/// 0 on success, 1 on null pointer, 2 if either dimension is 0.
#[no_mangle]
pub unsafe extern "C" fn ps_set_dimensions(ptr: *mut State, rows: u32, cols: u32) -> i32 {
    if ptr.is_null() {
        return PS_NULL_POINTER;
    }

    let state = &mut *ptr;
    status(
        "set_dimensions",
        state.set_dimensions(rows as usize, cols as usize),
    )
}

/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
///
/// # Returns
/// Row count, or 0 if ptr is null.
#[no_mangle]
pub unsafe extern "C" fn ps_grid_rows(ptr: *const State) -> u32 {
    if ptr.is_null() {
        return 0;
    }
    (*ptr).grid.rows() as u32
}

/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
///
/// # Returns
/// Column count, or 0 if ptr is null.
#[no_mangle]
pub unsafe extern "C" fn ps_grid_cols(ptr: *const State) -> u32 {
    if ptr.is_null() {
        return 0;
    }
    (*ptr).grid.cols() as u32
}

/// Moves one divider (axis 0 = horizontal, 1 = vertical) to `position`
/// percent. The position is clamped to [5, 95] and kept at least 1 away
/// from its neighbours.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
/// - `out_applied` may be null; otherwise it receives the applied position
///
/// # Returns
/// 0 on success, 1 on null pointer, 2 on bad axis, index or position.
#[no_mangle]
pub unsafe extern "C" fn ps_move_divider(
    ptr: *mut State,
    axis: u8,
    index: u32,
    position: f64,
    out_applied: *mut f64,
) -> i32 {
    if ptr.is_null() {
        return PS_NULL_POINTER;
    }
    let Some(axis) = axis_from_u8(axis) else {
        return PS_INVALID_ARGUMENT;
    };

    let state = &mut *ptr;
    match state.move_divider(axis, index as usize, position) {
        Ok(applied) => {
            if !out_applied.is_null() {
                *out_applied = applied;
            }
            PS_OK
        }
        Err(e) => status("move_divider", Err(e)),
    }
}

/// Resets dividers to even spacing, keeping the dimensions.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
#[no_mangle]
pub unsafe extern "C" fn ps_reset_dividers(ptr: *mut State) {
    if ptr.is_null() {
        return;
    }
    (*ptr).grid.reset_dividers();
}

/// Copies the dividers of one axis into `out_buf`.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
/// - `out_buf` must point to at least `len` writable doubles
///
/// # Returns
/// Number of dividers written, or 0 on error.
#[no_mangle]
pub unsafe extern "C" fn ps_copy_dividers(
    ptr: *const State,
    axis: u8,
    out_buf: *mut f64,
    len: usize,
) -> u64 {
    if ptr.is_null() || out_buf.is_null() {
        return 0;
    }
    let Some(axis) = axis_from_u8(axis) else {
        return 0;
    };

    let dividers = (*ptr).grid.dividers(axis);
    let n = dividers.len().min(len);
    let out = std::slice::from_raw_parts_mut(out_buf, n);
    out.copy_from_slice(&dividers[..n]);
    n as u64
}

/// Looks up the live-grid cell containing the normalized point `(x, y)`.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
/// - `out_row` and `out_col` must be valid, non-null pointers
///
/// # Returns
/// 0 on success, 1 on null pointer.
#[no_mangle]
pub unsafe extern "C" fn ps_cell_for(
    ptr: *const State,
    x: f64,
    y: f64,
    out_row: *mut u32,
    out_col: *mut u32,
) -> i32 {
    if ptr.is_null() || out_row.is_null() || out_col.is_null() {
        return PS_NULL_POINTER;
    }

    let cell = (*ptr).grid.cell_for(x, y);
    *out_row = cell.row as u32;
    *out_col = cell.col as u32;
    PS_OK
}

/// Sets the mean and variance of one live-grid cell. Nothing changes on error.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
///
/// # Returns
/// 0 on success, 1 on null pointer, 2 on an out-of-range cell, a
/// non-finite mean or a non-positive variance.
#[no_mangle]
pub unsafe extern "C" fn ps_set_cell_distribution(
    ptr: *mut State,
    row: u32,
    col: u32,
    mean: f64,
    variance: f64,
) -> i32 {
    if ptr.is_null() {
        return PS_NULL_POINTER;
    }

    let state = &mut *ptr;
    let cell = CellIndex::new(row as usize, col as usize);
    status(
        "set_cell_distribution",
        state.set_cell_distribution(cell, mean, variance),
    )
}

/// Reads the mean and variance the sampler would use for a cell.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
/// - `out_mean` and `out_variance` must be valid, non-null pointers
///
/// # Returns
/// 0 on success, 1 on null pointer, 2 if the cell is outside the live grid.
#[no_mangle]
pub unsafe extern "C" fn ps_get_cell_distribution(
    ptr: *const State,
    row: u32,
    col: u32,
    out_mean: *mut f64,
    out_variance: *mut f64,
) -> i32 {
    if ptr.is_null() || out_mean.is_null() || out_variance.is_null() {
        return PS_NULL_POINTER;
    }

    let state = &*ptr;
    let cell = CellIndex::new(row as usize, col as usize);
    if !state.grid.contains(cell) {
        return status(
            "get_cell_distribution",
            Err(Error::CellOutOfRange {
                row: cell.row,
                col: cell.col,
                rows: state.grid.rows(),
                cols: state.grid.cols(),
            }),
        );
    }
    *out_mean = state.cells.mean(cell);
    *out_variance = state.cells.variance(cell);
    PS_OK
}
