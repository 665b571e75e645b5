//! Error-surface export into caller-owned buffers.

use crate::ffi::{or_nan, status, PS_INVALID_ARGUMENT, PS_NULL_POINTER, PS_OK};
use crate::state::State;

/// Summary of a computed surface. Absent values are NaN; `has_best` is 0
/// when every candidate was null.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct PsSurfaceSummary {
    pub resolution: u32,
    pub min: f64,
    pub max: f64,
    pub baseline_mse: f64,
    pub has_best: u8,
    pub best_row: u32,
    pub best_col: u32,
    pub best_horizontal: f64,
    pub best_vertical: f64,
    pub best_mse: f64,
}

/// Computes the `resolution x resolution` error surface over the current
/// samples against their frozen ground truth.
///
/// # Layout
/// Row-major: entry `i * resolution + j` is the candidate with a horizontal
/// divider at `(i + 1) / resolution * 100` and a vertical divider at
/// `(j + 1) / resolution * 100`. Null candidates are written as NaN.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
/// - `out_buf` must point to at least `len` writable doubles
/// - `out_summary` may be null
///
/// # Returns
/// 0 on success, 1 on null pointer, 2 if `resolution` is 0 or `len` is too
/// small, 3 if there are no samples, 4 if the computation failed.
#[no_mangle]
pub unsafe extern "C" fn ps_compute_surface(
    ptr: *const State,
    resolution: u32,
    out_buf: *mut f64,
    len: usize,
    out_summary: *mut PsSurfaceSummary,
) -> i32 {
    if ptr.is_null() || out_buf.is_null() {
        return PS_NULL_POINTER;
    }
    let r = resolution as usize;
    if len < r * r {
        return PS_INVALID_ARGUMENT;
    }

    let surface = match (*ptr).error_surface_at(r) {
        Ok(surface) => surface,
        Err(e) => return status("compute_surface", Err(e)),
    };

    let out = std::slice::from_raw_parts_mut(out_buf, r * r);
    for (slot, cell) in out.iter_mut().zip(surface.cells()) {
        *slot = or_nan(*cell);
    }

    if !out_summary.is_null() {
        let best = surface.best_candidate();
        *out_summary = PsSurfaceSummary {
            resolution,
            min: or_nan(surface.min()),
            max: or_nan(surface.max()),
            baseline_mse: surface.baseline_mse(),
            has_best: best.is_some() as u8,
            best_row: best.map_or(0, |b| b.row as u32),
            best_col: best.map_or(0, |b| b.col as u32),
            best_horizontal: or_nan(best.map(|b| b.horizontal_divider)),
            best_vertical: or_nan(best.map(|b| b.vertical_divider)),
            best_mse: or_nan(best.map(|b| b.mse)),
        };
    }
    PS_OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::lifecycle;
    use crate::ffi::sampling::{ps_generate, ps_set_generation_params, PsGenerationParams};
    use std::ptr;

    fn summary() -> PsSurfaceSummary {
        PsSurfaceSummary {
            resolution: 0,
            min: 0.0,
            max: 0.0,
            baseline_mse: 0.0,
            has_best: 0,
            best_row: 0,
            best_col: 0,
            best_horizontal: 0.0,
            best_vertical: 0.0,
            best_mse: 0.0,
        }
    }

    #[test]
    fn test_compute_surface() {
        unsafe {
            let state = lifecycle::ps_create();
            let params = PsGenerationParams {
                sample_count: 500,
                per_cell: 1,
                stratified: 0,
                has_seed: 1,
                seed: 99,
                global_mean: 5.0,
                std_dev: 2.0,
            };
            ps_set_generation_params(state, &params);
            ps_generate(state);

            let r = 10usize;
            let mut buf = vec![0.0f64; r * r];
            let mut out = summary();
            assert_eq!(
                ps_compute_surface(state, r as u32, buf.as_mut_ptr(), buf.len(), &mut out),
                0
            );

            let expected = (*state).error_surface_at(r).unwrap();
            for (got, want) in buf.iter().zip(expected.cells()) {
                match want {
                    Some(v) => assert_eq!(got, v),
                    None => assert!(got.is_nan()),
                }
            }
            // dividers at 100% leave an empty band
            assert!(buf[(r - 1) * r].is_nan());
            assert!(buf[r - 1].is_nan());

            assert_eq!(out.resolution, 10);
            assert_eq!(out.has_best, 1);
            assert_eq!(Some(out.min), expected.min());
            assert_eq!(Some(out.max), expected.max());
            assert_eq!(out.best_mse, out.min);
            assert_eq!(out.baseline_mse, (*state).baseline_mse().unwrap());

            // summary is optional
            assert_eq!(
                ps_compute_surface(state, 4, buf.as_mut_ptr(), buf.len(), ptr::null_mut()),
                0
            );

            lifecycle::ps_destroy(state);
        }
    }

    #[test]
    fn test_surface_errors() {
        unsafe {
            let state = lifecycle::ps_create();
            let mut buf = vec![0.0f64; 16];

            // no samples yet
            assert_eq!(
                ps_compute_surface(state, 4, buf.as_mut_ptr(), buf.len(), ptr::null_mut()),
                3
            );

            ps_generate(state);
            assert_eq!(
                ps_compute_surface(state, 0, buf.as_mut_ptr(), buf.len(), ptr::null_mut()),
                2
            );
            assert_eq!(
                ps_compute_surface(state, 5, buf.as_mut_ptr(), buf.len(), ptr::null_mut()),
                2
            );
            assert_eq!(
                ps_compute_surface(ptr::null(), 4, buf.as_mut_ptr(), buf.len(), ptr::null_mut()),
                1
            );
            assert_eq!(
                ps_compute_surface(state, 4, ptr::null_mut(), 16, ptr::null_mut()),
                1
            );

            lifecycle::ps_destroy(state);
        }
    }
}
