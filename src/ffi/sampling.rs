//! Generation controls, sample export and frozen ground truth.

use crate::ffi::{status, PS_NULL_POINTER, PS_OK, PS_PRECONDITION};
use crate::state::State;
use crate::stratify::sampler::GenerationParams;

/// Generation controls as seen by the host. Flags are 0/1.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PsGenerationParams {
    pub sample_count: u32,
    pub per_cell: u8,
    pub stratified: u8,
    pub has_seed: u8,
    pub seed: u64,
    pub global_mean: f64,
    pub std_dev: f64,
}

impl From<&GenerationParams> for PsGenerationParams {
    fn from(p: &GenerationParams) -> Self {
        PsGenerationParams {
            sample_count: p.sample_count.min(u32::MAX as usize) as u32,
            per_cell: p.per_cell as u8,
            stratified: p.stratified as u8,
            has_seed: p.seed.is_some() as u8,
            seed: p.seed.unwrap_or(0),
            global_mean: p.global_mean,
            std_dev: p.std_dev,
        }
    }
}

impl From<&PsGenerationParams> for GenerationParams {
    fn from(p: &PsGenerationParams) -> Self {
        GenerationParams {
            sample_count: p.sample_count as usize,
            per_cell: p.per_cell != 0,
            stratified: p.stratified != 0,
            global_mean: p.global_mean,
            std_dev: p.std_dev,
            seed: (p.has_seed != 0).then_some(p.seed),
        }
    }
}

/// Replaces the generation controls. Nothing changes on error.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
/// - `params` must be a valid pointer, or null
///
/// # Returns
/// 0 on success, 1 on null pointer, 2 on a sample count outside
/// [1, 10000] or a non-positive std dev.
#[no_mangle]
pub unsafe extern "C" fn ps_set_generation_params(
    ptr: *mut State,
    params: *const PsGenerationParams,
) -> i32 {
    if ptr.is_null() || params.is_null() {
        return PS_NULL_POINTER;
    }

    let state = &mut *ptr;
    status(
        "set_generation_params",
        state.set_params(GenerationParams::from(&*params)),
    )
}

/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
/// - `out` must be a valid pointer, or null
///
/// # Returns
/// 0 on success, 1 on null pointer.
#[no_mangle]
pub unsafe extern "C" fn ps_get_generation_params(
    ptr: *const State,
    out: *mut PsGenerationParams,
) -> i32 {
    if ptr.is_null() || out.is_null() {
        return PS_NULL_POINTER;
    }
    *out = PsGenerationParams::from(&(*ptr).params);
    PS_OK
}

/// Draws a new sample set from the live grid and distributions, replacing
/// the previous one, and bumps the generation counter.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
///
/// # Returns
/// 0 on success, 1 on null pointer, 2 on invalid parameters (the previous
/// samples are kept).
#[no_mangle]
pub unsafe extern "C" fn ps_generate(ptr: *mut State) -> i32 {
    if ptr.is_null() {
        return PS_NULL_POINTER;
    }

    let state = &mut *ptr;
    status("generate", state.generate().map(|_| ()))
}

/// Drops the current samples.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
#[no_mangle]
pub unsafe extern "C" fn ps_clear(ptr: *mut State) {
    if ptr.is_null() {
        return;
    }
    (*ptr).clear();
}

/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
///
/// # Returns
/// Number of current samples, or 0 if ptr is null.
#[no_mangle]
pub unsafe extern "C" fn ps_sample_count(ptr: *const State) -> u64 {
    if ptr.is_null() {
        return 0;
    }
    (*ptr).samples().len() as u64
}

/// Copies samples into a flat buffer of `(x, y, value)` triplets.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
/// - `out_buf` must point to at least `3 * max_samples` writable doubles
///
/// # Returns
/// Number of samples written, or 0 on error.
#[no_mangle]
pub unsafe extern "C" fn ps_copy_samples(
    ptr: *const State,
    out_buf: *mut f64,
    max_samples: usize,
) -> u64 {
    if ptr.is_null() || out_buf.is_null() {
        return 0;
    }

    let samples = (*ptr).samples();
    let n = samples.len().min(max_samples);
    let out = std::slice::from_raw_parts_mut(out_buf, n * 3);
    for (chunk, s) in out.chunks_exact_mut(3).zip(samples) {
        chunk[0] = s.x;
        chunk[1] = s.y;
        chunk[2] = s.value;
    }
    n as u64
}

/// Ground truth frozen with the current samples.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
/// - `out` must be a valid pointer, or null
///
/// # Returns
/// 0 on success, 1 on null pointer, 3 if nothing has been generated.
#[no_mangle]
pub unsafe extern "C" fn ps_ground_truth(ptr: *const State, out: *mut f64) -> i32 {
    if ptr.is_null() || out.is_null() {
        return PS_NULL_POINTER;
    }
    match (*ptr).ground_truth() {
        Some(truth) => {
            *out = truth;
            PS_OK
        }
        None => PS_PRECONDITION,
    }
}

/// Min and max of the current sample values.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
/// - `out_min` and `out_max` must be valid pointers, or null
///
/// # Returns
/// 0 on success, 1 on null pointer, 3 if there are no samples.
#[no_mangle]
pub unsafe extern "C" fn ps_value_range(
    ptr: *const State,
    out_min: *mut f64,
    out_max: *mut f64,
) -> i32 {
    if ptr.is_null() || out_min.is_null() || out_max.is_null() {
        return PS_NULL_POINTER;
    }
    match (*ptr).value_range() {
        Some(range) => {
            *out_min = range.min;
            *out_max = range.max;
            PS_OK
        }
        None => PS_PRECONDITION,
    }
}
