//! Loading and saving session configuration files.

use std::ffi::{c_char, CStr};

use tracing::warn;

use crate::config::SimulationConfig;
use crate::ffi::{status, PS_INVALID_ARGUMENT, PS_NULL_POINTER};
use crate::state::State;

unsafe fn path_arg<'a>(path: *const c_char) -> Option<&'a str> {
    CStr::from_ptr(path).to_str().ok()
}

/// Creates a session from a JSON configuration file.
///
/// # Returns
/// A pointer to a new State, or null if `path` is null, unreadable or invalid.
///
/// # Safety
/// - `path` must be a valid NUL-terminated string, or null
/// - The returned pointer must eventually be freed with `ps_destroy()`.
#[no_mangle]
pub unsafe extern "C" fn ps_create_from_config(path: *const c_char) -> *mut State {
    if path.is_null() {
        return std::ptr::null_mut();
    }
    let Some(path) = path_arg(path) else {
        return std::ptr::null_mut();
    };

    match SimulationConfig::load(path).and_then(|config| State::from_config(&config)) {
        Ok(state) => Box::into_raw(Box::new(state)),
        Err(e) => {
            warn!(path, error = %e, "session creation from config failed");
            std::ptr::null_mut()
        }
    }
}

/// Replaces the live inputs of a session with a JSON configuration file.
/// Current samples are kept. Nothing changes on error.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
/// - `path` must be a valid NUL-terminated string, or null
///
/// # Returns
/// 0 on success, 1 on null pointer, 2 on a non-UTF-8 path or invalid
/// configuration, 4 on I/O failure.
#[no_mangle]
pub unsafe extern "C" fn ps_load_config(ptr: *mut State, path: *const c_char) -> i32 {
    if ptr.is_null() || path.is_null() {
        return PS_NULL_POINTER;
    }
    let Some(path) = path_arg(path) else {
        return PS_INVALID_ARGUMENT;
    };

    let state = &mut *ptr;
    status(
        "load_config",
        SimulationConfig::load(path).and_then(|config| state.apply_config(&config)),
    )
}

/// Writes the live inputs of a session to a JSON configuration file.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
/// - `path` must be a valid NUL-terminated string, or null
///
/// # Returns
/// 0 on success, 1 on null pointer, 2 on a non-UTF-8 path, 4 on I/O failure.
#[no_mangle]
pub unsafe extern "C" fn ps_save_config(ptr: *const State, path: *const c_char) -> i32 {
    if ptr.is_null() || path.is_null() {
        return PS_NULL_POINTER;
    }
    let Some(path) = path_arg(path) else {
        return PS_INVALID_ARGUMENT;
    };

    status("save_config", (*ptr).to_config().save(path))
}
