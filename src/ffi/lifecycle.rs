//! Session creation, destruction, and generation queries.

use tracing::warn;

use crate::state::State;

/// Creates a new session with the default configuration.
///
/// # Returns
/// A pointer to a new State, or null if the worker pool could not be built.
///
/// # Safety
/// The returned pointer must eventually be freed with `ps_destroy()`.
#[no_mangle]
pub extern "C" fn ps_create() -> *mut State {
    match State::new() {
        Ok(state) => Box::into_raw(Box::new(state)),
        Err(e) => {
            warn!(error = %e, "session creation failed");
            std::ptr::null_mut()
        }
    }
}

/// Destroys a session and frees its memory.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by `ps_create()`, or null
/// - `ptr` must not be used after this call
#[no_mangle]
pub unsafe extern "C" fn ps_destroy(ptr: *mut State) {
    if !ptr.is_null() {
        drop(Box::from_raw(ptr));
    }
}

/// Gets the number of completed generation cycles.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
///
/// # Returns
/// The generation counter, or 0 if ptr is null.
#[no_mangle]
pub unsafe extern "C" fn ps_get_generation(ptr: *const State) -> u64 {
    if ptr.is_null() {
        return 0;
    }
    (*ptr).generation
}
