//! FFI bindings for Stress Advisor
//!
//! This module provides C-compatible functions for calling the advisor from
//! other languages (mobile apps, UI shells). All functions use C strings
//! (null-terminated) and return allocated memory that must be freed by the
//! caller using `stress_advisor_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::encoder::ReportEncoder;
use crate::pipeline::StressAdvisor;
use crate::types::RawInputs;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Advisor Lifecycle
// ============================================================================

/// Opaque handle to a loaded StressAdvisor
pub struct StressAdvisorHandle {
    advisor: StressAdvisor,
    encoder: ReportEncoder,
}

/// Load a model bundle and create an advisor.
///
/// # Safety
/// - `bundle_path` must be a valid null-terminated C string.
/// - Returns a pointer that must be freed with `stress_advisor_free`.
/// - Returns NULL on error; call `stress_advisor_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn stress_advisor_load(bundle_path: *const c_char) -> *mut StressAdvisorHandle {
    clear_last_error();

    let path = match cstr_to_string(bundle_path) {
        Some(s) => s,
        None => {
            set_last_error("Invalid bundle path pointer");
            return ptr::null_mut();
        }
    };

    match StressAdvisor::from_path(&path) {
        Ok(advisor) => Box::into_raw(Box::new(StressAdvisorHandle {
            advisor,
            encoder: ReportEncoder::new(),
        })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free an advisor.
///
/// # Safety
/// - `advisor` must be a valid pointer returned by `stress_advisor_load`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn stress_advisor_free(advisor: *mut StressAdvisorHandle) {
    if !advisor.is_null() {
        drop(Box::from_raw(advisor));
    }
}

/// Parse the shared arguments of the per-request calls
unsafe fn request<'a>(
    advisor: *const StressAdvisorHandle,
    inputs_json: *const c_char,
) -> Option<(&'a StressAdvisorHandle, RawInputs)> {
    if advisor.is_null() {
        set_last_error("Null advisor pointer");
        return None;
    }

    let json = match cstr_to_string(inputs_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return None;
        }
    };

    match serde_json::from_str::<RawInputs>(&json) {
        Ok(raw) => Some((&*advisor, raw)),
        Err(e) => {
            set_last_error(&format!("Invalid inputs JSON: {e}"));
            None
        }
    }
}

// ============================================================================
// Scoring and Advice
// ============================================================================

/// Score and advise on a JSON-encoded set of raw inputs.
///
/// Returns an assessment report JSON object.
///
/// # Safety
/// - `advisor` must be a valid pointer returned by `stress_advisor_load`.
/// - `inputs_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `stress_advisor_free_string`.
/// - Returns NULL on error; call `stress_advisor_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn stress_advisor_assess(
    advisor: *const StressAdvisorHandle,
    inputs_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some((handle, raw)) = request(advisor, inputs_json) else {
        return ptr::null_mut();
    };

    let report = match handle.advisor.assess_report(&raw, &handle.encoder) {
        Ok(report) => report,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    match serde_json::to_string(&report) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Rule-based tips only, as a JSON array of `{id, message}` objects.
///
/// # Safety
/// - `advisor` must be a valid pointer returned by `stress_advisor_load`.
/// - `inputs_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `stress_advisor_free_string`.
/// - Returns NULL on error; call `stress_advisor_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn stress_advisor_suggest(
    advisor: *const StressAdvisorHandle,
    inputs_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some((handle, raw)) = request(advisor, inputs_json) else {
        return ptr::null_mut();
    };

    let tips = match handle.advisor.suggestions(&raw) {
        Ok(tips) => tips,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    match serde_json::to_string(&tips) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Stress Advisor functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Stress Advisor function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn stress_advisor_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Stress Advisor call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn stress_advisor_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn stress_advisor_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
