//! FFI bindings for n24-drift
//!
//! This module provides C-compatible functions so a renderer written in
//! another language can call the engine. All functions use C strings
//! (null-terminated) and return allocated memory that must be freed by the
//! caller using `n24_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::EngineConfig;
use crate::pipeline::{analyze_json, predict_json, DriftProcessor};

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

/// Read the optional config argument; NULL means defaults
unsafe fn config_arg(config_json: *const c_char) -> Result<Option<String>, ()> {
    if config_json.is_null() {
        return Ok(None);
    }
    match cstr_to_string(config_json) {
        Some(s) => Ok(Some(s)),
        None => {
            set_last_error("Config string is not valid UTF-8");
            Err(())
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Analyze a JSON array of records and return the encoded analysis payload.
///
/// # Safety
/// - `records_json` must be a valid null-terminated C string.
/// - `config_json` must be a valid null-terminated C string or NULL (defaults).
/// - Returns a newly allocated string that must be freed with `n24_free_string`.
/// - Returns NULL on error; call `n24_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn n24_analyze(
    records_json: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(records) = cstr_to_string(records_json) else {
        set_last_error("Invalid records string pointer");
        return ptr::null_mut();
    };
    let Ok(config) = config_arg(config_json) else {
        return ptr::null_mut();
    };

    match analyze_json(&records, config.as_deref()) {
        Ok(payload) => string_to_cstr(&payload),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Predict future sleep windows from a JSON array of records.
///
/// # Safety
/// - `records_json` must be a valid null-terminated C string.
/// - `config_json` must be a valid null-terminated C string or NULL (defaults).
/// - Returns a newly allocated JSON array that must be freed with `n24_free_string`.
/// - Returns NULL on error; call `n24_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn n24_predict(
    records_json: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(records) = cstr_to_string(records_json) else {
        set_last_error("Invalid records string pointer");
        return ptr::null_mut();
    };
    let Ok(config) = config_arg(config_json) else {
        return ptr::null_mut();
    };

    match predict_json(&records, config.as_deref()) {
        Ok(payload) => string_to_cstr(&payload),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Record Store API
// ============================================================================

/// Opaque handle to a loaded record store
pub struct N24StoreHandle {
    processor: DriftProcessor,
}

/// Load records into a store that can be analyzed repeatedly.
///
/// # Safety
/// - `records_json` must be a valid null-terminated C string.
/// - Must be freed with `n24_store_free`.
/// - Returns NULL on error; call `n24_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn n24_store_new(records_json: *const c_char) -> *mut N24StoreHandle {
    clear_last_error();

    let Some(records) = cstr_to_string(records_json) else {
        set_last_error("Invalid records string pointer");
        return ptr::null_mut();
    };

    match DriftProcessor::from_json(&records) {
        Ok(processor) => Box::into_raw(Box::new(N24StoreHandle { processor })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a store.
///
/// # Safety
/// - `store` must be a valid pointer returned by `n24_store_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn n24_store_free(store: *mut N24StoreHandle) {
    if !store.is_null() {
        drop(Box::from_raw(store));
    }
}

/// Number of records in a store, or -1 for a NULL store.
///
/// # Safety
/// - `store` must be a valid pointer returned by `n24_store_new`, or NULL.
#[no_mangle]
pub unsafe extern "C" fn n24_store_len(store: *const N24StoreHandle) -> i64 {
    match store.as_ref() {
        Some(handle) => handle.processor.store().len() as i64,
        None => -1,
    }
}

/// Analyze a store under a configuration and return the encoded payload.
///
/// Every call recomputes from the stored records.
///
/// # Safety
/// - `store` must be a valid pointer returned by `n24_store_new`.
/// - `config_json` must be a valid null-terminated C string or NULL (defaults).
/// - Returns a newly allocated string that must be freed with `n24_free_string`.
/// - Returns NULL on error; call `n24_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn n24_store_analyze(
    store: *const N24StoreHandle,
    config_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(handle) = store.as_ref() else {
        set_last_error("Invalid store pointer");
        return ptr::null_mut();
    };
    let Ok(config) = config_arg(config_json) else {
        return ptr::null_mut();
    };

    let config = match config {
        Some(json) => match EngineConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        },
        None => EngineConfig::default(),
    };

    match handle.processor.analyze_to_json(&config) {
        Ok(payload) => string_to_cstr(&payload),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by n24 functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by an n24 function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn n24_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next n24 function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn n24_last_error() -> *const c_char {
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
pub unsafe extern "C" fn n24_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
