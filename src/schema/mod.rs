//! Sleep log input schema
//!
//! This module defines the record format accepted at the engine boundary and
//! the adapter that reads it from JSON arrays or newline-delimited JSON.

mod adapter;
mod record;

pub use adapter::*;
pub use record::*;
