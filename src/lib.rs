//! n24-drift - Drift, cycle and prediction engine for non-24-hour sleep logs
//!
//! n24-drift takes a log of sleep/wake records from someone whose sleep is not
//! locked to a 24-hour day and derives circadian figures through a
//! deterministic pipeline: day grouping → drift calculation → cycle analysis
//! → prediction.
//!
//! ## Modules
//!
//! - **Engine**: `grouping`, `drift`, `cycle`, `predictor`, orchestrated by `pipeline`
//! - **Boundary**: `schema` (record input), `encoder` (analysis output), `ffi` (C ABI)
//! - **Presentation**: `format` (human-readable figures)

pub mod config;
pub mod cycle;
pub mod drift;
pub mod encoder;
pub mod error;
pub mod format;
pub mod grouping;
pub mod pipeline;
pub mod predictor;
pub mod schema;
pub mod store;
pub mod timestamp;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::EngineConfig;
pub use cycle::CycleAnalyzer;
pub use drift::DriftCalculator;
pub use error::ComputeError;
pub use grouping::DayGrouper;
pub use pipeline::{analyze, analyze_json, predict, predict_json, DriftProcessor};
pub use predictor::Predictor;
pub use store::RecordStore;
pub use timestamp::Timestamp;
pub use types::{
    Analysis, CycleMetrics, DayGroup, DriftResult, PredictedRecord, SleepKind, SleepRecord,
};

// Schema exports
pub use schema::{RecordAdapter, SCHEMA_VERSION};

/// Engine version embedded in all encoded payloads
pub const DRIFT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for encoded payloads
pub const PRODUCER_NAME: &str = "n24-drift";
