//! Micro-benchmark harness for the signature lifecycle
//! (setup, key generation, signing, verification) over bilinear groups.
//!
//! A run either measures wall-clock time against a real pairing group or
//! counts the primitive group operations each stage performs against an
//! instrumented group.

pub mod config;
pub mod counting;
pub mod error;
pub mod memory;
pub mod message;
pub mod operation;
pub mod orchestrator;
pub mod report;
pub mod slots;
pub mod stage;
pub mod timing;

#[cfg(test)]
mod fixture;

pub use config::{
    parse_bool_env, parse_usize_env, random_seed, seed_from_str, BenchRng,
    BenchmarkConfig, BenchmarkSettings,
};
pub use counting::CountingEngine;
pub use error::BenchmarkError;
pub use memory::TrackingAllocator;
pub use message::{prepare_messages, G1Messages, G2Messages, MessageBlock, MessageSpace};
pub use operation::{
    MeasuredOperation, OperationError, OperationInstance, Scheme,
    SignatureKeyPair,
};
pub use orchestrator::{
    run_benchmark, run_counted, run_timed, Measurement, StageResult,
    VerificationTally,
};
pub use report::{
    publish, ConsoleReport, ReportError, ReportSink, RunHeader, TexExport,
};
pub use stage::{BenchmarkMode, Stage};
pub use timing::{BenchmarkTimes, TimingEngine};
