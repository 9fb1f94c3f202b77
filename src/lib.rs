//! NPU workload cost-prediction engine.
//!
//! Given a candidate operation placement — device generation, tensor
//! shapes/dtypes/layouts, tiling strategy, halo/SEP state — this crate
//! validates whether the placement is representable on that generation of
//! silicon, computes its exact CMX memory footprint, derives a stable
//! fingerprint, and (once both checks pass) hands the operation to a
//! [`predictor::Predictor`] for a cycle-count estimate. The predictor itself
//! — a trained regression model or a live HTTP profiling service — is out
//! of scope for this crate; see `predictor::local` for the deterministic
//! placeholder used when nothing else is configured.
//!
//! # Pipeline
//!
//! ```text
//! Workload -> OperationRecord -> validate (C7) -> memory_breakdown (C8)
//!          -> fingerprint (C9) -> Predictor::predict (C10)
//! ```
//!
//! [`engine::CostEngine`] orchestrates all four stages; most callers only
//! need that and a [`workload::Workload`].

#![warn(clippy::all)]

pub mod behavior;
pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod halo;
pub mod predictor;
pub mod range;
pub mod sep;
pub mod serializer;
pub mod tensor;
pub mod types;
pub mod validator;
pub mod workload;

pub use config::{ConfigError, EngineConfig};
pub use engine::{CostEngine, CostInfo, MemoryBreakdown, MemoryError};
pub use error::{CostError, ErrorCode};
pub use predictor::{local::LocalPredictor, remote::RemotePredictor, CostEstimate, Predictor, PredictorError};
pub use types::{ActivationFunction, DataType, Device, ExecutionMode, ISIStrategy, Layout, Operation, Swizzling};
pub use validator::{Severity, ValidationIssue, ValidationReport};
pub use workload::{Kernel, MpeEngine, OperationRecord, Padding, Stride, Workload};

/// Library version, forwarded from the crate manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
