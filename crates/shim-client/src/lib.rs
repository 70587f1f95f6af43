//! # Shim Client - Callers and Differential Testing
//!
//! Drives precompile shims from the outside.
//!
//! - [`Caller`] spawns a pipe-mode shim and exchanges frames with it.
//! - [`Backend`] abstracts over a spawned shim, an in-process dispatcher and
//!   independent reference computations.
//! - [`DiffRunner`] feeds seeded inputs to two backends and reports every
//!   disagreement as a [`ComparisonError`]; [`ParallelDiff`] spreads a run
//!   over worker threads.
//!
//! ## Usage Example
//!
//! ```no_run
//! use shim_client::prelude::*;
//! use shim_core::prelude::{Dispatcher, ShimConfig};
//!
//! let shim = Caller::spawn("target/release/precompile-pipe")?;
//! let control = InProcess::new(Dispatcher::from_config(&ShimConfig::default()));
//! let mut runner = DiffRunner::new(Box::new(shim), Box::new(control), InputGenerator::default());
//! let report = runner.run(0x02, 100)?;
//! assert!(report.is_clean());
//! # Ok::<(), shim_client::errors::CommunicationError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod caller;
pub mod compare;
pub mod errors;
pub mod generator;
pub mod runner;

pub use backend::{reference_control, Backend, IdentityControl, InProcess, Sha256Control};
pub use caller::Caller;
pub use compare::{compare, compare_lenient, Outcome};
pub use errors::{CommunicationError, CommunicationResult, ComparisonError};
pub use generator::InputGenerator;
pub use runner::{split_iterations, DiffReport, DiffRunner, Mismatch, ParallelDiff};

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::backend::{reference_control, Backend, InProcess};
    pub use crate::caller::Caller;
    pub use crate::errors::{CommunicationError, ComparisonError};
    pub use crate::generator::InputGenerator;
    pub use crate::runner::{DiffReport, DiffRunner, ParallelDiff};
}
