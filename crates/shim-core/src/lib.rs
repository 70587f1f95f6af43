//! # Shim Core - Precompile Framing and Dispatch
//!
//! Byte framing and dispatch glue that exposes EVM precompiled contracts to
//! external callers. The contracts themselves come from `revm-precompile`;
//! nothing in this crate hashes, recovers or pairs.
//!
//! ## Wire Protocol
//!
//! ```text
//! request:  [len_hi][len_lo][address][body: len bytes]
//! response: [len_hi][len_lo][status: 0|1][body: len bytes]
//! ```
//!
//! ## Layout
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Frames | `domain/frame.rs` | Header layout, request/response types |
//! | Registry port | `ports/outbound.rs` | `PrecompileRegistry`, `Precompile` |
//! | Dispatch port | `ports/inbound.rs` | `PrecompileDispatch` |
//! | revm adapter | `adapters/revm_registry.rs` | Fork-selected library set |
//! | Stream codec | `adapters/stdio.rs` | Blocking frame reads/writes |
//! | Service | `service.rs` | `Dispatcher`, `PipeServer` |
//! | Config | `config.rs` | Gas budget, fork, env overrides |
//!
//! ## Thread Safety
//!
//! The dispatcher holds no mutable state. Calling it from several threads is
//! sound as long as the registry is (`PrecompileRegistry: Send + Sync`); the
//! revm adapter only reads process-wide static tables.
//!
//! ## Usage Example
//!
//! ```no_run
//! use shim_core::prelude::*;
//!
//! let dispatcher = Dispatcher::from_config(&ShimConfig::default());
//! let mut server = PipeServer::new(&dispatcher);
//! server.serve(&mut std::io::stdin().lock(), &mut std::io::stdout().lock())?;
//! # Ok::<(), shim_core::errors::WireError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::adapters::{
        read_request, read_response, write_request, write_response, InMemoryRegistry,
        RevmRegistry,
    };
    pub use crate::config::{Fork, ShimConfig, DEFAULT_GAS_BUDGET};
    pub use crate::domain::{
        DispatchResult, PrecompileOutput, RequestFrame, ResponseFrame, Status, MAX_BODY_LEN,
    };
    pub use crate::errors::{ConfigError, DispatchError, WireError, WireResult};
    pub use crate::ports::{Precompile, PrecompileDispatch, PrecompileRegistry};
    pub use crate::service::{frame_result, Dispatcher, PipeServer, ServeStats};
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
