//! # Ports Layer
//!
//! Trait definitions between the dispatch core and the outside world.
//!
//! - **Driving Port (Inbound)**: `PrecompileDispatch`, used by the pipe server
//!   and the foreign-call adapter
//! - **Driven Ports (Outbound)**: `PrecompileRegistry`, `Precompile`, supplied
//!   by the external precompile library or a test double

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
