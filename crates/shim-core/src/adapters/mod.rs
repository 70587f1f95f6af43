//! # Adapters Layer (Outer Hexagon)
//!
//! - `revm_registry` - driven adapter over the `revm-precompile` tables
//! - `in_memory` - closure-backed registry (test double, host extensions)
//! - `stdio` - blocking frame codec for byte streams

pub mod in_memory;
pub mod revm_registry;
pub mod stdio;

pub use in_memory::*;
pub use revm_registry::*;
pub use stdio::*;
