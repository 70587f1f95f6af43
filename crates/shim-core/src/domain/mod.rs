//! # Domain Layer
//!
//! Frame layout and dispatch results. No I/O here; the stream codec lives in
//! `adapters::stdio`.

pub mod entities;
pub mod frame;

pub use entities::*;
pub use frame::*;
