//! Core types for the USB3 PIPE link layer
//!
//! This crate provides the building blocks shared by all link units:
//! - Symbol and Word types for the 4-lane symbol stream
//! - Ordered set tables (TSEQ, TS1, TS1_INV, TS2) and the link config byte
//! - Clock domain crossing primitives
//! - LFPS timing classes and time to cycle conversion
//! - Common macros and debug utilities

pub mod cdc;
pub mod debug;
pub mod link_config;
pub mod ordered_sets;
pub mod pipe_error;
pub mod pipe_units;
pub mod symbols;
pub mod timing;
pub mod version;
pub mod word;

// Re-export commonly used items
pub use cdc::{MultiReg, PulseSynchronizer};
pub use link_config::LinkConfig;
pub use ordered_sets::{OrderedSet, OrderedSetKind};
pub use pipe_error::PipeErr;
pub use pipe_units::PipeUnit;
pub use symbols::Symbol;
pub use word::Word;

/// Number of system clock cycles since reset
pub type Cycle = u64;

/// Minimum system clock for the LFPS and LTSSM timers to resolve correctly
pub const MIN_SYS_CLK_FREQ: u64 = 125_000_000;
