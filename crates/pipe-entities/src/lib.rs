//! Link units of the USB3 PIPE model and the top level that wires them
//!
//! - `lfps`: Polling LFPS receiver and transmitter
//! - `ordered_set`: TSEQ/TS1/TS2 detectors and generators, grouped in the training unit
//! - `scrambling`: LFSR scrambler and self-synchronizing descrambler
//! - `ltssm`: the link training state machine
//! - `pipe`: `Usb3Pipe`, one end of the link between transceiver and device core
//! - `loopback`: two pipes clocked against each other

pub mod lfps;
pub mod loopback;
pub mod ltssm;
pub mod ordered_set;
pub mod pipe;
pub mod scrambling;
pub mod unit_trait;

// Re-export commonly used items
pub use loopback::{LinkEvent, LoopbackLink, Side};
pub use ltssm::{Ltssm, LtssmState};
pub use pipe::{PipeInputs, PipeOutputs, ReadyHandle, Usb3Pipe};
pub use unit_trait::PipeUnitTrait;
