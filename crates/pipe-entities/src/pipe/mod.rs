pub mod ready;
pub mod usb3_pipe;

pub use ready::ReadyHandle;
pub use usb3_pipe::{PipeInputs, PipeOutputs, Usb3Pipe};
