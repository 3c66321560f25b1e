// Units of the link layer
#[derive(PartialEq, Eq, Hash, Clone, Debug, Copy)]
pub enum PipeUnit {
    /// Low frequency periodic signaling
    Lfps,
    /// Ordered set detection and generation
    Training,
    /// Transmit side scrambler
    Scrambler,
    /// Receive side descrambler
    Descrambler,
    /// Link training and status state machine
    Ltssm,

    /// The complete pipe, as seen by the device core
    Pipe,
}
