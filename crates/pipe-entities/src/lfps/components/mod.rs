pub mod lfps_receiver;
pub mod lfps_transmitter;
