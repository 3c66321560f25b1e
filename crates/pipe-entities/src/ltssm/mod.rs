pub mod components;
pub mod ltssm_fsm;
pub mod ltssm_state;

pub use ltssm_fsm::{Ltssm, LtssmControl, LtssmInputs, LtssmParams, LtssmStatus, LtssmTimeouts};
pub use ltssm_state::LtssmState;
