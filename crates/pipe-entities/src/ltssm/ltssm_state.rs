use core::fmt;

use crate::ordered_set::TxSet;

/// LTSSM states, see USB 3.0 section 7.5. Only the Polling, U0 and Recovery
/// substates needed for link bring-up are modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LtssmState {
    #[default]
    PollingEntry,
    PollingLfps,
    PollingRxEq,
    PollingActive,
    PollingConfiguration,
    U0,
    PollingExitToCompliance,
    PollingExitToRxDetect,
    RecoveryActive,
    RecoveryConfiguration,
}

impl LtssmState {
    pub fn name(self) -> &'static str {
        match self {
            LtssmState::PollingEntry => "Polling.Entry",
            LtssmState::PollingLfps => "Polling.LFPS",
            LtssmState::PollingRxEq => "Polling.RxEQ",
            LtssmState::PollingActive => "Polling.Active",
            LtssmState::PollingConfiguration => "Polling.Configuration",
            LtssmState::U0 => "U0",
            LtssmState::PollingExitToCompliance => "Polling.ExitToCompliance",
            LtssmState::PollingExitToRxDetect => "Polling.ExitToRxDetect",
            LtssmState::RecoveryActive => "Recovery.Active",
            LtssmState::RecoveryConfiguration => "Recovery.Configuration",
        }
    }

    /// Ordered set transmitted in this state
    pub fn tx_set(self) -> Option<TxSet> {
        match self {
            LtssmState::PollingRxEq => Some(TxSet::Tseq),
            LtssmState::PollingActive | LtssmState::RecoveryActive => Some(TxSet::Ts1),
            LtssmState::PollingConfiguration | LtssmState::RecoveryConfiguration => Some(TxSet::Ts2),
            _ => None,
        }
    }

    /// States in which the transceiver is asked for word alignment
    /// and training sets are received
    pub fn is_training(self) -> bool {
        self.tx_set().is_some()
    }

    pub fn is_exit(self) -> bool {
        matches!(self, LtssmState::PollingExitToCompliance | LtssmState::PollingExitToRxDetect)
    }
}

impl fmt::Display for LtssmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_states() {
        assert_eq!(LtssmState::default(), LtssmState::PollingEntry);
        assert!(LtssmState::PollingRxEq.is_training());
        assert!(LtssmState::RecoveryConfiguration.is_training());
        assert!(!LtssmState::U0.is_training());
        assert!(!LtssmState::PollingLfps.is_training());
        assert!(LtssmState::PollingExitToRxDetect.is_exit());
        assert_eq!(LtssmState::RecoveryActive.to_string(), "Recovery.Active");
    }
}
