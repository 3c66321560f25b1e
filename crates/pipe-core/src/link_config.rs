/// Link configuration field carried in symbol 5 of TS1 and TS2
/// See USB 3.0 Table 6-5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkConfig {
    pub reset: bool,
    pub loopback: bool,
    /// Transmitted inverted: bit set means scrambling disabled
    pub scrambling: bool,
}

impl LinkConfig {
    const RESET_BIT: u8 = 1 << 0;
    const LOOPBACK_BIT: u8 = 1 << 2;
    const DISABLE_SCRAMBLING_BIT: u8 = 1 << 3;

    pub fn to_byte(&self) -> u8 {
        let mut byte = 0;
        if self.reset {
            byte |= Self::RESET_BIT;
        }
        if self.loopback {
            byte |= Self::LOOPBACK_BIT;
        }
        if !self.scrambling {
            byte |= Self::DISABLE_SCRAMBLING_BIT;
        }
        byte
    }

    /// Reserved bits are ignored
    pub fn from_byte(byte: u8) -> Self {
        LinkConfig {
            reset: byte & Self::RESET_BIT != 0,
            loopback: byte & Self::LOOPBACK_BIT != 0,
            scrambling: byte & Self::DISABLE_SCRAMBLING_BIT == 0,
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            reset: false,
            loopback: false,
            scrambling: true,
        }
    }
}
