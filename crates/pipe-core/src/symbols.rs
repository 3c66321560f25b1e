/// One 8b/10b symbol as seen above the transceiver: a byte plus the control (K) marker.
/// Named as in the USB 3.0 specification, Table 6-3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Symbol {
    pub value: u8,
    pub is_ctrl: bool,
}

impl Symbol {
    /// Control symbol Kx.y
    pub const fn k(x: u8, y: u8) -> Self {
        Symbol { value: (y << 5) | x, is_ctrl: true }
    }

    /// Data symbol Dx.y
    pub const fn d(x: u8, y: u8) -> Self {
        Symbol { value: (y << 5) | x, is_ctrl: false }
    }

    pub const fn data(value: u8) -> Self {
        Symbol { value, is_ctrl: false }
    }

    /// Returns the K-code name for a control symbol, if it is one of the named ones
    pub fn name(&self) -> Option<&'static str> {
        if !self.is_ctrl {
            return None;
        }
        K_CODES.iter().find(|k| k.symbol.value == self.value).map(|k| k.name)
    }
}

/// Skip, compensates for different bit rates between two communicating ports
pub const SKP: Symbol = Symbol::k(28, 1);
/// Start data packet
pub const SDP: Symbol = Symbol::k(28, 2);
/// End bad
pub const EDB: Symbol = Symbol::k(28, 3);
/// Decode error substitution
pub const SUB: Symbol = Symbol::k(28, 4);
/// Comma, used for alignment and descrambler resynchronization
pub const COM: Symbol = Symbol::k(28, 5);
/// Reserved
pub const RSD: Symbol = Symbol::k(28, 6);
/// Start header packet
pub const SHP: Symbol = Symbol::k(27, 7);
/// End
pub const END: Symbol = Symbol::k(29, 7);
/// Start link command
pub const SLC: Symbol = Symbol::k(30, 7);
/// End packet framing
pub const EPF: Symbol = Symbol::k(23, 7);

pub struct KCode {
    pub name: &'static str,
    pub symbol: Symbol,
    pub description: &'static str,
}

pub const K_CODES: [KCode; 10] = [
    KCode { name: "SKP", symbol: SKP, description: "Skip" },
    KCode { name: "SDP", symbol: SDP, description: "Start Data Packet" },
    KCode { name: "EDB", symbol: EDB, description: "End Bad" },
    KCode { name: "SUB", symbol: SUB, description: "Decode Error Substitution" },
    KCode { name: "COM", symbol: COM, description: "Comma" },
    KCode { name: "RSD", symbol: RSD, description: "Reserved" },
    KCode { name: "SHP", symbol: SHP, description: "Start Header Packet" },
    KCode { name: "END", symbol: END, description: "End" },
    KCode { name: "SLC", symbol: SLC, description: "Start Link Command" },
    KCode { name: "EPF", symbol: EPF, description: "End Packet Framing" },
];
