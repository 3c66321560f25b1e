use crate::PipeErr;
use crate::symbols::{COM, Symbol};

/// Four symbols transferred in one system clock cycle.
/// Lane 0 occupies data bits 0..8 and ctrl bit 0, and is the first symbol on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Word {
    pub data: u32,
    /// Control marker per lane, only the low 4 bits are used
    pub ctrl: u8,
}

impl Word {
    pub const LANES: usize = 4;
    pub const CTRL_MASK: u8 = 0b1111;

    pub const fn new(data: u32, ctrl: u8) -> Self {
        Word { data, ctrl: ctrl & Self::CTRL_MASK }
    }

    /// Data word without any control lanes
    pub const fn data_only(data: u32) -> Self {
        Word { data, ctrl: 0 }
    }

    pub fn from_symbols(symbols: &[Symbol]) -> Result<Self, PipeErr> {
        if symbols.len() != Self::LANES {
            return Err(PipeErr::InconsistentLength {
                expected: Self::LANES,
                found: symbols.len(),
            });
        }
        let mut word = Word::default();
        for (lane, sym) in symbols.iter().enumerate() {
            word.set_symbol(lane, *sym);
        }
        Ok(word)
    }

    #[inline]
    pub fn lane_byte(&self, lane: usize) -> u8 {
        (self.data >> (8 * lane)) as u8
    }

    #[inline]
    pub fn lane_is_ctrl(&self, lane: usize) -> bool {
        (self.ctrl >> lane) & 1 == 1
    }

    pub fn symbol(&self, lane: usize) -> Symbol {
        Symbol {
            value: self.lane_byte(lane),
            is_ctrl: self.lane_is_ctrl(lane),
        }
    }

    pub fn set_symbol(&mut self, lane: usize, sym: Symbol) {
        let shift = 8 * lane;
        self.data = (self.data & !(0xff << shift)) | ((sym.value as u32) << shift);
        self.ctrl = (self.ctrl & !(1 << lane)) | ((sym.is_ctrl as u8) << lane);
    }

    /// True if any lane carries a control-marked COM
    pub fn has_com(&self) -> bool {
        (0..Self::LANES).any(|lane| self.symbol(lane) == COM)
    }

    /// Mask with all data lanes set, control lanes cleared
    pub fn data_lane_mask(&self) -> u32 {
        let mut mask = 0;
        for lane in 0..Self::LANES {
            if !self.lane_is_ctrl(lane) {
                mask |= 0xff << (8 * lane);
            }
        }
        mask
    }

    /// Reverses the lane order, both for data and control bits
    pub fn swap_endianness(self) -> Self {
        let mut ctrl = 0;
        for lane in 0..Self::LANES {
            if self.lane_is_ctrl(lane) {
                ctrl |= 1 << (Self::LANES - 1 - lane);
            }
        }
        Word {
            data: self.data.swap_bytes(),
            ctrl,
        }
    }
}

impl core::fmt::Display for Word {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for lane in 0..Self::LANES {
            if lane > 0 {
                write!(f, " ")?;
            }
            let sym = self.symbol(lane);
            match sym.name() {
                Some(name) => write!(f, "{}", name)?,
                None if sym.is_ctrl => write!(f, "K{:02x}", sym.value)?,
                None => write!(f, "{:02x}", sym.value)?,
            }
        }
        Ok(())
    }
}
