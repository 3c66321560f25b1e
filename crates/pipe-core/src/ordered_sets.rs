use crate::LinkConfig;
use crate::symbols::{COM, Symbol};
use crate::word::Word;

/// Word index of the link config symbol in TS1/TS2
pub const LINK_CONFIG_WORD: usize = 1;
/// Lane of the link config symbol within LINK_CONFIG_WORD
pub const LINK_CONFIG_LANE: usize = 1;
/// Compare mask for LINK_CONFIG_WORD, the link config byte is not part of the match
pub const LINK_CONFIG_MASK: u32 = !(0xff << (8 * LINK_CONFIG_LANE));

/// Training ordered sets, see USB 3.0 section 6.4.1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderedSetKind {
    Tseq,
    Ts1,
    /// TS1 as received over a pair with swapped polarity
    Ts1Inv,
    Ts2,
}

impl OrderedSetKind {
    pub fn name(self) -> &'static str {
        match self {
            OrderedSetKind::Tseq => "TSEQ",
            OrderedSetKind::Ts1 => "TS1",
            OrderedSetKind::Ts1Inv => "TS1_INV",
            OrderedSetKind::Ts2 => "TS2",
        }
    }

    pub fn carries_link_config(self) -> bool {
        !matches!(self, OrderedSetKind::Tseq)
    }

    /// Full symbol sequence. Link config is left zero for TS1/TS2.
    pub fn symbols(self) -> Vec<Symbol> {
        match self {
            OrderedSetKind::Tseq => {
                let mut s = vec![
                    COM,
                    Symbol::d(31, 7),
                    Symbol::d(23, 0),
                    Symbol::d(0, 6),
                    Symbol::d(20, 0),
                    Symbol::d(18, 5),
                    Symbol::d(7, 7),
                    Symbol::d(2, 0),
                    Symbol::d(2, 4),
                    Symbol::d(18, 3),
                    Symbol::d(14, 3),
                    Symbol::d(8, 1),
                    Symbol::d(6, 5),
                    Symbol::d(30, 5),
                    Symbol::d(13, 3),
                    Symbol::d(31, 5),
                ];
                s.extend([Symbol::d(10, 2); 16]);
                s
            }
            OrderedSetKind::Ts1 => Self::training_set(Symbol::d(10, 2)),
            OrderedSetKind::Ts1Inv => Self::training_set(Symbol::d(21, 5)),
            OrderedSetKind::Ts2 => Self::training_set(Symbol::d(5, 2)),
        }
    }

    fn training_set(identifier: Symbol) -> Vec<Symbol> {
        let mut s = vec![COM; 4];
        s.push(Symbol::d(0, 0));
        s.push(Symbol::data(LinkConfig::default().to_byte()));
        s.extend([identifier; 10]);
        s
    }
}

/// An ordered set packed into words, owned by the detector or generator using it
#[derive(Debug, Clone)]
pub struct OrderedSet {
    kind: OrderedSetKind,
    words: Box<[Word]>,
}

impl OrderedSet {
    pub fn new(kind: OrderedSetKind) -> Self {
        let words = kind
            .symbols()
            .chunks(Word::LANES)
            .map(|chunk| {
                let mut w = Word::default();
                for (lane, sym) in chunk.iter().enumerate() {
                    w.set_symbol(lane, *sym);
                }
                w
            })
            .collect();
        OrderedSet { kind, words }
    }

    pub fn kind(&self) -> OrderedSetKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word(&self, index: usize) -> Word {
        self.words[index]
    }

    /// Word at `index` with the link config inserted where the set carries one
    pub fn word_with_config(&self, index: usize, config: LinkConfig) -> Word {
        let mut w = self.words[index];
        if self.kind.carries_link_config() && index == LINK_CONFIG_WORD {
            w.set_symbol(LINK_CONFIG_LANE, Symbol::data(config.to_byte()));
        }
        w
    }

    /// Data bits that take part in the comparison of word `index`
    pub fn compare_mask(&self, index: usize) -> u32 {
        if self.kind.carries_link_config() && index == LINK_CONFIG_WORD {
            LINK_CONFIG_MASK
        } else {
            u32::MAX
        }
    }

    /// Compares a received word against the table entry at `index`.
    /// Control markers must match exactly, data only under the compare mask.
    pub fn matches(&self, index: usize, word: &Word) -> bool {
        let expected = self.words[index];
        let mask = self.compare_mask(index);
        word.ctrl == expected.ctrl && (word.data & mask) == (expected.data & mask)
    }

    /// Extracts the link config from a received LINK_CONFIG_WORD
    pub fn decode_link_config(word: &Word) -> LinkConfig {
        LinkConfig::from_byte(word.lane_byte(LINK_CONFIG_LANE))
    }
}
