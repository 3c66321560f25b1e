use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use pipe_config::SharedConfig;
use pipe_core::{Cycle, Word};

use crate::PipeUnitTrait;
use crate::ltssm::LtssmState;
use crate::pipe::{PipeInputs, PipeOutputs, Usb3Pipe};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn peer(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// Registered line state driven by one pipe, seen by the other one cycle later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Wire {
    word: Option<Word>,
    idle: bool,
}

impl Default for Wire {
    fn default() -> Self {
        Wire { word: None, idle: true }
    }
}

/// An LTSSM transition observed on one side of the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkEvent {
    pub cycle: Cycle,
    pub side: Side,
    pub from: LtssmState,
    pub to: LtssmState,
    /// rx_ready as reported in the transition cycle
    pub rx_ready: bool,
    pub timeout: bool,
}

#[derive(Default)]
struct Port {
    /// Words queued by the device core for transmission
    core_tx: VecDeque<Word>,
    /// Words delivered to the device core
    core_rx: Vec<Word>,
    /// Words replacing the peer's output on the receive side
    inject: VecDeque<Word>,
    serdes_tx_ready: bool,
    wire: Wire,
    last: PipeOutputs,
}

/// Two pipes clocked against each other over a one-cycle registered wire.
/// Side B is held in reset for `skew` cycles to model a late partner.
pub struct LoopbackLink {
    a: Usb3Pipe,
    b: Usb3Pipe,
    port_a: Port,
    port_b: Port,
    skew: Cycle,
    cycle: Cycle,
    events: Vec<LinkEvent>,
}

impl LoopbackLink {
    pub fn new(config: SharedConfig, skew: Cycle) -> Self {
        Self::with_configs(config.clone(), config, skew)
    }

    pub fn with_configs(config_a: SharedConfig, config_b: SharedConfig, skew: Cycle) -> Self {
        let port = || Port { serdes_tx_ready: true, ..Default::default() };
        LoopbackLink {
            a: Usb3Pipe::new(config_a, "A"),
            b: Usb3Pipe::new(config_b, "B"),
            port_a: port(),
            port_b: port(),
            skew,
            cycle: 0,
            events: Vec::new(),
        }
    }

    pub fn cycle(&self) -> Cycle {
        self.cycle
    }

    pub fn pipe(&self, side: Side) -> &Usb3Pipe {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }

    fn port(&self, side: Side) -> &Port {
        match side {
            Side::A => &self.port_a,
            Side::B => &self.port_b,
        }
    }

    fn port_mut(&mut self, side: Side) -> &mut Port {
        match side {
            Side::A => &mut self.port_a,
            Side::B => &mut self.port_b,
        }
    }

    pub fn state(&self, side: Side) -> LtssmState {
        self.pipe(side).state()
    }

    pub fn both_ready(&self) -> bool {
        self.a.is_ready() && self.b.is_ready()
    }

    /// Outputs of the most recent cycle
    pub fn last_outputs(&self, side: Side) -> &PipeOutputs {
        &self.port(side).last
    }

    pub fn events(&self) -> &[LinkEvent] {
        &self.events
    }

    /// Queue words for the device core of `side` to transmit
    pub fn send(&mut self, side: Side, words: impl IntoIterator<Item = Word>) {
        self.port_mut(side).core_tx.extend(words);
    }

    pub fn pending(&self, side: Side) -> usize {
        self.port(side).core_tx.len()
    }

    /// Words the device core of `side` has received so far
    pub fn received(&self, side: Side) -> &[Word] {
        &self.port(side).core_rx
    }

    pub fn take_received(&mut self, side: Side) -> Vec<Word> {
        std::mem::take(&mut self.port_mut(side).core_rx)
    }

    /// Feed `words` to the receiver of `side` instead of what its peer sends
    pub fn inject(&mut self, side: Side, words: impl IntoIterator<Item = Word>) {
        self.port_mut(side).inject.extend(words);
    }

    pub fn set_serdes_tx_ready(&mut self, side: Side, ready: bool) {
        self.port_mut(side).serdes_tx_ready = ready;
    }

    /// Returns one pipe to its power-on state. Queued and received core words are kept.
    pub fn reset(&mut self, side: Side) {
        tracing::info!(cycle = self.cycle, "{:?}: reset", side);
        match side {
            Side::A => self.a.reset(),
            Side::B => self.b.reset(),
        }
        let port = self.port_mut(side);
        port.wire = Wire::default();
        port.inject.clear();
    }

    fn tick_side(pipe: &mut Usb3Pipe, port: &mut Port, peer_wire: Wire) -> PipeOutputs {
        let serdes_rx = match port.inject.pop_front() {
            Some(word) => Some(word),
            None => peer_wire.word,
        };
        let out = pipe.tick(&PipeInputs {
            serdes_rx,
            serdes_rx_idle: peer_wire.idle,
            serdes_tx_ready: port.serdes_tx_ready,
            core_tx: port.core_tx.front().copied(),
        });
        if out.core_tx_ready && port.core_tx.pop_front().is_some() {
            tracing::trace!("{}: core word sent, {} pending", pipe.name(), port.core_tx.len());
        }
        if let Some(word) = out.core_rx {
            port.core_rx.push(word);
        }
        out
    }

    fn record(&mut self, side: Side, out: &PipeOutputs) {
        if let Some((from, to)) = out.status.transition {
            self.events.push(LinkEvent {
                cycle: self.cycle,
                side,
                from,
                to,
                rx_ready: out.status.rx_ready,
                timeout: out.status.timeout,
            });
        }
    }

    /// Advance both pipes by one cycle
    pub fn tick(&mut self) {
        let wire_a = self.port_a.wire;
        let wire_b = self.port_b.wire;

        let out_a = Self::tick_side(&mut self.a, &mut self.port_a, wire_b);
        self.port_a.wire = Wire {
            word: if self.port_a.serdes_tx_ready { out_a.serdes_tx } else { None },
            idle: out_a.serdes_tx_idle,
        };
        self.record(Side::A, &out_a);
        self.port_a.last = out_a;

        if self.cycle >= self.skew {
            if self.cycle == self.skew && self.skew > 0 {
                tracing::debug!(cycle = self.cycle, "B: released after {} cycles", self.skew);
            }
            let out_b = Self::tick_side(&mut self.b, &mut self.port_b, wire_a);
            self.port_b.wire = Wire {
                word: if self.port_b.serdes_tx_ready { out_b.serdes_tx } else { None },
                idle: out_b.serdes_tx_idle,
            };
            self.record(Side::B, &out_b);
            self.port_b.last = out_b;
        }

        self.cycle += 1;
    }

    /// Runs the link either for `num_ticks` cycles or until `running` is cleared
    pub fn run(&mut self, num_ticks: Option<u64>, running: Option<&AtomicBool>) {
        let mut ticks: u64 = 0;
        loop {
            self.tick();

            ticks += 1;
            if let Some(num_ticks) = num_ticks {
                if ticks >= num_ticks {
                    break;
                }
            }
            if let Some(running) = running {
                if !running.load(Ordering::SeqCst) {
                    tracing::info!(cycle = self.cycle, "stopped");
                    break;
                }
            }
        }
    }

    /// Runs until both sides are ready. Returns the cycle at which that happened,
    /// or None if `max_ticks` elapsed first or `running` was cleared.
    pub fn run_until_ready(&mut self, max_ticks: u64, running: Option<&AtomicBool>) -> Option<Cycle> {
        for _ in 0..max_ticks {
            self.tick();
            if self.both_ready() {
                tracing::debug!(cycle = self.cycle, "link up");
                return Some(self.cycle);
            }
            if let Some(running) = running {
                if !running.load(Ordering::SeqCst) {
                    return None;
                }
            }
        }
        tracing::debug!(
            cycle = self.cycle,
            "link not up after {} cycles: A {}, B {}",
            max_ticks,
            self.a.state(),
            self.b.state()
        );
        None
    }
}
