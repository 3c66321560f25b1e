use clap::Parser;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use pipe_config::{SharedConfig, toml_config};
use pipe_core::timing::cycles_to_ns;
use pipe_core::version::PIPE_VERSION;
use pipe_core::{Word, debug};
use pipe_entities::{LoopbackLink, Side};

/// Load configuration file
fn load_config_from_toml(cfg_path: &str) -> SharedConfig {
    match toml_config::from_file(cfg_path) {
        Ok(c) => c,
        Err(e) => {
            println!("Failed to load configuration from {}: {}", cfg_path, e);
            std::process::exit(1);
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "USB3 PIPE link simulator",
    long_about = "Brings up two USB3 PIPE instances connected back to back and logs every LTSSM transition"
)]
struct Args {
    /// Config file (required)
    #[arg(help = "TOML config with clock, training and timeout parameters")]
    config: String,

    /// Cycles side B is held in reset
    #[arg(long, default_value_t = 0)]
    skew: u64,

    /// Give up after this many cycles
    #[arg(long, default_value_t = 2_000_000)]
    max_ticks: u64,

    /// Random words to send each way once the link is up
    #[arg(long, default_value_t = 0)]
    data: usize,
}

/// Sends `n` random words each way and checks they arrive intact
fn exchange_data(link: &mut LoopbackLink, n: usize, running: &AtomicBool) -> bool {
    let to_b: Vec<Word> = (0..n).map(|_| Word::data_only(rand::random())).collect();
    let to_a: Vec<Word> = (0..n).map(|_| Word::data_only(rand::random())).collect();

    // Training words still in flight are not part of the exchange
    link.run(Some(16), Some(running));
    link.take_received(Side::A);
    link.take_received(Side::B);

    link.send(Side::A, to_b.clone());
    link.send(Side::B, to_a.clone());
    link.run(Some(n as u64 + 16), Some(running));

    let ok = link.received(Side::B) == to_b.as_slice() && link.received(Side::A) == to_a.as_slice();
    tracing::info!(
        cycle = link.cycle(),
        "data exchange: A->B {}/{}, B->A {}/{}",
        link.received(Side::B).len(),
        n,
        link.received(Side::A).len(),
        n
    );
    ok
}

fn main() {
    eprintln!("USB3 PIPE link simulator {}\n", PIPE_VERSION);

    let args = Args::parse();
    let cfg = load_config_from_toml(&args.config);
    let _log_guard = debug::setup_logging_default(cfg.config().debug_log.clone());

    // Set up Ctrl+C handler for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("failed to set Ctrl+C handler");

    let sys_clk_freq = cfg.config().sys_clk_freq;
    let mut link = LoopbackLink::new(cfg, args.skew);

    let Some(cycle) = link.run_until_ready(args.max_ticks, Some(running.as_ref())) else {
        eprintln!(
            " -> link not up after {} cycles (A {}, B {})",
            link.cycle(),
            link.state(Side::A),
            link.state(Side::B)
        );
        std::process::exit(1);
    };
    eprintln!(
        " -> link up after {} cycles ({:.3} ms), {} transitions",
        cycle,
        cycles_to_ns(sys_clk_freq, cycle) as f64 / 1e6,
        link.events().len()
    );

    if args.data > 0 && !exchange_data(&mut link, args.data, &running) {
        eprintln!(" -> data exchange failed");
        std::process::exit(1);
    }
}
