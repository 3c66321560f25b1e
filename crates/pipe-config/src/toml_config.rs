use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use toml::Value;

use super::pipe_config::{CfgScrambler, CfgTimeouts, CfgTraining, PipeConfig, SharedConfig};

/// Build `SharedConfig` from a TOML configuration file
pub fn from_toml_str(toml_str: &str) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let root: TomlConfigRoot = toml::from_str(toml_str)?;

    // Various sanity checks
    let expected_config_version = "0.1";
    if !root.config_version.eq(expected_config_version) {
        return Err(format!(
            "Unrecognized config_version: {}, expect {}",
            root.config_version, expected_config_version
        )
        .into());
    }
    if !root.extra.is_empty() {
        return Err(format!("Unrecognized top-level fields: {:?}", sorted_keys(&root.extra)).into());
    }
    check_section("clock", root.clock.as_ref().map(|s| &s.extra))?;
    check_section("ltssm", root.ltssm.as_ref().map(|s| &s.extra))?;
    check_section("training", root.training.as_ref().map(|s| &s.extra))?;
    check_section("timeouts", root.timeouts.as_ref().map(|s| &s.extra))?;
    check_section("scrambler", root.scrambler.as_ref().map(|s| &s.extra))?;
    check_section("datapath", root.datapath.as_ref().map(|s| &s.extra))?;

    let mut cfg = PipeConfig::default();
    cfg.debug_log = root.debug_log;

    if let Some(clock) = root.clock {
        if let Some(v) = clock.sys_clk_freq {
            cfg.sys_clk_freq = v;
        }
        if let Some(v) = clock.lfps_clk_freq {
            cfg.lfps_clk_freq = v;
        }
    }
    if let Some(ltssm) = root.ltssm {
        if let Some(v) = ltssm.with_timers {
            cfg.with_timers = v;
        }
    }
    if let Some(training) = root.training {
        apply_training_patch(&mut cfg.training, training);
    }
    if let Some(timeouts) = root.timeouts {
        apply_timeouts_patch(&mut cfg.timeouts, timeouts);
    }
    if let Some(scrambler) = root.scrambler {
        apply_scrambler_patch(&mut cfg.scrambler, &mut cfg.scrambling, scrambler);
    }
    if let Some(datapath) = root.datapath {
        if let Some(v) = datapath.endianness_swap {
            cfg.endianness_swap = v;
        }
        if let Some(v) = datapath.tx_polarity {
            cfg.tx_polarity = v;
        }
    }

    Ok(SharedConfig::from_config(cfg)?)
}

/// Build `SharedConfig` from any reader.
pub fn from_reader<R: Read>(reader: R) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    let mut reader = BufReader::new(reader);
    reader.read_to_string(&mut contents)?;
    from_toml_str(&contents)
}

/// Build `SharedConfig` from a file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let f = File::open(path)?;
    let r = BufReader::new(f);
    let cfg = from_reader(r)?;
    Ok(cfg)
}

fn apply_training_patch(dst: &mut CfgTraining, src: TrainingDto) {
    if let Some(v) = src.tseq_tx_count {
        dst.tseq_tx_count = v;
    }
    if let Some(v) = src.ts1_tx_count {
        dst.ts1_tx_count = v;
    }
    if let Some(v) = src.ts2_tx_count {
        dst.ts2_tx_count = v;
    }
    if let Some(v) = src.ts_rx_count {
        dst.ts_rx_count = v;
    }
    if let Some(v) = src.lfps_tx_count {
        dst.lfps_tx_count = v;
    }
    if let Some(v) = src.lfps_tx_extra {
        dst.lfps_tx_extra = v;
    }
}

fn apply_timeouts_patch(dst: &mut CfgTimeouts, src: TimeoutsDto) {
    if let Some(v) = src.polling_lfps_us {
        dst.polling_lfps_us = v;
    }
    if let Some(v) = src.polling_active_us {
        dst.polling_active_us = v;
    }
    if let Some(v) = src.polling_configuration_us {
        dst.polling_configuration_us = v;
    }
    if let Some(v) = src.recovery_active_us {
        dst.recovery_active_us = v;
    }
    if let Some(v) = src.recovery_configuration_us {
        dst.recovery_configuration_us = v;
    }
}

fn apply_scrambler_patch(dst: &mut CfgScrambler, scrambling: &mut bool, src: ScramblerDto) {
    if let Some(v) = src.enabled {
        *scrambling = v;
    }
    if let Some(v) = src.tx_seed {
        dst.tx_seed = v;
    }
    if let Some(v) = src.rx_seed {
        dst.rx_seed = v;
    }
}

fn check_section(name: &str, extra: Option<&HashMap<String, Value>>) -> Result<(), Box<dyn std::error::Error>> {
    match extra {
        Some(extra) if !extra.is_empty() => {
            Err(format!("Unrecognized fields in {}: {:?}", name, sorted_keys(extra)).into())
        }
        _ => Ok(()),
    }
}

fn sorted_keys(map: &HashMap<String, Value>) -> Vec<&str> {
    let mut v: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
    v.sort_unstable();
    v
}

/// ----------------------- DTOs for input shape -----------------------

#[derive(Deserialize)]
struct TomlConfigRoot {
    config_version: String,
    debug_log: Option<String>,

    #[serde(default)]
    clock: Option<ClockDto>,

    #[serde(default)]
    ltssm: Option<LtssmDto>,

    #[serde(default)]
    training: Option<TrainingDto>,

    #[serde(default)]
    timeouts: Option<TimeoutsDto>,

    #[serde(default)]
    scrambler: Option<ScramblerDto>,

    #[serde(default)]
    datapath: Option<DatapathDto>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct ClockDto {
    pub sys_clk_freq: Option<u64>,
    pub lfps_clk_freq: Option<u64>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct LtssmDto {
    pub with_timers: Option<bool>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct TrainingDto {
    pub tseq_tx_count: Option<u32>,
    pub ts1_tx_count: Option<u32>,
    pub ts2_tx_count: Option<u32>,
    pub ts_rx_count: Option<u32>,
    pub lfps_tx_count: Option<u16>,
    pub lfps_tx_extra: Option<u16>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct TimeoutsDto {
    pub polling_lfps_us: Option<u64>,
    pub polling_active_us: Option<u64>,
    pub polling_configuration_us: Option<u64>,
    pub recovery_active_us: Option<u64>,
    pub recovery_configuration_us: Option<u64>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct ScramblerDto {
    pub enabled: Option<bool>,
    pub tx_seed: Option<u16>,
    pub rx_seed: Option<u16>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct DatapathDto {
    pub endianness_swap: Option<bool>,
    pub tx_polarity: Option<bool>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}
