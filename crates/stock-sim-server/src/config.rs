use std::{
    env,
    net::{AddrParseError, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use core_sim::{SimConfig, SimConfigError};
use runtime::{SchedulerConfig, SchedulerConfigError};
use rust_decimal::Decimal;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

const ADDR_KEY: &str = "STOCK_SIM_ADDR";
const MIN_SLEEP_KEY: &str = "STOCK_SIM_MIN_SLEEP_SECS";
const MAX_SLEEP_KEY: &str = "STOCK_SIM_MAX_SLEEP_SECS";
const DEVIATION_FACTOR_KEY: &str = "STOCK_SIM_DEVIATION_FACTOR";
const SEED_PATH_KEY: &str = "STOCK_SIM_SEED_PATH";
const RNG_SEED_KEY: &str = "STOCK_SIM_RNG_SEED";

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub scheduler: SchedulerConfig,
    pub sim: SimConfig,
    pub seed_path: Option<PathBuf>,
    pub rng_seed: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("STOCK_SIM_ADDR is not a valid socket address: {0}")]
    InvalidListenAddr(#[source] AddrParseError),
    #[error("{key} must be a whole number of seconds")]
    InvalidSleepSecs { key: &'static str },
    #[error("invalid tick sleep range: {0}")]
    InvalidSleepRange(#[from] SchedulerConfigError),
    #[error("STOCK_SIM_DEVIATION_FACTOR must be a decimal number")]
    UnparsableDeviationFactor,
    #[error("invalid STOCK_SIM_DEVIATION_FACTOR: {0}")]
    InvalidDeviationFactor(#[from] SimConfigError),
    #[error("STOCK_SIM_SEED_PATH must not be empty or whitespace")]
    InvalidSeedPath,
    #[error("STOCK_SIM_RNG_SEED must be an unsigned 64-bit integer")]
    InvalidRngSeed,
    #[error("{key} contains non-unicode data")]
    NonUnicode { key: &'static str },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let listen_addr = match read_env(ADDR_KEY)? {
            Some(value) => value.parse().map_err(ConfigError::InvalidListenAddr)?,
            None => DEFAULT_LISTEN_ADDR
                .parse()
                .map_err(ConfigError::InvalidListenAddr)?,
        };

        let defaults = SchedulerConfig::default();
        let min_sleep = parse_secs_env(MIN_SLEEP_KEY, defaults.min_sleep())?;
        let max_sleep = parse_secs_env(MAX_SLEEP_KEY, defaults.max_sleep())?;
        let scheduler = SchedulerConfig::new(min_sleep, max_sleep)?;

        let sim = match read_env(DEVIATION_FACTOR_KEY)? {
            Some(value) => {
                let factor = value
                    .trim()
                    .parse::<Decimal>()
                    .map_err(|_| ConfigError::UnparsableDeviationFactor)?;
                SimConfig::default().with_deviation_factor(factor)?
            }
            None => SimConfig::default(),
        };

        let seed_path = match read_env(SEED_PATH_KEY)? {
            Some(value) => {
                if value.trim().is_empty() {
                    return Err(ConfigError::InvalidSeedPath);
                }
                Some(PathBuf::from(value))
            }
            None => None,
        };

        let rng_seed = match read_env(RNG_SEED_KEY)? {
            Some(value) => Some(
                value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidRngSeed)?,
            ),
            None => None,
        };

        Ok(Self {
            listen_addr,
            scheduler,
            sim,
            seed_path,
            rng_seed,
        })
    }
}

fn read_env(key: &'static str) -> Result<Option<String>, ConfigError> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::NonUnicode { key }),
    }
}

fn parse_secs_env(key: &'static str, default_value: Duration) -> Result<Duration, ConfigError> {
    match read_env(key)? {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidSleepSecs { key }),
        None => Ok(default_value),
    }
}
