use std::{env, str::FromStr};

use sapper_common::models::GameParams;
use tracing::{info, warn};

/// Settings for the autoplay driver, read from `SAPPER_*` environment
/// variables. Unset or unparsable values fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SapperConfig {
    pub params: GameParams,
    pub saboteur: bool,
    pub max_moves: usize,
}

impl Default for SapperConfig {
    fn default() -> Self {
        Self {
            params: GameParams::default(),
            saboteur: true,
            max_moves: 1000,
        }
    }
}

impl SapperConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let config = Self {
            params: GameParams {
                rows: parse_or(&lookup, "SAPPER_ROWS", defaults.params.rows),
                columns: parse_or(&lookup, "SAPPER_COLUMNS", defaults.params.columns),
                mines: parse_or(&lookup, "SAPPER_MINES", defaults.params.mines),
                lives: parse_or(&lookup, "SAPPER_LIVES", defaults.params.lives),
                seed: lookup("SAPPER_SEED").and_then(|value| value.parse().ok()),
            },
            saboteur: parse_or(&lookup, "SAPPER_SABOTEUR", defaults.saboteur),
            max_moves: parse_or(&lookup, "SAPPER_MAX_MOVES", defaults.max_moves),
        };

        info!(
            "Loaded configuration: {}x{} with {} mines, {} lives, saboteur: {}, seed: {:?}",
            config.params.rows,
            config.params.columns,
            config.params.mines,
            config.params.lives,
            config.saboteur,
            config.params.seed
        );
        config
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparsable {}={:?}", key, value);
            default
        }),
    }
}
