// src/config.rs
//
// Run configuration for the decision-log generator.
//
// Precedence (highest to lowest):
//   1. CLI flags (applied by the binary on top of the value returned here)
//   2. Environment variables (DECISION_SIM_*)
//   3. Defaults (the 80 worker / 16 team / 12 session / 60 item study design)

use std::env;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

pub const ENV_N_WORKERS: &str = "DECISION_SIM_N_WORKERS";
pub const ENV_N_TEAMS: &str = "DECISION_SIM_N_TEAMS";
pub const ENV_N_SESSIONS: &str = "DECISION_SIM_N_SESSIONS";
pub const ENV_ITEMS_PER_SESSION: &str = "DECISION_SIM_ITEMS_PER_SESSION";
pub const ENV_SEED: &str = "DECISION_SIM_SEED";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    pub n_workers: usize,
    pub n_teams: usize,
    pub n_sessions: usize,
    pub items_per_session: usize,
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            n_workers: 80,
            n_teams: 16,
            n_sessions: 12,
            items_per_session: 60,
            seed: 42,
        }
    }
}

impl SimConfig {
    pub fn new(
        n_workers: usize,
        n_teams: usize,
        n_sessions: usize,
        items_per_session: usize,
        seed: u64,
    ) -> Self {
        Self {
            n_workers,
            n_teams,
            n_sessions,
            items_per_session,
            seed,
        }
    }

    /// Reject non-positive counts and tables too large to index.
    pub fn validate(&self) -> SimResult<()> {
        let counts = [
            ("n_workers", self.n_workers),
            ("n_teams", self.n_teams),
            ("n_sessions", self.n_sessions),
            ("items_per_session", self.items_per_session),
        ];
        for (field, value) in counts {
            if value == 0 {
                return Err(SimError::config(field, "must be >= 1"));
            }
        }
        for (field, value) in [
            ("n_workers", self.n_workers),
            ("n_teams", self.n_teams),
            ("n_sessions", self.n_sessions),
        ] {
            if u32::try_from(value).is_err() {
                return Err(SimError::config(field, "does not fit in u32"));
            }
        }
        self.total_records()?;
        Ok(())
    }

    /// Number of rows the generator will emit.
    pub fn total_records(&self) -> SimResult<usize> {
        self.n_workers
            .checked_mul(self.n_sessions)
            .and_then(|n| n.checked_mul(self.items_per_session))
            .ok_or_else(|| {
                SimError::config(
                    "n_workers*n_sessions*items_per_session",
                    "total record count overflows usize",
                )
            })
    }

    /// Defaults with `DECISION_SIM_*` overrides from the process environment.
    pub fn from_env() -> SimResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`SimConfig::from_env`] but with an injectable lookup so tests do
    /// not have to mutate process-wide state.
    pub fn from_lookup<F>(lookup: F) -> SimResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = parse_override::<usize>(&lookup, ENV_N_WORKERS)? {
            cfg.n_workers = v;
        }
        if let Some(v) = parse_override::<usize>(&lookup, ENV_N_TEAMS)? {
            cfg.n_teams = v;
        }
        if let Some(v) = parse_override::<usize>(&lookup, ENV_N_SESSIONS)? {
            cfg.n_sessions = v;
        }
        if let Some(v) = parse_override::<usize>(&lookup, ENV_ITEMS_PER_SESSION)? {
            cfg.items_per_session = v;
        }
        if let Some(v) = parse_override::<u64>(&lookup, ENV_SEED)? {
            cfg.seed = v;
        }

        Ok(cfg)
    }
}

fn parse_override<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> SimResult<Option<T>>
where
    T: std::str::FromStr + std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<T>() {
        Ok(v) => {
            eprintln!("[config] {key} = {v} (overrode default)");
            Ok(Some(v))
        }
        Err(_) => Err(SimError::config(
            key,
            format!("could not parse {raw:?} as a non-negative integer"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
        assert_eq!(SimConfig::default().total_records().unwrap(), 80 * 12 * 60);
    }

    #[test]
    fn zero_counts_are_rejected() {
        let cfg = SimConfig::new(4, 0, 2, 5, 1);
        match cfg.validate() {
            Err(SimError::InvalidConfiguration { field, .. }) => assert_eq!(field, "n_teams"),
            other => panic!("expected InvalidConfiguration, got {other:?}"),
        }
    }

    #[test]
    fn overflowing_table_is_rejected() {
        let cfg = SimConfig::new(1 << 20, 1, 1 << 20, usize::MAX >> 30, 1);
        assert!(matches!(
            cfg.validate(),
            Err(SimError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn env_overrides_apply() {
        let cfg = SimConfig::from_lookup(lookup_from(&[
            (ENV_N_WORKERS, "4"),
            (ENV_SEED, " 7 "),
        ]))
        .unwrap();
        assert_eq!(cfg.n_workers, 4);
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.n_teams, 16);
    }

    #[test]
    fn unparseable_seed_is_fatal() {
        let err = SimConfig::from_lookup(lookup_from(&[(ENV_SEED, "-3")])).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfiguration { .. }));
    }
}
