use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::{info, warn};

use crate::options::{BatchSchedule, DEFAULT_BATCH_DELAY};

const BATCH_DELAY_VAR: &str = "DATALOAD_BATCH_DELAY_MS";

/// Settings shared by every loader built for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// How long a batch window stays open after its first key. Zero flushes as soon as the
    /// request queue is drained.
    pub batch_delay: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self { batch_delay: DEFAULT_BATCH_DELAY }
    }
}

impl LoaderConfig {
    /// Reads the configuration from the process environment.
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<L>(lookup: L) -> Self
    where
        L: Fn(&str) -> Option<String>,
    {
        let default_delay = DEFAULT_BATCH_DELAY.as_millis() as u64;
        let delay_ms = try_load(&lookup, BATCH_DELAY_VAR, default_delay);
        Self { batch_delay: Duration::from_millis(delay_ms) }
    }

    pub fn schedule(&self) -> BatchSchedule {
        if self.batch_delay.is_zero() {
            BatchSchedule::Drain
        } else {
            BatchSchedule::Delay(self.batch_delay)
        }
    }
}

fn try_load<T, L>(lookup: &L, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
    L: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(
        pairs: &'static [(&'static str, &'static str)],
    ) -> impl Fn(&str) -> Option<String> {
        move |key: &str| pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
    }

    #[test]
    fn defaults_to_five_millisecond_window() {
        let config = LoaderConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, LoaderConfig::default());
        assert_eq!(config.schedule(), BatchSchedule::Delay(Duration::from_millis(5)));
    }

    #[test]
    fn zero_delay_drains() {
        let config = LoaderConfig::from_lookup(lookup_from(&[(BATCH_DELAY_VAR, "0")]));
        assert_eq!(config.schedule(), BatchSchedule::Drain);
    }

    #[test]
    fn invalid_delay_falls_back_to_default() {
        let config = LoaderConfig::from_lookup(lookup_from(&[(BATCH_DELAY_VAR, "soon")]));
        assert_eq!(config.batch_delay, DEFAULT_BATCH_DELAY);

        let config = LoaderConfig::from_lookup(lookup_from(&[(BATCH_DELAY_VAR, " 12 ")]));
        assert_eq!(config.batch_delay, Duration::from_millis(12));
    }
}
