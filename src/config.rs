use core::time::Duration;

use thiserror::Error;

use crate::entity::VaneAxis;
use crate::protocol::types::VANE_POSITIONS;

pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Longest option label a vane select stores, in bytes.
pub const MAX_LABEL_LEN: usize = 32;

/// Where the host lists an entity. `None` means a regular control.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntityCategory {
    Config,
    Diagnostic,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SwitchConfig<'a> {
    pub name: &'a str,
    pub entity_category: Option<EntityCategory>,
}

impl<'a> SwitchConfig<'a> {
    pub fn new(name: &'a str) -> Self {
        SwitchConfig { name, entity_category: None }
    }
}

/// A vane select. Without `options` the default labels for the axis are used;
/// when given there must be exactly one label per vane position.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VaneSelectConfig<'a> {
    pub name: &'a str,
    pub options: Option<&'a [&'a str]>,
    pub entity_category: Option<EntityCategory>,
}

impl<'a> VaneSelectConfig<'a> {
    pub fn new(name: &'a str) -> Self {
        VaneSelectConfig { name, options: None, entity_category: None }
    }

    pub fn with_options(mut self, options: &'a [&'a str]) -> Self {
        self.options = Some(options);
        self
    }
}

/// Everything `DaewooAc::setup` needs. The UART and display switch are required;
/// they are `Option`s so that a half-built configuration is reported as a
/// `ConfigError` instead of failing to construct.
pub struct DaewooConfig<'a, S> {
    pub name: &'a str,
    pub uart: Option<S>,
    pub update_interval: Duration,
    pub response_timeout: Duration,
    pub vertical_vane: Option<VaneSelectConfig<'a>>,
    pub horizontal_vane: Option<VaneSelectConfig<'a>>,
    pub display: Option<SwitchConfig<'a>>,
    pub uv_light: Option<SwitchConfig<'a>>,
    pub horizontal_swing: Option<SwitchConfig<'a>>,
}

impl<'a, S> DaewooConfig<'a, S> {
    pub fn new(name: &'a str, uart: S, display: SwitchConfig<'a>) -> Self {
        DaewooConfig {
            name,
            uart: Some(uart),
            update_interval: DEFAULT_UPDATE_INTERVAL,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            vertical_vane: None,
            horizontal_vane: None,
            display: Some(display),
            uv_light: None,
            horizontal_swing: None,
        }
    }

    /// Checks the timing options and returns them in milliseconds, as
    /// `(update_interval, response_timeout)`.
    pub(crate) fn timing_ms(&self) -> Result<(u32, u32), ConfigError> {
        let interval = millis(self.update_interval)?;
        let timeout = millis(self.response_timeout)?;
        if interval == 0 {
            return Err(ConfigError::ZeroUpdateInterval);
        }
        if timeout >= interval {
            return Err(ConfigError::TimeoutTooLong { timeout_ms: timeout, interval_ms: interval });
        }
        Ok((interval, timeout))
    }
}

fn millis(duration: Duration) -> Result<u32, ConfigError> {
    u32::try_from(duration.as_millis()).map_err(|_| ConfigError::DurationTooLong)
}

#[derive(Error, Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigError {
    #[error("no UART configured")]
    MissingUart,
    #[error("the display switch is required")]
    MissingDisplaySwitch,
    #[error("{vane:?} vane select needs exactly {} options, got {count}", VANE_POSITIONS)]
    VaneOptionCount { vane: VaneAxis, count: usize },
    #[error("{vane:?} vane option {index} is longer than {} bytes", MAX_LABEL_LEN)]
    OptionTooLong { vane: VaneAxis, index: usize },
    #[error("update interval must not be zero")]
    ZeroUpdateInterval,
    #[error("response timeout ({timeout_ms} ms) must be shorter than the update interval ({interval_ms} ms)")]
    TimeoutTooLong { timeout_ms: u32, interval_ms: u32 },
    #[error("durations must fit in u32 milliseconds")]
    DurationTooLong,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DaewooConfig<'static, ()> {
        DaewooConfig::new("Living room", (), SwitchConfig::new("Display"))
    }

    #[test]
    fn defaults() {
        assert_eq!(config().timing_ms(), Ok((5000, 1000)));
    }

    #[test]
    fn timeout_must_be_shorter_than_interval() {
        let mut config = config();
        config.update_interval = Duration::from_millis(800);
        assert_eq!(
            config.timing_ms(),
            Err(ConfigError::TimeoutTooLong { timeout_ms: 1000, interval_ms: 800 })
        );
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut config = config();
        config.update_interval = Duration::ZERO;
        assert_eq!(config.timing_ms(), Err(ConfigError::ZeroUpdateInterval));
    }

    #[test]
    fn huge_interval_is_rejected() {
        let mut config = config();
        config.update_interval = Duration::from_secs(60 * 60 * 24 * 365);
        assert_eq!(config.timing_ms(), Err(ConfigError::DurationTooLong));
    }
}
