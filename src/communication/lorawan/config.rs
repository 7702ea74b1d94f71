//! Connectivity manager configuration

/// Reference point for the uplink interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DutyCyclePolicy {
    /// Interval counts from the last successful uplink; failed uplinks may be
    /// retried immediately
    #[default]
    FromLastSuccess = 0,
    /// Interval counts from the last uplink attempt, successful or not
    FromLastAttempt = 1,
}

impl DutyCyclePolicy {
    /// Convert from parameter value; unknown values fall back to the default
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::FromLastAttempt,
            _ => Self::FromLastSuccess,
        }
    }
}

/// Timing and retry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnectivityConfig {
    /// Application port for tracker uplinks
    pub port: u8,
    /// Minimum spacing between uplinks (ms)
    pub tx_interval_ms: u32,
    /// Minimum spacing between join attempts (ms)
    pub join_retry_delay_ms: u32,
    /// Consecutive attempts without a join before giving up
    pub max_join_attempts: u32,
    pub duty_cycle_policy: DutyCyclePolicy,
}

impl ConnectivityConfig {
    pub const DEFAULT_PORT: u8 = 1;
    pub const DEFAULT_TX_INTERVAL_MS: u32 = 60_000;
    pub const DEFAULT_JOIN_RETRY_DELAY_MS: u32 = 30_000;
    pub const DEFAULT_MAX_JOIN_ATTEMPTS: u32 = 10;
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            port: Self::DEFAULT_PORT,
            tx_interval_ms: Self::DEFAULT_TX_INTERVAL_MS,
            join_retry_delay_ms: Self::DEFAULT_JOIN_RETRY_DELAY_MS,
            max_join_attempts: Self::DEFAULT_MAX_JOIN_ATTEMPTS,
            duty_cycle_policy: DutyCyclePolicy::default(),
        }
    }
}

/// Application ports reserved by LoRaWAN (0 is MAC-only, 224+ are reserved)
pub fn is_valid_app_port(port: u8) -> bool {
    (1..=223).contains(&port)
}
