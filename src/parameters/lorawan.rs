//! LoRaWAN Parameter Definitions
//!
//! Defines activation credentials and uplink timing parameters.
//!
//! # Parameters
//!
//! - `LORA_DEV_EUI` - Device EUI, 16 hex characters
//! - `LORA_JOIN_EUI` - Join (application) EUI, 16 hex characters
//! - `LORA_APP_KEY` - Root key, 32 hex characters (hidden from listings)
//! - `LORA_PORT` - Application port for uplinks (1-223)
//! - `LORA_TX_MS` - Minimum interval between uplinks (ms)
//! - `LORA_JOIN_MS` - Minimum interval between join attempts (ms)
//! - `LORA_JOIN_MAX` - Join attempts before giving up
//! - `LORA_DC_POLICY` - Uplink interval reference (0 = last success, 1 = last attempt)
//!
//! # Security Note
//!
//! LORA_APP_KEY is marked as HIDDEN. The key is still present in the
//! parameter store and the firmware binary when provided at build time.
//!
//! # Example
//!
//! ```
//! use geotrack::parameters::{LoraParams, ParameterStore};
//!
//! let mut store = ParameterStore::new();
//! LoraParams::register_defaults(&mut store).unwrap();
//!
//! let params = LoraParams::from_store(&store);
//! assert_eq!(params.connectivity_config().unwrap().port, 1);
//! ```

use geotrack_core::credentials::{ConfigError, Credentials};
use geotrack_core::parameters::{ParamFlags, ParamValue, ParameterStore, MAX_STRING_LEN};
use heapless::String;

use crate::communication::lorawan::{is_valid_app_port, ConnectivityConfig, DutyCyclePolicy};
use crate::platform::{PlatformError, Result};

/// LoRaWAN parameters loaded from parameter store
#[derive(Debug, Clone)]
pub struct LoraParams {
    pub dev_eui: String<MAX_STRING_LEN>,
    pub join_eui: String<MAX_STRING_LEN>,
    pub app_key: String<MAX_STRING_LEN>,
    pub port: i32,
    pub tx_interval_ms: i32,
    pub join_retry_delay_ms: i32,
    pub max_join_attempts: i32,
    pub duty_cycle_policy: i32,
}

/// Wrap a credential string, rejecting values longer than `MAX_STRING_LEN`
fn string_value(value: &str) -> Result<ParamValue> {
    String::try_from(value)
        .map(ParamValue::String)
        .map_err(|_| PlatformError::InvalidConfig)
}

fn string_param(store: &ParameterStore, name: &str) -> String<MAX_STRING_LEN> {
    match store.get(name) {
        Some(ParamValue::String(s)) => s.clone(),
        _ => String::new(),
    }
}

fn int_param(store: &ParameterStore, name: &str, default: i32) -> i32 {
    match store.get(name) {
        Some(ParamValue::Int(v)) => *v,
        Some(ParamValue::Float(v)) => *v as i32,
        _ => default,
    }
}

/// Convert a signed parameter to `u32`, rejecting negatives
fn non_negative(value: i32, name: &'static str) -> core::result::Result<u32, ConfigError> {
    u32::try_from(value).map_err(|_| ConfigError::InvalidValue { name })
}

impl LoraParams {
    /// Register LoRaWAN parameters with default values
    ///
    /// Credential defaults are provided at build time through the
    /// `LORA_DEV_EUI`, `LORA_JOIN_EUI` and `LORA_APP_KEY` environment
    /// variables (empty when unset). A value that does not fit a string
    /// parameter fails with `PlatformError::InvalidConfig`.
    pub fn register_defaults(store: &mut ParameterStore) -> Result<()> {
        store.register(
            "LORA_DEV_EUI",
            string_value(env!("LORA_DEV_EUI"))?,
            ParamFlags::empty(),
        )?;
        store.register(
            "LORA_JOIN_EUI",
            string_value(env!("LORA_JOIN_EUI"))?,
            ParamFlags::empty(),
        )?;
        store.register(
            "LORA_APP_KEY",
            string_value(env!("LORA_APP_KEY"))?,
            ParamFlags::HIDDEN,
        )?;

        store.register(
            "LORA_PORT",
            ParamValue::Int(ConnectivityConfig::DEFAULT_PORT as i32),
            ParamFlags::empty(),
        )?;
        store.register(
            "LORA_TX_MS",
            ParamValue::Int(ConnectivityConfig::DEFAULT_TX_INTERVAL_MS as i32),
            ParamFlags::empty(),
        )?;
        store.register(
            "LORA_JOIN_MS",
            ParamValue::Int(ConnectivityConfig::DEFAULT_JOIN_RETRY_DELAY_MS as i32),
            ParamFlags::empty(),
        )?;
        store.register(
            "LORA_JOIN_MAX",
            ParamValue::Int(ConnectivityConfig::DEFAULT_MAX_JOIN_ATTEMPTS as i32),
            ParamFlags::empty(),
        )?;
        store.register(
            "LORA_DC_POLICY",
            ParamValue::Int(DutyCyclePolicy::default() as i32),
            ParamFlags::empty(),
        )?;

        Ok(())
    }

    /// Load LoRaWAN parameters from parameter store
    pub fn from_store(store: &ParameterStore) -> Self {
        Self {
            dev_eui: string_param(store, "LORA_DEV_EUI"),
            join_eui: string_param(store, "LORA_JOIN_EUI"),
            app_key: string_param(store, "LORA_APP_KEY"),
            port: int_param(store, "LORA_PORT", ConnectivityConfig::DEFAULT_PORT as i32),
            tx_interval_ms: int_param(
                store,
                "LORA_TX_MS",
                ConnectivityConfig::DEFAULT_TX_INTERVAL_MS as i32,
            ),
            join_retry_delay_ms: int_param(
                store,
                "LORA_JOIN_MS",
                ConnectivityConfig::DEFAULT_JOIN_RETRY_DELAY_MS as i32,
            ),
            max_join_attempts: int_param(
                store,
                "LORA_JOIN_MAX",
                ConnectivityConfig::DEFAULT_MAX_JOIN_ATTEMPTS as i32,
            ),
            duty_cycle_policy: int_param(store, "LORA_DC_POLICY", 0),
        }
    }

    /// Parse the credential strings
    ///
    /// Fails when any of them is empty, the wrong length or not hex.
    pub fn credentials(&self) -> core::result::Result<Credentials, ConfigError> {
        Credentials::from_hex(&self.dev_eui, &self.join_eui, &self.app_key)
    }

    /// Build and validate the connectivity configuration
    pub fn connectivity_config(&self) -> core::result::Result<ConnectivityConfig, ConfigError> {
        let port = u8::try_from(self.port)
            .ok()
            .filter(|p| is_valid_app_port(*p))
            .ok_or(ConfigError::InvalidValue { name: "LORA_PORT" })?;

        let max_join_attempts = non_negative(self.max_join_attempts, "LORA_JOIN_MAX")?;
        if max_join_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                name: "LORA_JOIN_MAX",
            });
        }

        let policy = u8::try_from(self.duty_cycle_policy).unwrap_or(0);

        Ok(ConnectivityConfig {
            port,
            tx_interval_ms: non_negative(self.tx_interval_ms, "LORA_TX_MS")?,
            join_retry_delay_ms: non_negative(self.join_retry_delay_ms, "LORA_JOIN_MS")?,
            max_join_attempts,
            duty_cycle_policy: DutyCyclePolicy::from_u8(policy),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geotrack_core::credentials::CredentialField;

    fn store_with_keys() -> ParameterStore {
        let mut store = ParameterStore::new();
        LoraParams::register_defaults(&mut store).unwrap();
        store
            .set("LORA_DEV_EUI", string_value("58EC3C43CA480000").unwrap())
            .unwrap();
        store
            .set("LORA_JOIN_EUI", string_value("0000000000000000").unwrap())
            .unwrap();
        store
            .set(
                "LORA_APP_KEY",
                string_value("CE8A96F54327D1CB20078F78D4746517").unwrap(),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_lora_params_defaults() {
        let mut store = ParameterStore::new();
        LoraParams::register_defaults(&mut store).unwrap();

        assert!(store.get("LORA_DEV_EUI").is_some());
        assert!(store.get("LORA_DC_POLICY").is_some());
        assert!(store.is_hidden("LORA_APP_KEY"));
        assert!(!store.is_hidden("LORA_DEV_EUI"));

        let config = LoraParams::from_store(&store).connectivity_config().unwrap();
        assert_eq!(config, ConnectivityConfig::default());
    }

    #[test]
    fn test_credentials_from_store() {
        let store = store_with_keys();
        let creds = LoraParams::from_store(&store).credentials().unwrap();
        assert_eq!(creds.dev_eui.as_u64(), 0x58EC_3C43_CA48_0000);
    }

    #[test]
    fn test_malformed_credentials_rejected() {
        let mut store = store_with_keys();
        store
            .set("LORA_DEV_EUI", string_value("58EC3C43").unwrap())
            .unwrap();

        let err = LoraParams::from_store(&store).credentials().unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidLength {
                field: CredentialField::DevEui,
                expected: 16,
                actual: 8,
            }
        );
    }

    #[test]
    fn test_overlong_credential_rejected() {
        let app_key = "CE8A96F54327D1CB20078F78D47465170";
        assert_eq!(app_key.len(), MAX_STRING_LEN + 1);
        assert_eq!(string_value(app_key), Err(PlatformError::InvalidConfig));

        let exact = &app_key[..MAX_STRING_LEN];
        assert_eq!(
            string_value(exact).unwrap(),
            ParamValue::String(String::try_from(exact).unwrap())
        );
    }

    #[test]
    fn test_reserved_port_rejected() {
        let mut store = store_with_keys();
        store.set("LORA_PORT", ParamValue::Int(224)).unwrap();
        assert_eq!(
            LoraParams::from_store(&store).connectivity_config(),
            Err(ConfigError::InvalidValue { name: "LORA_PORT" })
        );

        store.set("LORA_PORT", ParamValue::Int(0)).unwrap();
        assert!(LoraParams::from_store(&store).connectivity_config().is_err());
    }

    #[test]
    fn test_timing_overrides() {
        let mut store = store_with_keys();
        store.set("LORA_TX_MS", ParamValue::Int(120_000)).unwrap();
        store.set("LORA_JOIN_MAX", ParamValue::Int(3)).unwrap();
        store.set("LORA_DC_POLICY", ParamValue::Int(1)).unwrap();

        let config = LoraParams::from_store(&store).connectivity_config().unwrap();
        assert_eq!(config.tx_interval_ms, 120_000);
        assert_eq!(config.max_join_attempts, 3);
        assert_eq!(config.duty_cycle_policy, DutyCyclePolicy::FromLastAttempt);
    }

    #[test]
    fn test_invalid_timing_rejected() {
        let mut store = store_with_keys();
        store.set("LORA_JOIN_MAX", ParamValue::Int(0)).unwrap();
        assert_eq!(
            LoraParams::from_store(&store).connectivity_config(),
            Err(ConfigError::InvalidValue {
                name: "LORA_JOIN_MAX"
            })
        );

        store.set("LORA_JOIN_MAX", ParamValue::Int(10)).unwrap();
        store.set("LORA_TX_MS", ParamValue::Int(-1)).unwrap();
        assert!(LoraParams::from_store(&store).connectivity_config().is_err());
    }
}
